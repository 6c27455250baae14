//! Test Helpers

use rust_decimal::Decimal;
use testresult::TestResult;

use crate::{
    domain::{
        carts::{CartsService, data::NewCartItem, records::CartRecord},
        products::{
            ProductsService,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        users::{
            UsersService,
            data::{NewAddress, NewUser},
            records::{AddressRecord, AddressUuid, Role, UserRecord, UserUuid},
        },
    },
    test::TestContext,
};

/// Create a user whose email is derived from `name` and unique per call.
pub(crate) async fn create_user(
    ctx: &TestContext,
    name: &str,
    role: Role,
) -> TestResult<UserRecord> {
    let uuid = UserUuid::new();

    let user = ctx
        .users
        .create_user(NewUser {
            uuid,
            name: name.to_string(),
            email: format!(
                "{}.{}@example.test",
                name.to_lowercase(),
                uuid.into_uuid().simple()
            ),
            phone: None,
            role,
        })
        .await?;

    Ok(user)
}

pub(crate) async fn create_address(
    ctx: &TestContext,
    user: UserUuid,
) -> TestResult<AddressRecord> {
    let address = ctx
        .users
        .add_address(
            user,
            NewAddress {
                uuid: AddressUuid::new(),
                label: Some("Home".to_string()),
                line1: "1 Main St".to_string(),
                line2: None,
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            },
        )
        .await?;

    Ok(address)
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: Decimal,
) -> TestResult<ProductRecord> {
    let product = ctx
        .products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            price,
        })
        .await?;

    Ok(product)
}

/// Add `(product, quantity)` lines to the user's cart.
pub(crate) async fn fill_cart(
    ctx: &TestContext,
    user: UserUuid,
    lines: &[(ProductUuid, u32)],
) -> TestResult<CartRecord> {
    let mut cart = ctx.carts.get_cart(user).await?;

    for &(product_uuid, quantity) in lines {
        cart = ctx
            .carts
            .add_item(
                user,
                NewCartItem {
                    product_uuid,
                    quantity,
                },
            )
            .await?;
    }

    Ok(cart)
}
