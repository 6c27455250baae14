//! Cart Handlers

pub(crate) mod clear;
pub(crate) mod get;

#[cfg(test)]
pub(crate) mod tests {
    use rust_decimal::Decimal;

    use dispatch_app::domain::{
        carts::records::{CartItemRecord, CartItemUuid, CartRecord, CartUuid},
        products::records::ProductUuid,
        users::records::UserUuid,
    };

    pub(crate) fn make_cart(user: UserUuid) -> CartRecord {
        CartRecord {
            uuid: CartUuid::new(),
            user_uuid: user,
            items: vec![CartItemRecord {
                uuid: CartItemUuid::new(),
                product_uuid: ProductUuid::new(),
                product_name: "Sourdough".to_string(),
                unit_price: Decimal::new(4_25, 2),
                quantity: 2,
            }],
        }
    }
}
