//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::products::{
        data::NewProduct,
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let product = validate(product)?;

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }
}

/// Catalog prices are stored as `NUMERIC(12, 2)`; reject anything that would
/// be silently rounded.
fn validate(product: NewProduct) -> Result<NewProduct, ProductsServiceError> {
    let name = product.name.trim();

    if name.is_empty() {
        return Err(ProductsServiceError::BlankName);
    }

    if product.price.is_sign_negative() || product.price.normalize().scale() > 2 {
        return Err(ProductsServiceError::InvalidPrice(product.price));
    }

    Ok(NewProduct {
        name: name.to_string(),
        ..product
    })
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all products.
    async fn list_products(&self) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product with the given details.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn create_product_keeps_decimal_price() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .products
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: "Oat milk".to_string(),
                price: Decimal::new(5_50, 2),
            })
            .await?;

        let fetched = ctx.products.get_product(created.uuid).await?;

        assert_eq!(fetched.price, Decimal::new(5_50, 2));
        assert_eq!(fetched.name, "Oat milk");

        Ok(())
    }

    #[test]
    fn prices_must_fit_the_catalog_column() {
        let product = |price| NewProduct {
            uuid: ProductUuid::new(),
            name: "Refund".to_string(),
            price,
        };

        for price in [Decimal::new(-1, 0), Decimal::new(1_005, 3)] {
            assert!(
                matches!(
                    validate(product(price)),
                    Err(ProductsServiceError::InvalidPrice(rejected)) if rejected == price
                ),
                "{price} should be rejected"
            );
        }

        assert!(
            validate(product(Decimal::new(1_500, 3))).is_ok(),
            "trailing zeros are not extra precision"
        );
    }

    #[test]
    fn names_are_trimmed_and_required() -> TestResult {
        let product = |name: &str| NewProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            price: Decimal::ONE,
        };

        assert!(
            matches!(validate(product("   ")), Err(ProductsServiceError::BlankName)),
            "blank names are rejected"
        );
        assert_eq!(validate(product("  Rye  "))?.name, "Rye");

        Ok(())
    }

    #[tokio::test]
    async fn negative_price_never_reaches_the_database() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: "Refund".to_string(),
                price: Decimal::new(-1, 0),
            })
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidPrice(_))),
            "expected InvalidPrice, got {result:?}"
        );
        assert!(ctx.products.list_products().await?.is_empty(), "nothing stored");

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_products_is_sorted_by_name() -> TestResult {
        let ctx = TestContext::new().await;

        for name in ["Tea", "Apples"] {
            ctx.products
                .create_product(NewProduct {
                    uuid: ProductUuid::new(),
                    name: name.to_string(),
                    price: Decimal::ONE,
                })
                .await?;
        }

        let names: Vec<String> = ctx
            .products
            .list_products()
            .await?
            .into_iter()
            .map(|product| product.name)
            .collect();

        assert_eq!(names, ["Apples", "Tea"]);

        Ok(())
    }
}
