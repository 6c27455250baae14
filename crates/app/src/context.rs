//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService, TokenHasher},
    database::{self, Db, PoolSettings},
    domain::{
        carts::{CartsService, PgCartsService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        users::{PgUsersService, UsersService},
    },
    money::MoneyError,
    payments::PaymentGateway,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("unsupported payment currency")]
    Currency(#[source] MoneyError),
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// payment currency is not recognised.
    pub async fn from_database_url(
        url: &str,
        pool: PoolSettings,
        hasher: TokenHasher,
        gateway: Arc<dyn PaymentGateway>,
        currency: &str,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        Self::from_db(Db::new(pool), hasher, gateway, currency)
    }

    /// Build application context over an existing pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the payment currency is not recognised.
    pub fn from_db(
        db: Db,
        hasher: TokenHasher,
        gateway: Arc<dyn PaymentGateway>,
        currency: &str,
    ) -> Result<Self, AppInitError> {
        let orders =
            PgOrdersService::new(db.clone(), gateway, currency).map_err(AppInitError::Currency)?;

        Ok(Self {
            users: Arc::new(PgUsersService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(orders),
            auth: Arc::new(PgAuthService::new(db, hasher)),
        })
    }
}
