//! Test context for service-level integration tests.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    auth::{PgAuthService, TokenHasher},
    domain::{
        carts::PgCartsService, orders::PgOrdersService, products::PgProductsService,
        users::PgUsersService,
    },
    payments::MockPaymentGateway,
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub users: PgUsersService,
    pub products: PgProductsService,
    pub carts: PgCartsService,
    pub auth: PgAuthService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;
        let handle = db.handle();

        let hasher = TokenHasher::from_base64(&BASE64.encode([42_u8; 32]))
            .expect("Failed to build token hasher");

        Self {
            users: PgUsersService::new(handle.clone()),
            products: PgProductsService::new(handle.clone()),
            carts: PgCartsService::new(handle.clone()),
            auth: PgAuthService::new(handle, hasher),
            db,
        }
    }

    /// Orders service charging in USD through the given mock gateway.
    pub fn orders_with(&self, gateway: MockPaymentGateway) -> PgOrdersService {
        PgOrdersService::new(self.db.handle(), Arc::new(gateway), "usd")
            .expect("Failed to build orders service")
    }
}
