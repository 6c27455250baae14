//! Carts Repository

use sqlx::{Postgres, Row, Transaction, query, query_as};
use uuid::Uuid;

use crate::domain::{
    carts::records::{CartRecord, CartUuid},
    users::records::UserUuid,
};

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const CLEAR_CART_SQL: &str = include_str!("../sql/clear_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Return the user's cart, creating an empty one on first use.
    pub(crate) async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        let (uuid, user_uuid): (Uuid, Uuid) = query_as(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(empty_cart(uuid, user_uuid))
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        let row = query(FIND_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| -> Result<CartRecord, sqlx::Error> {
            Ok(empty_cart(row.try_get("uuid")?, row.try_get("user_uuid")?))
        })
        .transpose()
    }

    /// Remove every line from the user's cart. Returns the number removed.
    pub(crate) async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn empty_cart(uuid: Uuid, user_uuid: Uuid) -> CartRecord {
    CartRecord {
        uuid: CartUuid::from_uuid(uuid),
        user_uuid: UserUuid::from_uuid(user_uuid),
        items: Vec::new(),
    }
}
