//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    orders::records::OrderUuid,
    users::{
        data::{NewAddress, NewUser},
        records::{AddressRecord, AddressUuid, DriverRecord, Role, UserRecord, UserUuid},
    },
};

const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const SET_AVAILABILITY_SQL: &str = include_str!("sql/set_availability.sql");
const LIST_DRIVERS_SQL: &str = include_str!("sql/list_drivers.sql");
const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const GET_USER_ADDRESS_SQL: &str = include_str!("sql/get_user_address.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: NewUser,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.name)
            .bind(user.email)
            .bind(user.phone)
            .bind(user.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_availability(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        is_available: bool,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(SET_AVAILABILITY_SQL)
            .bind(user.into_uuid())
            .bind(is_available)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_drivers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        available: Option<bool>,
    ) -> Result<Vec<DriverRecord>, sqlx::Error> {
        query_as::<Postgres, DriverRecord>(LIST_DRIVERS_SQL)
            .bind(available)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(address.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(address.label)
            .bind(address.line1)
            .bind(address.line2)
            .bind(address.city)
            .bind(address.postal_code)
            .bind(address.country)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an address only if it belongs to `user`.
    pub(crate) async fn get_user_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(GET_USER_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role
            .parse::<Role>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: Box::new(error),
            })?;

        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            role,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for DriverRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let assigned_deliveries: Vec<Uuid> = row.try_get("assigned_deliveries")?;

        Ok(Self {
            user: UserRecord::from_row(row)?,
            assigned_deliveries: assigned_deliveries
                .into_iter()
                .map(OrderUuid::from_uuid)
                .collect(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            label: row.try_get("label")?,
            line1: row.try_get("line1")?,
            line2: row.try_get("line2")?,
            city: row.try_get("city")?,
            postal_code: row.try_get("postal_code")?,
            country: row.try_get("country")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
