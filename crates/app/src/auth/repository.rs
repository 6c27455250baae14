//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::{
        SessionTokenVersion,
        models::{ActiveSessionToken, NewSessionToken, SessionTokenMetadata},
    },
    domain::users::records::{Role, UserUuid},
};

const FIND_ACTIVE_SESSION_TOKEN_SQL: &str = include_str!("sql/find_active_session_token.sql");
const CREATE_SESSION_TOKEN_SQL: &str = include_str!("sql/create_session_token.sql");
const LIST_SESSION_TOKENS_SQL: &str = include_str!("sql/list_session_tokens.sql");
const REVOKE_SESSION_TOKEN_SQL: &str = include_str!("sql/revoke_session_token.sql");
const TOUCH_SESSION_TOKEN_SQL: &str = include_str!("sql/touch_session_token.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_active_session_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: Uuid,
        version: SessionTokenVersion,
    ) -> Result<Option<ActiveSessionToken>, sqlx::Error> {
        query_as::<Postgres, ActiveSessionToken>(FIND_ACTIVE_SESSION_TOKEN_SQL)
            .bind(token)
            .bind(version.as_i16())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_session_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &NewSessionToken,
    ) -> Result<SessionTokenMetadata, sqlx::Error> {
        query_as::<Postgres, SessionTokenMetadata>(CREATE_SESSION_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.user_uuid.into_uuid())
            .bind(token.version.as_i16())
            .bind(&token.token_hash)
            .bind(token.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_session_tokens(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<SessionTokenMetadata>, sqlx::Error> {
        query_as::<Postgres, SessionTokenMetadata>(LIST_SESSION_TOKENS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn revoke_session_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: Uuid,
    ) -> Result<Option<SessionTokenMetadata>, sqlx::Error> {
        query_as::<Postgres, SessionTokenMetadata>(REVOKE_SESSION_TOKEN_SQL)
            .bind(token)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn touch_session_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: Uuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_SESSION_TOKEN_SQL)
            .bind(token)
            .execute(&mut **tx)
            .await
            .map(|_| ())
    }
}

fn decode_version(row: &PgRow) -> sqlx::Result<SessionTokenVersion> {
    let version: i16 = row.try_get("version")?;

    SessionTokenVersion::try_from(version).map_err(|error| sqlx::Error::ColumnDecode {
        index: "version".to_string(),
        source: Box::new(error),
    })
}

impl<'r> FromRow<'r, PgRow> for ActiveSessionToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role
            .parse::<Role>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: Box::new(error),
            })?;

        Ok(Self {
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            role,
            version: decode_version(row)?,
            token_hash: row.try_get("token_hash")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SessionTokenMetadata {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get("uuid")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            version: decode_version(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
