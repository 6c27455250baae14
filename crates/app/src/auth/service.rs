//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::{
        AuthServiceError, Identity, IssuedSessionToken, SessionTokenMetadata,
        SessionTokenVersion, TokenHasher, build_verifier_input, format_session_token,
        generate_session_token_secret,
        models::NewSessionToken,
        parse_session_token,
        repository::PgAuthRepository,
    },
    database::Db,
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    hasher: TokenHasher,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, hasher: TokenHasher) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
            hasher,
        }
    }

    /// Issue a new session token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the insert fails.
    pub async fn issue_session_token(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedSessionToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let version = SessionTokenVersion::V1;
        let secret = generate_session_token_secret();
        let token = format_session_token(token_uuid, version, &secret);

        let token_hash = self
            .hasher
            .hmac(&build_verifier_input(&token_uuid, version, user, &secret));

        let mut tx = self.db.begin().await?;

        let metadata = self
            .repository
            .create_session_token(
                &mut tx,
                &NewSessionToken {
                    uuid: token_uuid,
                    user_uuid: user,
                    version,
                    token_hash,
                    expires_at,
                },
            )
            .await?;

        tx.commit().await?;

        Ok(IssuedSessionToken { token, metadata })
    }

    /// List all tokens issued to the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_session_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<SessionTokenMetadata>, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let tokens = self.repository.list_session_tokens(&mut tx, user).await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_session_token(&self, token: Uuid) -> Result<bool, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let revoked = self.repository.revoke_session_token(&mut tx, token).await?;

        tx.commit().await?;

        Ok(revoked.is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError> {
        let parsed = parse_session_token(bearer_token).map_err(|error| {
            debug!("rejecting malformed bearer token: {error}");

            AuthServiceError::NotFound
        })?;

        let mut tx = self.db.begin().await?;

        let token = self
            .repository
            .find_active_session_token(&mut tx, parsed.token_uuid, parsed.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let verifier_input = build_verifier_input(
            &parsed.token_uuid,
            parsed.version,
            token.user_uuid,
            &parsed.secret,
        );

        if !self.hasher.verify(&verifier_input, &token.token_hash) {
            return Err(AuthServiceError::NotFound);
        }

        // Best-effort metadata update; auth success should not depend on this write.
        if let Err(error) = self
            .repository
            .touch_session_token(&mut tx, parsed.token_uuid)
            .await
        {
            warn!(token = %parsed.token_uuid, "failed to record token use: {error}");
        }

        tx.commit().await?;

        Ok(Identity {
            user: token.user_uuid,
            role: token.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the caller's identity.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError>;
}
