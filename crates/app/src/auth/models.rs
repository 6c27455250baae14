//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    auth::SessionTokenVersion,
    domain::users::records::{Role, UserUuid},
};

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user: UserUuid,
    pub role: Role,
}

/// Session token data used during bearer authentication.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSessionToken {
    pub user_uuid: UserUuid,

    pub role: Role,

    pub version: SessionTokenVersion,

    /// HMAC verifier for the token secret material.
    pub token_hash: String,
}

/// Session token metadata persisted in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTokenMetadata {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub version: SessionTokenVersion,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub(crate) struct NewSessionToken {
    pub uuid: Uuid,
    pub user_uuid: UserUuid,
    pub version: SessionTokenVersion,
    pub token_hash: String,
    pub expires_at: Option<Timestamp>,
}

/// Issuance result; `token` is shown once and never stored.
#[derive(Clone)]
pub struct IssuedSessionToken {
    pub token: String,
    pub metadata: SessionTokenMetadata,
}

impl std::fmt::Debug for IssuedSessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedSessionToken")
            .field("token", &"**redacted**")
            .field("metadata", &self.metadata)
            .finish()
    }
}
