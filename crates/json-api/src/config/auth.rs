//! Auth Config

use std::fmt::{self, Debug, Formatter};

use clap::Args;

/// Session token settings.
#[derive(Args)]
pub struct AuthConfig {
    /// Base64-encoded key for session token verifiers (at least 32 bytes)
    #[arg(long, env = "AUTH_TOKEN_HMAC_KEY", hide_env_values = true)]
    pub auth_token_hmac_key: String,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("auth_token_hmac_key", &"**redacted**")
            .finish()
    }
}
