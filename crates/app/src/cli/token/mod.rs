use clap::{Args, Subcommand};
use dispatch_app::auth::{PgAuthService, TokenHasher};

mod create;
mod list;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Issue a bearer session token for a user
    Create(create::CreateTokenArgs),

    /// List a user's session tokens
    List(list::ListTokensArgs),

    /// Revoke a session token
    Revoke(revoke::RevokeTokenArgs),
}

/// Connection settings shared by every token subcommand.
#[derive(Debug, Args)]
struct AuthArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Base64 HMAC key used to derive token verifiers
    #[arg(long, env = "AUTH_TOKEN_HMAC_KEY", hide_env_values = true)]
    auth_token_hmac_key: String,
}

impl AuthArgs {
    async fn service(&self) -> Result<PgAuthService, String> {
        let hasher = TokenHasher::from_base64(&self.auth_token_hmac_key)
            .map_err(|error| format!("invalid AUTH_TOKEN_HMAC_KEY: {error}"))?;

        Ok(PgAuthService::new(
            super::connect(&self.database_url).await?,
            hasher,
        ))
    }
}

pub(crate) async fn run(command: TokenCommand) -> Result<(), String> {
    match command.command {
        TokenSubcommand::Create(args) => create::run(args).await,
        TokenSubcommand::List(args) => list::run(args).await,
        TokenSubcommand::Revoke(args) => revoke::run(args).await,
    }
}
