//! Server configuration module

use clap::Parser;

use crate::config::{
    auth::AuthConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    payments::PaymentsConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;

/// Dispatch JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "dispatch-json", about = "Dispatch JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Session token settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const REQUIRED: [&str; 9] = [
        "dispatch-json",
        "--database-url",
        "postgres://localhost/dispatch",
        "--auth-token-hmac-key",
        "a2V5",
        "--stripe-secret-key",
        "sk_test_123",
        "--stripe-webhook-secret",
        "whsec_123",
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_given() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.payments.currency, "usd");
        assert_eq!(config.payments.api_base, "https://api.stripe.com");
        assert_eq!(config.payments.timeout_secs, 10);
        assert_eq!(config.payments.webhook_tolerance_secs, 300);
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);
        assert_eq!(config.database.pool().max_connections, 10);
        assert_eq!(config.database.pool().acquire_timeout.as_secs(), 5);

        Ok(())
    }

    #[test]
    fn missing_payment_secret_is_rejected() {
        let args = REQUIRED
            .iter()
            .copied()
            .filter(|arg| !arg.starts_with("--stripe-secret-key") && *arg != "sk_test_123");

        assert!(
            ServerConfig::try_parse_from(args).is_err(),
            "stripe secret key must be required"
        );
    }

    #[test]
    fn secrets_are_redacted_from_debug_output() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;
        let debug = format!("{config:?}");

        assert!(!debug.contains("sk_test_123"), "secret key leaked: {debug}");
        assert!(!debug.contains("whsec_123"), "webhook secret leaked: {debug}");
        assert!(!debug.contains("a2V5"), "hmac key leaked: {debug}");

        Ok(())
    }
}
