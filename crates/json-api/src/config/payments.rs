//! Payments Config

use std::{
    fmt::{self, Debug, Formatter},
    time::Duration,
};

use clap::Args;

use dispatch_app::payments::StripeConfig;

/// Payment gateway settings.
#[derive(Args)]
pub struct PaymentsConfig {
    /// Stripe secret API key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: String,

    /// Stripe webhook signing secret
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub stripe_webhook_secret: String,

    /// Stripe API base URL
    #[arg(
        long = "stripe-api-base",
        env = "STRIPE_API_BASE",
        default_value = "https://api.stripe.com"
    )]
    pub api_base: String,

    /// ISO 4217 currency orders are charged in
    #[arg(
        long = "payment-currency",
        env = "PAYMENT_CURRENCY",
        default_value = "usd"
    )]
    pub currency: String,

    /// Timeout for payment gateway requests, in seconds
    #[arg(
        id = "payment_gateway_timeout_secs",
        long = "payment-gateway-timeout-secs",
        env = "PAYMENT_GATEWAY_TIMEOUT_SECS",
        default_value_t = 10_u64
    )]
    pub timeout_secs: u64,

    /// Accepted age of webhook signatures, in seconds
    #[arg(
        long = "stripe-webhook-tolerance-secs",
        env = "STRIPE_WEBHOOK_TOLERANCE_SECS",
        default_value_t = 300_u64
    )]
    pub webhook_tolerance_secs: u64,
}

impl PaymentsConfig {
    /// Gateway configuration; validated when the gateway is built.
    pub fn stripe(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.api_base.clone(),
            secret_key: self.stripe_secret_key.clone(),
            webhook_secret: self.stripe_webhook_secret.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            webhook_tolerance: Duration::from_secs(self.webhook_tolerance_secs),
        }
    }
}

impl Debug for PaymentsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("stripe_secret_key", &"**redacted**")
            .field("stripe_webhook_secret", &"**redacted**")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .field("timeout_secs", &self.timeout_secs)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}
