//! Payment gateway errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment gateway request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("payment gateway transport error")]
    Http(#[source] reqwest::Error),

    #[error("payment intent not found")]
    IntentNotFound,

    #[error("payment gateway responded with {status}: {message}")]
    UnexpectedResponse { status: u16, message: String },
}

impl From<reqwest::Error> for PaymentGatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout(error);
        }

        Self::Http(error)
    }
}

/// Inbound webhook verification failures.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingHeader,

    #[error("malformed signature header")]
    MalformedHeader,

    #[error("timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,

    #[error("no signatures found matching the expected signature for payload")]
    SignatureMismatch,

    #[error("webhook secret is unusable")]
    InvalidSecret,

    #[error("invalid webhook payload")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Gateway configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum PaymentConfigError {
    #[error("payment gateway secret key is missing")]
    MissingSecretKey,

    #[error("payment gateway secret key must start with \"sk_\"")]
    InvalidSecretKey,

    #[error("payment webhook secret is missing")]
    MissingWebhookSecret,

    #[error("payment gateway API base is not a valid URL: {0}")]
    InvalidApiBase(String),

    #[error("payment gateway timeout must be greater than zero")]
    InvalidTimeout,

    #[error("failed to build payment gateway HTTP client")]
    Client(#[source] reqwest::Error),
}
