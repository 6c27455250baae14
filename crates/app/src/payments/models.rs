//! Payment gateway models.

use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
};

use serde::Deserialize;

/// Payment intent creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Provider-side payment intent.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,

    /// Client-usable confirmation token. Never persist or log this.
    pub client_secret: Option<String>,

    pub status: IntentStatus,

    #[serde(rename = "amount")]
    pub amount_minor: i64,

    pub currency: String,
}

impl Debug for PaymentIntent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("id", &self.id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "**redacted**"),
            )
            .field("status", &self.status)
            .field("amount_minor", &self.amount_minor)
            .field("currency", &self.currency)
            .finish()
    }
}

/// Provider payment intent status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum IntentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    RequiresCapture,
    Canceled,
    Other(String),
}

impl IntentStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for IntentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified inbound gateway event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// Any `payment_intent.*` event, carrying the intent snapshot.
    PaymentIntent {
        id: String,
        kind: String,
        intent: PaymentIntent,
    },

    /// An event type this system does not act on.
    Other { id: String, kind: String },
}

impl GatewayEvent {
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::PaymentIntent { kind, .. } | Self::Other { kind, .. } => kind,
        }
    }
}
