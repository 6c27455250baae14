//! Payment gateway trait.

use async_trait::async_trait;
use mockall::automock;

use crate::payments::{
    GatewayEvent, NewPaymentIntent, PaymentGatewayError, PaymentIntent, WebhookError,
};

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for an amount in minor units.
    async fn create_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Fetch the provider's current view of an intent.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Verify a webhook signature over the raw body and parse the event.
    fn verify_event(&self, payload: &[u8], signature: &str)
    -> Result<GatewayEvent, WebhookError>;
}
