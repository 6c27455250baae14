//! Receive Webhook Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dispatch_app::domain::orders::data::WebhookOutcome;

use crate::{
    envelope::ApiError,
    extensions::*,
    observability::observe_payment_reconciliation,
    orders::{errors::into_api_error, models::outcome_label},
    state::State,
};

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Webhook Acknowledgement
///
/// Sent as-is, outside the response envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookAck {
    pub received: bool,
}

/// Receive Webhook Handler
///
/// Verifies the provider signature over the raw body and reconciles the
/// order the event refers to. Events for unknown intents and event types
/// that are not acted on are acknowledged too.
#[endpoint(
    tags("payments"),
    summary = "Payment Provider Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Event acknowledged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Signature or payload rejected"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookAck>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let signature = req
        .header::<String>(SIGNATURE_HEADER)
        .unwrap_or_default();

    let payload = req
        .payload()
        .await
        .map_err(|error| ApiError::bad_request(format!("Webhook Error: {error}")))?;

    let outcome = state
        .app
        .orders
        .handle_webhook(payload, &signature)
        .await
        .map_err(|error| {
            observe_payment_reconciliation("webhook", "rejected");

            into_api_error(error)
        })?;

    match &outcome {
        WebhookOutcome::Reconciled(check) => {
            observe_payment_reconciliation("webhook", outcome_label(&check.outcome));

            info!(
                order = %check.order.uuid,
                payment_status = %check.order.payment_status,
                "webhook reconciled order"
            );
        }
        WebhookOutcome::UnknownIntent { intent_id } => {
            observe_payment_reconciliation("webhook", "unknown_intent");

            warn!(%intent_id, "webhook acknowledged without matching order");
        }
        WebhookOutcome::Ignored { kind } => {
            observe_payment_reconciliation("webhook", "ignored");

            info!(%kind, "webhook event ignored");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
