//! Check Payment Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dispatch_app::domain::orders::data::{PaymentCheck, PaymentOutcome};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    observability::observe_payment_reconciliation,
    orders::{
        errors::into_api_error,
        models::{OrderResponse, outcome_label},
    },
    state::State,
};

/// Order Reference Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderReferenceRequest {
    pub order_id: Option<Uuid>,
}

impl OrderReferenceRequest {
    pub(crate) fn order_id(&self) -> Result<Uuid, ApiError> {
        self.order_id
            .ok_or_else(|| ApiError::bad_request("Order ID is required"))
    }
}

/// Payment Check Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentCheckResponse {
    pub order_id: Uuid,
    pub order_number: String,

    /// Stored payment status after reconciliation
    pub payment_status: String,

    /// Provider state when it did not settle the order
    pub intent_status: Option<String>,
    pub delivery_status: String,
    pub order: OrderResponse,
}

impl From<PaymentCheck> for PaymentCheckResponse {
    fn from(check: PaymentCheck) -> Self {
        let intent_status = match &check.outcome {
            PaymentOutcome::Processing => Some("processing".to_string()),
            PaymentOutcome::RequiresPaymentMethod => Some("requires_payment_method".to_string()),
            PaymentOutcome::Unsettled(status) => Some(status.to_string()),
            PaymentOutcome::Completed
            | PaymentOutcome::AwaitingPayment
            | PaymentOutcome::Canceled
            | PaymentOutcome::Failed => None,
        };

        Self {
            order_id: check.order.uuid.into(),
            order_number: check.order.order_number.clone(),
            payment_status: check.order.payment_status.to_string(),
            intent_status,
            delivery_status: check.order.delivery_status.to_string(),
            order: check.order.into(),
        }
    }
}

/// Response status and message the customer sees for an outcome.
fn describe(outcome: &PaymentOutcome) -> (StatusCode, String) {
    match outcome {
        PaymentOutcome::Completed => (
            StatusCode::OK,
            "Payment successful! Order confirmed.".to_string(),
        ),
        PaymentOutcome::Processing => (
            StatusCode::ACCEPTED,
            "Payment is still being processed".to_string(),
        ),
        PaymentOutcome::AwaitingPayment => {
            (StatusCode::OK, "Order payment status retrieved".to_string())
        }
        PaymentOutcome::RequiresPaymentMethod => (
            StatusCode::BAD_REQUEST,
            "Payment method failed. Please try again.".to_string(),
        ),
        PaymentOutcome::Canceled => (StatusCode::BAD_REQUEST, "Payment was canceled".to_string()),
        PaymentOutcome::Failed => (
            StatusCode::BAD_REQUEST,
            "Payment failed. Please try again.".to_string(),
        ),
        PaymentOutcome::Unsettled(status) => {
            (StatusCode::BAD_REQUEST, format!("Payment status: {status}"))
        }
    }
}

/// Check Payment Status Handler
///
/// Reconciles the order with the payment provider. Outcomes that leave the
/// order unpaid still carry the order in `data`, with `success: false`.
#[endpoint(
    tags("orders"),
    summary = "Check Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::ACCEPTED, description = "Payment still processing"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<OrderReferenceRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<PaymentCheckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let order = json.into_inner().order_id()?;

    let check = state
        .app
        .orders
        .check_payment_status(identity.user, order.into())
        .await
        .map_err(into_api_error)?;

    observe_payment_reconciliation("poll", outcome_label(&check.outcome));

    let (status, message) = describe(&check.outcome);

    Ok(ApiResponse::new(status, check.into(), message))
}
