//! Update Payment Status Handler (admin)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dispatch_app::domain::orders::records::PaymentStatus;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Update Payment Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePaymentStatusRequest {
    pub order_id: Option<Uuid>,

    /// `pending`, `completed` or `failed`, case-insensitive
    #[serde(alias = "paymentStatus")]
    pub status: Option<String>,
}

/// Update Payment Status Handler
///
/// Manual override; any transition is allowed.
#[endpoint(
    tags("orders"),
    summary = "Update Payment Status",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<UpdatePaymentStatusRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<OrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let UpdatePaymentStatusRequest { order_id, status } = json.into_inner();

    let (Some(order), Some(status)) = (order_id, status) else {
        return Err(ApiError::bad_request(
            "Order ID and payment status are required",
        ));
    };

    let status: PaymentStatus = status
        .parse()
        .or_400("Payment status must be one of: Pending, Completed, Failed")?;

    let order = state
        .app
        .orders
        .update_payment_status(order.into(), status)
        .await
        .map_err(into_api_error)?;

    info!(order = %order.uuid, status = %status, "payment status overridden");

    Ok(ApiResponse::ok(
        order.into(),
        "Payment status updated successfully",
    ))
}
