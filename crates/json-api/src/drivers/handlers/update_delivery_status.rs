//! Update Delivery Status Handler (driver)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dispatch_app::domain::orders::records::DeliveryStatus;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::{DRIVER_STATUSES, into_api_error},
        models::OrderResponse,
    },
    state::State,
};

/// Delivery Progress Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryProgressRequest {
    pub order_id: Option<Uuid>,

    /// `on_my_way` or `delivered` (`On My Way` and `Delivered` also accepted)
    pub status: Option<String>,

    /// Replaces any earlier notes
    pub notes: Option<String>,
}

/// Update Delivery Status Handler
///
/// Progress reported by the assigned driver.
#[endpoint(
    tags("drivers"),
    summary = "Update My Delivery Status",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<DeliveryProgressRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<OrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let DeliveryProgressRequest {
        order_id,
        status,
        notes,
    } = json.into_inner();

    let (Some(order), Some(status)) = (order_id, status) else {
        return Err(ApiError::bad_request("Order ID and status are required"));
    };

    let status: DeliveryStatus = status
        .parse()
        .or_400(&format!("Status must be one of: {DRIVER_STATUSES}"))?;

    let order = state
        .app
        .orders
        .driver_update_status(order.into(), identity.user, status, notes)
        .await
        .map_err(into_api_error)?;

    info!(order = %order.uuid, status = %status, "delivery progressed");

    Ok(ApiResponse::ok(
        order.into(),
        "Delivery status updated successfully",
    ))
}
