//! Unassign Driver Handler (admin)

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        assign_driver::DriverAssignmentRequest, errors::into_api_error, models::OrderResponse,
    },
    state::State,
};

/// Unassign Driver Handler
///
/// Clears the assignment and resets delivery to pending. When `driverId` is
/// given it must match the current assignee.
#[endpoint(
    tags("orders"),
    summary = "Unassign Driver",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<DriverAssignmentRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<OrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let DriverAssignmentRequest {
        order_id,
        driver_id,
    } = json.into_inner();

    let order = order_id.ok_or_else(|| ApiError::bad_request("Order ID is required"))?;

    let order = state
        .app
        .orders
        .unassign_driver(order.into(), driver_id.map(Into::into))
        .await
        .map_err(into_api_error)?;

    info!(order = %order.uuid, "driver unassigned");

    Ok(ApiResponse::ok(order.into(), "Driver unassigned successfully"))
}
