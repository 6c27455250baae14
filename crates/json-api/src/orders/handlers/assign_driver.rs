//! Assign Driver Handler (admin)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Driver Assignment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriverAssignmentRequest {
    pub order_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

/// Assign Driver Handler
///
/// Replaces any previous assignment. The driver must be available and the
/// order not yet delivered.
#[endpoint(
    tags("orders"),
    summary = "Assign Driver",
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

    let (Some(order), Some(driver)) = (order_id, driver_id) else {
        return Err(ApiError::bad_request("Order ID and Driver ID are required"));
    };

    let order = state
        .app
        .orders
        .assign_driver(order.into(), driver.into())
        .await
        .map_err(into_api_error)?;

    info!(order = %order.uuid, driver = %driver, "driver assigned");

    Ok(ApiResponse::ok(order.into(), "Driver assigned successfully"))
}
