//! Update Availability Handler (driver)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::DriverResponse,
    state::State,
    users::errors::into_api_error,
};

/// Availability Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvailabilityRequest {
    /// Anything but a JSON boolean is rejected
    #[salvo(schema(value_type = Option<bool>))]
    pub is_available: Option<Value>,
}

/// Update Availability Handler
#[endpoint(
    tags("drivers"),
    summary = "Update My Availability",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<AvailabilityRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<DriverResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let available = json
        .into_inner()
        .is_available
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::bad_request("isAvailable must be a boolean value"))?;

    let driver = state
        .app
        .users
        .set_availability(identity.user, available)
        .await
        .map_err(into_api_error)?;

    info!(driver = %driver.uuid, available, "driver availability changed");

    Ok(ApiResponse::ok(
        driver.into(),
        "Availability updated successfully",
    ))
}
