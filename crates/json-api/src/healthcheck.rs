//! Liveness probe.

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    state::State,
};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    /// Always `ok` when the process answers
    pub status: String,

    /// Build version
    pub version: String,

    /// Whole seconds since the server started
    pub uptime_seconds: i64,
}

/// Healthcheck handler
///
/// Does not touch the database or the payment provider.
#[endpoint(tags("health"), summary = "Health check endpoint")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<ApiResponse<HealthResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    Ok(ApiResponse::ok(
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.uptime().as_secs(),
        },
        "Service is healthy",
    ))
}
