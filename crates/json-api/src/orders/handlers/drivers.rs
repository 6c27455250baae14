//! List Drivers Handler (admin)

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::DriverDirectoryEntry,
    state::State,
    users::errors::into_api_error,
};

/// List Drivers Handler
///
/// Every driver with the orders currently assigned to them, optionally
/// filtered by availability.
#[endpoint(tags("drivers"), summary = "List Drivers", security(("bearer_auth" = [])))]
pub(crate) async fn handler(
    available: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<ApiResponse<Vec<DriverDirectoryEntry>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let drivers = state
        .app
        .users
        .list_drivers(available.into_inner())
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        drivers.into_iter().map(DriverDirectoryEntry::from).collect(),
        "Drivers fetched successfully",
    ))
}
