//! Driver Stats Handler (admin)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dispatch_app::domain::{
    orders::data::DeliveryFilter,
    users::{UsersServiceError, records::Role},
};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::into_api_error,
        models::{DriverResponse, DriverStatsResponse, OrderResponse},
    },
    state::State,
    users,
};

const RECENT_DELIVERIES: usize = 10;

/// Admin Driver Stats Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminDriverStatsResponse {
    pub driver_info: DriverResponse,
    pub stats: DriverStatsResponse,

    /// Latest assigned orders, newest first
    pub recent_deliveries: Vec<OrderResponse>,
}

/// Driver Stats Handler
///
/// Delivery counters of one driver with their latest deliveries.
#[endpoint(
    tags("drivers"),
    summary = "Driver Stats",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    driver: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<ApiResponse<AdminDriverStatsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let driver = driver.into_inner().into();

    let user = state
        .app
        .users
        .get_user(driver)
        .await
        .map_err(|error| match error {
            UsersServiceError::NotFound => ApiError::not_found("Driver not found"),
            other => users::errors::into_api_error(other),
        })?;

    if user.role != Role::Driver {
        return Err(ApiError::bad_request("User is not a driver"));
    }

    let stats = state
        .app
        .orders
        .driver_stats(driver)
        .await
        .map_err(into_api_error)?;

    let recent_deliveries = state
        .app
        .orders
        .list_driver_deliveries(driver, DeliveryFilter::default())
        .await
        .map_err(into_api_error)?
        .into_iter()
        .take(RECENT_DELIVERIES)
        .map(OrderResponse::from)
        .collect();

    Ok(ApiResponse::ok(
        AdminDriverStatsResponse {
            driver_info: user.into(),
            stats: stats.into(),
            recent_deliveries,
        },
        "Driver stats fetched successfully",
    ))
}
