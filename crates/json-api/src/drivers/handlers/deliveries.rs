//! My Deliveries Handler (driver)

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use dispatch_app::domain::orders::{data::DeliveryFilter, records::DeliveryStatus};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::{DELIVERY_STATUSES, into_api_error},
        models::OrderResponse,
    },
    state::State,
};

/// My Deliveries Handler
///
/// Orders assigned to the caller, latest scheduled first.
#[endpoint(tags("drivers"), summary = "My Deliveries", security(("bearer_auth" = [])))]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    date: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<ApiResponse<Vec<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let filter = DeliveryFilter {
        status: status
            .into_inner()
            .map(|status| status.parse::<DeliveryStatus>())
            .transpose()
            .or_400(&format!("Status must be one of: {DELIVERY_STATUSES}"))?,
        date: date.into_date()?,
    };

    let deliveries = state
        .app
        .orders
        .list_driver_deliveries(identity.user, filter)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        deliveries.into_iter().map(OrderResponse::from).collect(),
        "Deliveries fetched successfully",
    ))
}
