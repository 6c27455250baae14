//! List Orders Handler (admin)

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use dispatch_app::domain::orders::{
    data::{DEFAULT_PAGE_LIMIT, OrderFilter},
    records::DeliveryStatus,
};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::{DELIVERY_STATUSES, into_api_error},
        models::OrdersPageResponse,
    },
    state::State,
};

/// List Orders Handler
///
/// Every order, newest first, filtered by delivery status, driver
/// (`driverId`) and scheduled date. `page` starts at 1; `limit` is at most
/// 100.
#[endpoint(tags("orders"), summary = "List Orders", security(("bearer_auth" = [])))]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    date: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<ApiResponse<OrdersPageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .map(|status| status.parse::<DeliveryStatus>())
        .transpose()
        .or_400(&format!("Status must be one of: {DELIVERY_STATUSES}"))?;

    let driver = req
        .query::<String>("driverId")
        .map(|driver| driver.parse::<Uuid>())
        .transpose()
        .or_400("driverId must be a valid UUID")?;

    let filter = OrderFilter {
        status,
        driver: driver.map(Into::into),
        date: date.into_date()?,
        page: page.into_inner().unwrap_or(1),
        limit: limit.into_inner().unwrap_or(DEFAULT_PAGE_LIMIT),
    };

    let page = state
        .app
        .orders
        .list_orders(filter)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(page.into(), "Orders fetched successfully"))
}
