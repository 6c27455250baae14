//! Unassigned Orders Handler (admin)

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Unassigned Orders Handler
///
/// Paid orders that are not delivered and have no driver yet, soonest
/// scheduled first.
#[endpoint(
    tags("orders"),
    summary = "Unassigned Orders",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    date: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<ApiResponse<Vec<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let date = date.into_date()?;

    let orders = state
        .app
        .orders
        .list_unassigned_orders(date)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        orders.into_iter().map(OrderResponse::from).collect(),
        "Unassigned orders fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dispatch_app::domain::{
        orders::{MockOrdersService, records::PaymentStatus},
        users::records::{Role, UserUuid},
    };

    use crate::{
        envelope::ErrorBody,
        test_helpers::{StateBuilder, identity, make_order, service_as, strict_orders_mock},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            identity(Role::Admin),
            StateBuilder::new().orders(orders).build(),
            Router::with_path("order/unassigned").get(handler),
        )
    }

    #[tokio::test]
    async fn test_date_filter_is_parsed() -> TestResult {
        let mut order = make_order(UserUuid::new());
        order.payment_status = PaymentStatus::Completed;

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_unassigned_orders()
            .once()
            .withf(|filter| *filter == Some(date(2026, 11, 2)))
            .return_once(move |_| Ok(vec![order]));

        let mut res = TestClient::get("http://example.com/order/unassigned?date=2026-11-02")
            .send(&make_service(orders))
            .await;

        let body: ApiResponse<Vec<OrderResponse>> = res.take_json().await?;

        assert_eq!(body.message, "Unassigned orders fetched successfully");
        assert_eq!(body.data.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_date_is_rejected() -> TestResult {
        let mut res = TestClient::get("http://example.com/order/unassigned?date=soon")
            .send(&make_service(strict_orders_mock()))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 400);
        assert_eq!(body.message, "date must be formatted as YYYY-MM-DD");

        Ok(())
    }
}
