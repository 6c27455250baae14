//! Sales Summary Handler (admin)

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use dispatch_app::domain::orders::data::SalesSummary;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::money},
    state::State,
};

/// Sales Response
///
/// Revenue of paid orders. Percentages compare today with yesterday and this
/// ISO week with the last one; they are zero when the earlier period had no
/// sales.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SalesResponse {
    pub total_sales: String,
    pub today_sales: String,
    pub yesterday_sales: String,
    pub this_week_sales: String,
    pub last_week_sales: String,
    pub today_percentage: String,
    pub week_percentage: String,
}

impl From<SalesSummary> for SalesResponse {
    fn from(summary: SalesSummary) -> Self {
        Self {
            total_sales: money(summary.total),
            today_sales: money(summary.today),
            yesterday_sales: money(summary.yesterday),
            this_week_sales: money(summary.this_week),
            last_week_sales: money(summary.last_week),
            today_percentage: money(summary.today_change()),
            week_percentage: money(summary.week_change()),
        }
    }
}

/// Sales Summary Handler
#[endpoint(tags("orders"), summary = "Sales Summary", security(("bearer_auth" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<ApiResponse<SalesResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let summary = state
        .app
        .orders
        .sales_summary()
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        summary.into(),
        "Order sales fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dispatch_app::domain::{orders::MockOrdersService, users::records::Role};

    use crate::test_helpers::{StateBuilder, identity, service_as};

    use super::*;

    #[tokio::test]
    async fn test_sales_report_changes_against_prior_periods() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_sales_summary().once().return_once(|| {
            Ok(SalesSummary {
                total: Decimal::new(500_00, 2),
                today: Decimal::new(150_00, 2),
                yesterday: Decimal::new(100_00, 2),
                this_week: Decimal::new(250_00, 2),
                last_week: Decimal::ZERO,
            })
        });

        let service = service_as(
            identity(Role::Admin),
            StateBuilder::new().orders(orders).build(),
            Router::with_path("order/sales").get(handler),
        );

        let mut res = TestClient::get("http://example.com/order/sales")
            .send(&service)
            .await;

        let body: ApiResponse<SalesResponse> = res.take_json().await?;

        assert_eq!(body.message, "Order sales fetched successfully");
        assert_eq!(body.data.total_sales, "500.00");
        assert_eq!(body.data.today_percentage, "50.00");
        assert_eq!(body.data.week_percentage, "0.00");

        Ok(())
    }
}
