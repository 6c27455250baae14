//! My Stats Handler (driver)

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::DriverStatsResponse},
    state::State,
};

/// My Stats Handler
#[endpoint(tags("drivers"), summary = "My Delivery Stats", security(("bearer_auth" = [])))]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<ApiResponse<DriverStatsResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let stats = state
        .app
        .orders
        .driver_stats(identity.user)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        stats.into(),
        "Driver stats fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dispatch_app::domain::{
        orders::{MockOrdersService, data::DriverStats},
        users::records::Role,
    };

    use crate::test_helpers::{StateBuilder, identity, service_as};

    use super::*;

    #[tokio::test]
    async fn test_completion_rate_is_zero_without_deliveries() -> TestResult {
        let caller = identity(Role::Driver);

        let mut orders = MockOrdersService::new();

        orders
            .expect_driver_stats()
            .once()
            .withf(move |driver| *driver == caller.user)
            .return_once(|_| Ok(DriverStats::default()));

        let service = service_as(
            caller,
            StateBuilder::new().orders(orders).build(),
            Router::with_path("order/driver-stats").get(handler),
        );

        let mut res = TestClient::get("http://example.com/order/driver-stats")
            .send(&service)
            .await;

        let body: ApiResponse<DriverStatsResponse> = res.take_json().await?;

        assert_eq!(body.data.total_deliveries, 0);
        assert_eq!(body.data.completion_rate, "0.00");

        Ok(())
    }
}
