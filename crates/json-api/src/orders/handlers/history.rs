//! Order History Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Order History Handler
///
/// The caller's orders, newest first.
#[endpoint(tags("orders"), summary = "Order History", security(("bearer_auth" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<ApiResponse<Vec<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let orders = state
        .app
        .orders
        .list_user_orders(identity.user)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        orders.into_iter().map(OrderResponse::from).collect(),
        "Orders fetched successfully",
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use dispatch_app::domain::{orders::MockOrdersService, users::records::Role};

    use crate::test_helpers::{StateBuilder, identity, make_order, service_as};

    use super::*;

    #[tokio::test]
    async fn test_history_lists_only_the_callers_orders() -> TestResult {
        let caller = identity(Role::User);
        let order = make_order(caller.user);

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_user_orders()
            .once()
            .withf(move |user| *user == caller.user)
            .return_once(move |_| Ok(vec![order]));

        let service = service_as(
            caller,
            StateBuilder::new().orders(orders).build(),
            Router::with_path("order/history").get(handler),
        );

        let mut res = TestClient::get("http://example.com/order/history")
            .send(&service)
            .await;

        let body: ApiResponse<Vec<OrderResponse>> = res.take_json().await?;

        assert_eq!(body.message, "Orders fetched successfully");
        assert_eq!(body.data.len(), 1);
        assert_eq!(
            body.data.first().map(|order| order.user_id),
            Some(caller.user.into())
        );

        Ok(())
    }
}
