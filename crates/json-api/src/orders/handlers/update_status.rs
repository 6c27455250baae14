//! Update Delivery Status Handler (admin)

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dispatch_app::domain::orders::records::DeliveryStatus;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::{DELIVERY_STATUSES, into_api_error},
        models::OrderResponse,
    },
    state::State,
};

/// Update Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStatusRequest {
    pub order_id: Option<Uuid>,

    /// `pending`, `on_my_way` or `delivered` (labels such as `On My Way`
    /// are accepted too)
    pub status: Option<String>,
}

/// Update Delivery Status Handler
///
/// Any transition is allowed. Delivered stamps the delivery time.
#[endpoint(
    tags("orders"),
    summary = "Update Delivery Status",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<UpdateStatusRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<OrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let UpdateStatusRequest { order_id, status } = json.into_inner();

    let (Some(order), Some(status)) = (order_id, status) else {
        return Err(ApiError::bad_request("Order ID and status are required"));
    };

    let status: DeliveryStatus = status
        .parse()
        .or_400(&format!("Status must be one of: {DELIVERY_STATUSES}"))?;

    let order = state
        .app
        .orders
        .update_delivery_status(order.into(), status)
        .await
        .map_err(into_api_error)?;

    info!(order = %order.uuid, status = %status, "delivery status updated");

    Ok(ApiResponse::ok(
        order.into(),
        "Order status updated successfully",
    ))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use dispatch_app::domain::{
        orders::{MockOrdersService, OrdersServiceError},
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
            Router::with_path("order/update-status").put(handler),
        )
    }

    #[tokio::test]
    async fn test_label_and_wire_values_are_accepted() -> TestResult {
        for label in ["On My Way", "on_my_way"] {
            let mut order = make_order(UserUuid::new());
            order.delivery_status = DeliveryStatus::OnMyWay;

            let order_uuid = order.uuid;

            let mut orders = MockOrdersService::new();

            orders
                .expect_update_delivery_status()
                .once()
                .withf(move |requested, status| {
                    *requested == order_uuid && *status == DeliveryStatus::OnMyWay
                })
                .return_once(move |_, _| Ok(order));

            let mut res = TestClient::put("http://example.com/order/update-status")
                .json(&json!({ "orderId": Uuid::from(order_uuid), "status": label }))
                .send(&make_service(orders))
                .await;

            let body: ApiResponse<OrderResponse> = res.take_json().await?;

            assert_eq!(body.message, "Order status updated successfully");
            assert_eq!(body.data.delivery_status, "on_my_way");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_lists_the_allowed_values() -> TestResult {
        let mut res = TestClient::put("http://example.com/order/update-status")
            .json(&json!({ "orderId": Uuid::now_v7(), "status": "Lost" }))
            .send(&make_service(strict_orders_mock()))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 400);
        assert_eq!(
            body.message,
            "Status must be one of: Pending, On My Way, Delivered"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() -> TestResult {
        let mut res = TestClient::put("http://example.com/order/update-status")
            .json(&json!({ "status": "Delivered" }))
            .send(&make_service(strict_orders_mock()))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.message, "Order ID and status are required");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_delivery_status()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let mut res = TestClient::put("http://example.com/order/update-status")
            .json(&json!({ "orderId": Uuid::now_v7(), "status": "Delivered" }))
            .send(&make_service(orders))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 404);
        assert_eq!(body.message, "Order not found");

        Ok(())
    }
}
