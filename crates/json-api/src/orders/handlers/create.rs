//! Create Order Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use dispatch_app::domain::orders::data::{CheckoutReceipt, NewOrder};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        errors::into_api_error,
        models::{OrderItemResponse, money},
    },
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    /// One of the caller's saved addresses
    pub address_id: Option<Uuid>,

    /// `YYYY-MM-DD` or an RFC 3339 timestamp; today or later (UTC)
    pub scheduled_delivery_date: Option<String>,

    /// Defaults to zero
    #[salvo(schema(value_type = Option<f64>))]
    pub delivery_charges: Option<Decimal>,

    pub customer_note: Option<String>,
}

impl TryFrom<CreateOrderRequest> for NewOrder {
    type Error = ApiError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        let address_uuid = request
            .address_id
            .ok_or_else(|| ApiError::bad_request("Address ID is required"))?;

        let date = request
            .scheduled_delivery_date
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Scheduled delivery date is required"))?;

        let scheduled_delivery_date = parse_date(&date).ok_or_else(|| {
            ApiError::bad_request("Scheduled delivery date must be formatted as YYYY-MM-DD")
        })?;

        Ok(NewOrder {
            address_uuid: address_uuid.into(),
            scheduled_delivery_date,
            customer_note: request
                .customer_note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            delivery_charges: request.delivery_charges.unwrap_or_default(),
        })
    }
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub payment_intent_id: Option<String>,

    /// Secret the client confirms the payment with
    pub client_secret: String,

    /// Amount charged, in minor currency units
    pub payment_amount: i64,

    /// Upper-case ISO currency code
    pub payment_currency: String,
    pub payment_status: String,
    pub scheduled_delivery_date: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: String,
    pub delivery_charges: String,
    pub total: String,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        let CheckoutReceipt {
            order,
            client_secret,
            amount_minor,
        } = receipt;

        Self {
            order_id: order.uuid.into(),
            order_number: order.order_number,
            payment_intent_id: order.payment_intent_id,
            client_secret,
            payment_amount: amount_minor,
            payment_currency: order.currency.to_uppercase(),
            payment_status: order.payment_status.to_string(),
            scheduled_delivery_date: order.scheduled_delivery_date.to_string(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: money(order.subtotal),
            delivery_charges: money(order.delivery_charges),
            total: money(order.total),
        }
    }
}

/// Create Order Handler
///
/// Turns the caller's cart into a pending order and opens a payment intent.
/// The cart is kept until the payment succeeds.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<CheckoutResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let new_order = NewOrder::try_from(json.into_inner())?;

    let receipt = state
        .app
        .orders
        .create_order(identity.user, new_order)
        .await
        .map_err(into_api_error)?;

    info!(
        order = %receipt.order.uuid,
        order_number = %receipt.order.order_number,
        "order created"
    );

    Ok(ApiResponse::created(
        receipt.into(),
        "Order created. Complete payment to confirm.",
    ))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use dispatch_app::{
        auth::Identity,
        domain::{
            orders::{MockOrdersService, OrdersServiceError},
            users::records::Role,
        },
        payments::PaymentGatewayError,
    };

    use crate::{
        envelope::ErrorBody,
        test_helpers::{StateBuilder, identity, make_order, service_as, strict_orders_mock},
    };

    use super::*;

    fn make_service(orders: MockOrdersService, caller: Identity) -> Service {
        service_as(
            caller,
            StateBuilder::new().orders(orders).build(),
            Router::with_path("order/create").post(handler),
        )
    }

    #[tokio::test]
    async fn test_create_order_returns_client_secret() -> TestResult {
        let caller = identity(Role::User);
        let order = make_order(caller.user);
        let address = order.address_uuid;

        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(move |user, new_order| {
                *user == caller.user
                    && *new_order
                        == NewOrder {
                            address_uuid: address,
                            scheduled_delivery_date: date(2026, 11, 2),
                            customer_note: Some("Ring twice".to_string()),
                            delivery_charges: Decimal::new(3_00, 2),
                        }
            })
            .return_once(move |_, _| {
                Ok(CheckoutReceipt {
                    order,
                    client_secret: "pi_123_secret_abc".to_string(),
                    amount_minor: 2850,
                })
            });

        let mut res = TestClient::post("http://example.com/order/create")
            .json(&json!({
                "addressId": Uuid::from(address),
                "scheduledDeliveryDate": "2026-11-02",
                "deliveryCharges": 3.0,
                "customerNote": " Ring twice ",
            }))
            .send(&make_service(orders, caller))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let body: ApiResponse<CheckoutResponse> = res.take_json().await?;

        assert_eq!(body.status_code, 201);
        assert_eq!(body.message, "Order created. Complete payment to confirm.");
        assert_eq!(body.data.client_secret, "pi_123_secret_abc");
        assert_eq!(body.data.payment_amount, 2850);
        assert_eq!(body.data.payment_currency, "USD");
        assert_eq!(body.data.payment_status, "pending");
        assert_eq!(body.data.payment_intent_id.as_deref(), Some("pi_123"));
        assert_eq!(body.data.total, "28.50");
        assert_eq!(body.data.items.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_address_is_rejected_before_the_service() -> TestResult {
        let mut res = TestClient::post("http://example.com/order/create")
            .json(&json!({ "scheduledDeliveryDate": "2026-11-02" }))
            .send(&make_service(
                strict_orders_mock(),
                identity(Role::User),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.message, "Address ID is required");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_and_malformed_dates_are_rejected() -> TestResult {
        for (value, message) in [
            (json!(null), "Scheduled delivery date is required"),
            (json!("  "), "Scheduled delivery date is required"),
            (
                json!("next tuesday"),
                "Scheduled delivery date must be formatted as YYYY-MM-DD",
            ),
        ] {
            let mut res = TestClient::post("http://example.com/order/create")
                .json(&json!({
                    "addressId": Uuid::now_v7(),
                    "scheduledDeliveryDate": value,
                }))
                .send(&make_service(
                    strict_orders_mock(),
                    identity(Role::User),
                ))
                .await;

            let body: ErrorBody = res.take_json().await?;

            assert_eq!(body.status_code, 400);
            assert_eq!(body.message, message);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cart_is_a_bad_request() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::EmptyCart));

        let mut res = TestClient::post("http://example.com/order/create")
            .json(&json!({
                "addressId": Uuid::now_v7(),
                "scheduledDeliveryDate": "2026-11-02",
            }))
            .send(&make_service(orders, identity(Role::User)))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 400);
        assert_eq!(body.message, "Cart is empty");

        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_failure_is_a_bad_gateway() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .return_once(|_, _| {
                Err(PaymentGatewayError::UnexpectedResponse {
                    status: 503,
                    message: "upstream unavailable".to_string(),
                }
                .into())
            });

        let res = TestClient::post("http://example.com/order/create")
            .json(&json!({
                "addressId": Uuid::now_v7(),
                "scheduledDeliveryDate": "2026-11-02T10:00:00Z",
            }))
            .send(&make_service(orders, identity(Role::User)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }
}
