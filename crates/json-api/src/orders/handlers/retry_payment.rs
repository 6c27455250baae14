//! Retry Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::{
        create::CheckoutResponse, errors::into_api_error,
        payment_status::OrderReferenceRequest,
    },
    state::State,
};

/// Retry Payment Handler
///
/// Hands out a client secret again for a pending order, opening a payment
/// intent first when checkout could not reach the provider.
#[endpoint(
    tags("orders"),
    summary = "Retry Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<OrderReferenceRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<CheckoutResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let order = json.into_inner().order_id()?;

    let receipt = state
        .app
        .orders
        .retry_payment(identity.user, order.into())
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(
        receipt.into(),
        "Payment is pending. Use the client secret to complete payment.",
    ))
}
