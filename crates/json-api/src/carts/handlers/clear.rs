//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_api_error, get::CartResponse},
    envelope::{ApiError, ApiResponse},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Removes every line; the cart itself is kept.
#[endpoint(tags("carts"), summary = "Clear Cart", security(("bearer_auth" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<ApiResponse<CartResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    state
        .app
        .carts
        .clear_cart(identity.user)
        .await
        .map_err(into_api_error)?;

    let cart = state
        .app
        .carts
        .get_cart(identity.user)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(cart.into(), "Cart cleared successfully"))
}
