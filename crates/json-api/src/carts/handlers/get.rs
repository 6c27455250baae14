//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dispatch_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{
    carts::errors::into_api_error,
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::money,
    state::State,
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    pub id: Uuid,
    pub items: Vec<CartItemResponse>,

    /// Sum of the lines at current catalog prices
    pub subtotal: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        Self {
            id: cart.uuid.into(),
            subtotal: money(cart.subtotal()),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,

    /// Current catalog price
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            id: item.uuid.into(),
            product_id: item.product_uuid.into(),
            line_total: money(item.line_total()),
            unit_price: money(item.unit_price),
            product_name: item.product_name,
            quantity: item.quantity,
        }
    }
}

/// Get Cart Handler
///
/// The caller's cart; created empty on first access.
#[endpoint(tags("carts"), summary = "Get Cart", security(("bearer_auth" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<ApiResponse<CartResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(identity.user)
        .await
        .map_err(into_api_error)?;

    Ok(ApiResponse::ok(cart.into(), "Cart fetched successfully"))
}
