//! Order response models

use std::string::ToString;

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dispatch_app::domain::{
    orders::{
        data::{DriverStats, Page, PaymentOutcome},
        records::{OrderItemRecord, OrderRecord},
    },
    users::records::{DriverRecord, UserRecord},
};

/// Render an amount with two fractional digits.
pub(crate) fn money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

/// Metric label of a reconciliation outcome.
pub(crate) fn outcome_label(outcome: &PaymentOutcome) -> &'static str {
    match outcome {
        PaymentOutcome::Completed => "completed",
        PaymentOutcome::Processing => "processing",
        PaymentOutcome::AwaitingPayment => "awaiting_payment",
        PaymentOutcome::RequiresPaymentMethod => "requires_payment_method",
        PaymentOutcome::Canceled => "canceled",
        PaymentOutcome::Failed => "failed",
        PaymentOutcome::Unsettled(_) => "unsettled",
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,

    /// Price per unit when the order was placed
    pub unit_price: String,
    pub line_total: String,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            product_id: item.product_uuid.into(),
            line_total: money(item.line_total()),
            unit_price: money(item.unit_price),
            product_name: item.product_name,
            quantity: item.quantity,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub address_id: Uuid,

    /// Calendar date, `YYYY-MM-DD`
    pub scheduled_delivery_date: String,
    pub customer_note: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: String,
    pub delivery_charges: String,
    pub total: String,
    pub currency: String,

    /// `pending`, `completed` or `failed`
    pub payment_status: String,
    pub payment_intent_id: Option<String>,

    /// `pending`, `on_my_way` or `delivered`
    pub delivery_status: String,
    pub assigned_driver_id: Option<Uuid>,
    pub driver_assigned_at: Option<String>,
    pub delivered_at: Option<String>,
    pub driver_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            id: order.uuid.into(),
            order_number: order.order_number,
            user_id: order.user_uuid.into(),
            address_id: order.address_uuid.into(),
            scheduled_delivery_date: order.scheduled_delivery_date.to_string(),
            customer_note: order.customer_note,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: money(order.subtotal),
            delivery_charges: money(order.delivery_charges),
            total: money(order.total),
            currency: order.currency,
            payment_status: order.payment_status.to_string(),
            payment_intent_id: order.payment_intent_id,
            delivery_status: order.delivery_status.to_string(),
            assigned_driver_id: order.assigned_driver_uuid.map(Into::into),
            driver_assigned_at: order.driver_assigned_at.as_ref().map(ToString::to_string),
            delivered_at: order.delivered_at.as_ref().map(ToString::to_string),
            driver_notes: order.driver_notes,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Pagination summary of a listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationResponse {
    pub current_page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total_orders: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of orders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrdersPageResponse {
    pub orders: Vec<OrderResponse>,
    pub pagination: PaginationResponse,
}

impl From<Page<OrderRecord>> for OrdersPageResponse {
    fn from(page: Page<OrderRecord>) -> Self {
        let pagination = PaginationResponse {
            current_page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
            total_orders: page.total,
            has_next_page: page.has_next_page(),
            has_prev_page: page.has_prev_page(),
        };

        Self {
            orders: page.items.into_iter().map(OrderResponse::from).collect(),
            pagination,
        }
    }
}

/// Delivery counters of a driver.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriverStatsResponse {
    pub total_deliveries: u64,
    pub completed_deliveries: u64,
    pub pending_deliveries: u64,
    pub on_my_way_deliveries: u64,
    pub today_deliveries: u64,
    pub today_completed_deliveries: u64,

    /// Percentage with two decimals
    pub completion_rate: String,
}

impl From<DriverStats> for DriverStatsResponse {
    fn from(stats: DriverStats) -> Self {
        Self {
            total_deliveries: stats.total,
            completed_deliveries: stats.completed,
            pending_deliveries: stats.pending,
            on_my_way_deliveries: stats.on_my_way,
            today_deliveries: stats.today,
            today_completed_deliveries: stats.today_completed,
            completion_rate: money(stats.completion_rate()),
        }
    }
}

/// Driver Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_available: bool,
}

impl From<UserRecord> for DriverResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.uuid.into(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_available: user.is_available,
        }
    }
}

/// A driver together with the orders currently assigned to them.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriverDirectoryEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_available: bool,
    pub assigned_deliveries: Vec<Uuid>,
    pub assigned_deliveries_count: usize,
}

impl From<DriverRecord> for DriverDirectoryEntry {
    fn from(DriverRecord { user, assigned_deliveries }: DriverRecord) -> Self {
        let assigned_deliveries: Vec<Uuid> =
            assigned_deliveries.into_iter().map(Into::into).collect();

        Self {
            id: user.uuid.into(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_available: user.is_available,
            assigned_deliveries_count: assigned_deliveries.len(),
            assigned_deliveries,
        }
    }
}
