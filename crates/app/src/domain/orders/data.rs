//! Orders Data

use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    domain::{
        orders::records::{DeliveryStatus, OrderRecord},
        users::records::{AddressUuid, UserUuid},
    },
    payments::IntentStatus,
};

/// Default page size of the admin order listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size of the admin order listing.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Largest amount an order column (`NUMERIC(12, 2)`) can hold:
/// `9_999_999_999.99`.
pub const MAX_ORDER_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Checkout input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub address_uuid: AddressUuid,
    pub scheduled_delivery_date: Date,
    pub customer_note: Option<String>,
    pub delivery_charges: Decimal,
}

/// Result of a checkout: the persisted order and the secret the client uses
/// to confirm payment.
#[derive(Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order: OrderRecord,
    pub client_secret: String,
    pub amount_minor: i64,
}

impl std::fmt::Debug for CheckoutReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutReceipt")
            .field("order", &self.order)
            .field("client_secret", &"**redacted**")
            .field("amount_minor", &self.amount_minor)
            .finish()
    }
}

/// What reconciliation concluded about an order's payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment settled; the order is `Completed`.
    Completed,

    /// Provider still processing; the order is unchanged.
    Processing,

    /// No payment has been attempted yet.
    AwaitingPayment,

    /// The last attempt failed; the customer may retry.
    RequiresPaymentMethod,

    /// The provider canceled the payment; the order is `Failed`.
    Canceled,

    /// The order was already `Failed`.
    Failed,

    /// Any other provider state; the order is unchanged.
    Unsettled(IntentStatus),
}

/// Reconciled order with the outcome that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCheck {
    pub order: OrderRecord,
    pub outcome: PaymentOutcome,
}

/// Result of processing a verified provider event.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// The event matched an order and reconciliation ran.
    Reconciled(PaymentCheck),

    /// No order carries the event's intent reference.
    UnknownIntent { intent_id: String },

    /// The event type is not one this service acts on.
    Ignored { kind: String },
}

/// Filters for a driver's delivery list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryFilter {
    pub status: Option<DeliveryStatus>,
    pub date: Option<Date>,
}

/// Filters and pagination for the admin order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<DeliveryStatus>,
    pub driver: Option<UserUuid>,
    pub date: Option<Date>,
    pub page: u32,
    pub limit: u32,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            driver: None,
            date: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl OrderFilter {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.page >= 1 && (1..=MAX_PAGE_LIMIT).contains(&self.limit)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }

        self.total.div_ceil(u64::from(self.limit))
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}

/// Delivery counters of a single driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub on_my_way: u64,
    pub today: u64,
    pub today_completed: u64,
}

impl DriverStats {
    /// Completed share of all assigned deliveries, in percent with two decimals.
    #[must_use]
    pub fn completion_rate(&self) -> Decimal {
        percentage(Decimal::from(self.completed), Decimal::from(self.total))
    }
}

/// Revenue of paid orders over calendar periods (UTC, ISO weeks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesSummary {
    pub total: Decimal,
    pub today: Decimal,
    pub yesterday: Decimal,
    pub this_week: Decimal,
    pub last_week: Decimal,
}

impl SalesSummary {
    /// Day-over-day change in percent.
    #[must_use]
    pub fn today_change(&self) -> Decimal {
        change(self.today, self.yesterday)
    }

    /// Week-over-week change in percent.
    #[must_use]
    pub fn week_change(&self) -> Decimal {
        change(self.this_week, self.last_week)
    }
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }

    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn change(current: Decimal, previous: Decimal) -> Decimal {
    percentage(current - previous, previous)
}
