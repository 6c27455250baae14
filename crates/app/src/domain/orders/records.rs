//! Order Records

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    domain::{
        products::records::ProductUuid,
        users::records::{AddressUuid, UserUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(String);

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Pending,
    OnMyWay,
    Delivered,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OnMyWay => "on_my_way",
            Self::Delivered => "delivered",
        }
    }

    /// Human readable label, e.g. `"On My Way"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OnMyWay => "On My Way",
            Self::Delivered => "Delivered",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(' ', "_");

        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "on_my_way" => Ok(Self::OnMyWay),
            "delivered" => Ok(Self::Delivered),
            _ => Err(UnknownStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub order_number: String,
    pub address_uuid: AddressUuid,
    pub scheduled_delivery_date: Date,
    pub customer_note: Option<String>,
    pub items: Vec<OrderItemRecord>,
    pub subtotal: Decimal,
    pub delivery_charges: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub delivery_status: DeliveryStatus,
    pub assigned_driver_uuid: Option<UserUuid>,
    pub driver_assigned_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub driver_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    #[must_use]
    pub fn is_owned_by(&self, user: UserUuid) -> bool {
        self.user_uuid == user
    }

    #[must_use]
    pub fn is_assigned_to(&self, driver: UserUuid) -> bool {
        self.assigned_driver_uuid == Some(driver)
    }
}

/// A purchased line, priced when the order was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_status_accepts_labels_and_wire_values() {
        assert_eq!("On My Way".parse(), Ok(DeliveryStatus::OnMyWay));
        assert_eq!("on_my_way".parse(), Ok(DeliveryStatus::OnMyWay));
        assert_eq!("Delivered".parse(), Ok(DeliveryStatus::Delivered));
        assert_eq!(" pending ".parse(), Ok(DeliveryStatus::Pending));
        assert!("Lost".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn payment_status_is_case_insensitive() {
        assert_eq!("Completed".parse(), Ok(PaymentStatus::Completed));
        assert_eq!("failed".parse(), Ok(PaymentStatus::Failed));
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn wire_values_round_trip_through_from_str() {
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::OnMyWay,
            DeliveryStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse(), Ok(status));
            assert_eq!(status.label().parse(), Ok(status));
        }
    }
}
