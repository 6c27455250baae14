//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    money::MoneyError,
    payments::{PaymentGatewayError, WebhookError},
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("address not found")]
    AddressNotFound,

    #[error("driver not found")]
    DriverNotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("scheduled delivery date must be today or in the future")]
    ScheduledDateInPast,

    #[error("delivery charges must not be negative")]
    NegativeDeliveryCharges,

    #[error("order amount exceeds the largest storable value")]
    AmountOutOfRange,

    #[error("requester does not own the order")]
    NotOrderOwner,

    #[error("payment can no longer be retried for this order")]
    PaymentNotRetryable,

    #[error("payment gateway returned no client secret")]
    MissingClientSecret,

    #[error("selected user is not a driver")]
    NotADriver,

    #[error("driver is currently not available")]
    DriverUnavailable,

    #[error("cannot assign driver to delivered order")]
    AssignDelivered,

    #[error("cannot unassign driver from delivered order")]
    UnassignDelivered,

    #[error("no driver is assigned to this order")]
    NoDriverAssigned,

    #[error("driver is not assigned to this order")]
    DriverMismatch,

    #[error("requester is not assigned to this delivery")]
    NotAssignedDriver,

    #[error("drivers may only set on my way or delivered")]
    InvalidDriverStatus,

    #[error("invalid pagination")]
    InvalidPagination,

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("payment gateway error")]
    Gateway(#[from] PaymentGatewayError),

    #[error("webhook rejected: {0}")]
    Webhook(#[from] WebhookError),

    #[error("amount conversion error")]
    Money(#[from] MoneyError),

    #[error("calendar arithmetic error")]
    Calendar(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::UniqueViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
