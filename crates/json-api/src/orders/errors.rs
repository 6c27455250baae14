//! Order Errors

use tracing::{error, warn};

use dispatch_app::{domain::orders::OrdersServiceError, money::MoneyError};

use crate::envelope::ApiError;

pub(crate) const DELIVERY_STATUSES: &str = "Pending, On My Way, Delivered";
pub(crate) const DRIVER_STATUSES: &str = "On My Way, Delivered";

pub(crate) fn into_api_error(error: OrdersServiceError) -> ApiError {
    match error {
        OrdersServiceError::NotFound => ApiError::not_found("Order not found"),
        OrdersServiceError::AddressNotFound => ApiError::not_found("Address not found"),
        OrdersServiceError::DriverNotFound => ApiError::not_found("Driver not found"),
        OrdersServiceError::EmptyCart => ApiError::bad_request("Cart is empty"),
        OrdersServiceError::ScheduledDateInPast => {
            ApiError::bad_request("Scheduled delivery date must be today or in the future")
        }
        OrdersServiceError::NegativeDeliveryCharges => {
            ApiError::bad_request("Delivery charges must not be negative")
        }
        OrdersServiceError::AmountOutOfRange
        | OrdersServiceError::Money(MoneyError::Overflow) => {
            ApiError::bad_request("Order amount exceeds the maximum allowed")
        }
        OrdersServiceError::NotOrderOwner => ApiError::forbidden("Unauthorized access"),
        OrdersServiceError::PaymentNotRetryable => {
            ApiError::bad_request("Payment can no longer be retried for this order")
        }
        OrdersServiceError::NotADriver => ApiError::bad_request("Selected user is not a driver"),
        OrdersServiceError::DriverUnavailable => {
            ApiError::bad_request("Driver is currently not available")
        }
        OrdersServiceError::AssignDelivered => {
            ApiError::bad_request("Cannot assign driver to delivered order")
        }
        OrdersServiceError::UnassignDelivered => {
            ApiError::bad_request("Cannot unassign driver from delivered order")
        }
        OrdersServiceError::NoDriverAssigned => {
            ApiError::bad_request("No driver is assigned to this order")
        }
        OrdersServiceError::DriverMismatch => {
            ApiError::bad_request("Driver is not assigned to this order")
        }
        OrdersServiceError::NotAssignedDriver => {
            ApiError::forbidden("You are not assigned to this delivery")
        }
        OrdersServiceError::InvalidDriverStatus => {
            ApiError::bad_request(format!("Status must be one of: {DRIVER_STATUSES}"))
        }
        OrdersServiceError::InvalidPagination => {
            ApiError::bad_request("page must be at least 1 and limit between 1 and 100")
        }
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => ApiError::bad_request("Invalid order payload"),
        OrdersServiceError::Webhook(source) => {
            ApiError::bad_request(format!("Webhook Error: {source}"))
        }
        OrdersServiceError::Gateway(source) => {
            warn!("payment gateway request failed: {source}");

            ApiError::bad_gateway("Payment provider is unavailable. Please try again.")
        }
        OrdersServiceError::MissingClientSecret => {
            warn!("payment gateway returned an intent without a client secret");

            ApiError::bad_gateway("Payment provider is unavailable. Please try again.")
        }
        OrdersServiceError::OrderNumberExhausted => {
            error!("failed to allocate an order number");

            ApiError::internal()
        }
        OrdersServiceError::Money(source) => {
            error!("failed to convert order amount: {source}");

            ApiError::internal()
        }
        OrdersServiceError::Calendar(source) => {
            error!("failed to compute calendar period: {source}");

            ApiError::internal()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            ApiError::internal()
        }
    }
}
