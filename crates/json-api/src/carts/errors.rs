//! Cart Errors

use tracing::error;

use dispatch_app::domain::carts::CartsServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: CartsServiceError) -> ApiError {
    match error {
        CartsServiceError::NotFound => ApiError::not_found("Cart not found"),
        CartsServiceError::InvalidReference => ApiError::not_found("Product not found"),
        CartsServiceError::InvalidQuantity => {
            ApiError::bad_request("Quantity must be at least 1")
        }
        CartsServiceError::QuantityTooLarge { max } => {
            ApiError::bad_request(format!("Quantity must not exceed {max} per product"))
        }
        CartsServiceError::MissingRequiredData | CartsServiceError::InvalidData => {
            ApiError::bad_request("Invalid cart payload")
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            ApiError::internal()
        }
    }
}
