//! User Errors

use tracing::error;

use dispatch_app::domain::users::UsersServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: UsersServiceError) -> ApiError {
    match error {
        UsersServiceError::AlreadyExists => {
            ApiError::new(salvo::http::StatusCode::CONFLICT, "User already exists")
        }
        UsersServiceError::NotFound => ApiError::not_found("User not found"),
        UsersServiceError::NotADriver => ApiError::bad_request("User is not a driver"),
        UsersServiceError::InvalidReference
        | UsersServiceError::MissingRequiredData
        | UsersServiceError::InvalidData => ApiError::bad_request("Invalid user payload"),
        UsersServiceError::Sql(source) => {
            error!("user storage error: {source}");

            ApiError::internal()
        }
    }
}
