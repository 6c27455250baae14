//! Auth errors

use tracing::error;

use dispatch_app::auth::AuthServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: AuthServiceError) -> ApiError {
    match error {
        AuthServiceError::NotFound | AuthServiceError::UnknownUser => {
            ApiError::unauthorized("Invalid access token")
        }
        AuthServiceError::Sql(source) => {
            error!("failed to validate session token: {source}");

            ApiError::internal()
        }
        AuthServiceError::Token(source) => {
            error!("failed to process session token: {source}");

            ApiError::internal()
        }
    }
}
