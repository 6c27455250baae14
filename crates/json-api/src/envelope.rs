//! JSON Envelope
//!
//! Every response body has the shape `{statusCode, message, success, data}`
//! on success and `{statusCode, message, success: false, error}` on failure.

use salvo::{
    Depot, FlowCtrl, Request, Response, Scribe, handler,
    http::{ResBody, StatusCode},
    oapi::{self, Components, Content, EndpointOutRegister, Operation, ToSchema},
    prelude::Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful response envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiResponse<T> {
    /// HTTP status code, repeated in the body
    pub status_code: u16,

    /// Human readable outcome
    pub message: String,

    /// Always `true`
    pub success: bool,

    /// Response payload
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub(crate) fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            success: status.is_success(),
            data,
        }
    }

    pub(crate) fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub(crate) fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T> Scribe for ApiResponse<T>
where
    T: Serialize + Send,
{
    fn render(self, res: &mut Response) {
        res.status_code(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK));
        res.render(Json(self));
    }
}

impl<T> EndpointOutRegister for ApiResponse<T>
where
    T: ToSchema + Serialize + Send + 'static,
{
    fn register(components: &mut Components, operation: &mut Operation) {
        operation.responses.insert(
            "200",
            oapi::Response::new("Success")
                .add_content("application/json", Content::new(Self::to_schema(components))),
        );
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    /// HTTP status code, repeated in the body
    pub status_code: u16,

    /// What went wrong
    pub message: String,

    /// Always `false`
    pub success: bool,

    /// Canonical reason phrase of the status code
    pub error: String,
}

/// An error rendered into the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub(crate) struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub(crate) fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Internal details are logged by the caller; the body stays generic.
    pub(crate) fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    pub(crate) fn body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status.as_u16(),
            message: self.message.clone(),
            success: false,
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
        }
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.body()));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        let schema = ErrorBody::to_schema(components);

        for (code, description) in [
            ("400", "Bad Request"),
            ("401", "Unauthorized"),
            ("403", "Forbidden"),
            ("404", "Not Found"),
            ("500", "Internal Server Error"),
        ] {
            operation.responses.insert(
                code,
                oapi::Response::new(description)
                    .add_content("application/json", Content::new(schema.clone())),
            );
        }
    }
}

/// Catcher hoop rewriting framework errors (unmatched routes, extractor
/// failures, panics) into the error envelope.
#[handler]
pub(crate) async fn catch_errors(
    _req: &mut Request,
    _depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let status = res.status_code.unwrap_or(StatusCode::NOT_FOUND);

    let message = match &res.body {
        ResBody::Error(error) if !error.brief.is_empty() => error.brief.clone(),
        ResBody::Error(_) | ResBody::None => {
            status.canonical_reason().unwrap_or("Error").to_string()
        }
        _ => return,
    };

    let _previous = res.take_body();

    res.render(ApiError::new(status, message));

    ctrl.skip_rest();
}
