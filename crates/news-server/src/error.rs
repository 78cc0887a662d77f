use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use news_core::error::AppError;

use crate::dto::ErrorResponse;

pub const NOT_FOUND_MESSAGE: &str =
    "The requested URI does not represent any resource on the server.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body provided";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body is too large";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while processing the request.";
pub const BAD_GATEWAY_MESSAGE: &str = "An upstream dependency failed to respond.";

/// Codes carried in the `error.code` field of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUri,
    InvalidInput,
    InternalError,
    BadGateway,
    /// Only produced by response validation in debug mode.
    ResponseError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUri => "InvalidUri",
            ErrorCode::InvalidInput => "InvalidInput",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::BadGateway => "BadGateway",
            ErrorCode::ResponseError => "ResponseError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render an error envelope with the given status.
pub fn error_response(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    details: BTreeMap<String, String>,
) -> Response {
    let body = ErrorResponse::new(code.as_str(), message).with_details(details);
    (status, axum::Json(body)).into_response()
}

/// 404 `InvalidUri`, used for unknown routes, assets and identifiers.
pub fn invalid_uri() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::InvalidUri,
        NOT_FOUND_MESSAGE,
        BTreeMap::new(),
    )
}

/// 400 `InvalidInput` for bodies that cannot be decoded at all.
pub fn invalid_body() -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::InvalidInput,
        INVALID_BODY_MESSAGE,
        BTreeMap::new(),
    )
}

/// 413 `InvalidInput` for bodies over the configured limit.
pub fn payload_too_large() -> Response {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::InvalidInput,
        PAYLOAD_TOO_LARGE_MESSAGE,
        BTreeMap::new(),
    )
}

/// 500 `InternalError` with a fixed message; the cause belongs in the log.
pub fn internal_error(message: impl Into<String>) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError,
        message,
        BTreeMap::new(),
    )
}

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput { .. } | AppError::SchemaValidation { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            AppError::CategoryNotFound(id) => {
                tracing::debug!(category_id = %id, "Category not found");
                ErrorResponse::new(ErrorCode::InvalidUri.as_str(), NOT_FOUND_MESSAGE)
            }
            AppError::InvalidInput { target, message } => {
                tracing::info!(field = %target, %message, "Rejected invalid input");
                ErrorResponse::new(ErrorCode::InvalidInput.as_str(), message).with_target(target)
            }
            AppError::SchemaValidation { schema, violations } => {
                tracing::info!(%schema, %violations, "Request failed schema validation");
                ErrorResponse::new(
                    ErrorCode::InvalidInput.as_str(),
                    format!("Request schema validation failed for {schema}"),
                )
                .with_details(violations.by_field())
            }
            AppError::Upstream(cause) => {
                tracing::error!(%cause, "Upstream dependency failed");
                ErrorResponse::new(ErrorCode::BadGateway.as_str(), BAD_GATEWAY_MESSAGE)
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                ErrorResponse::new(ErrorCode::InternalError.as_str(), INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
