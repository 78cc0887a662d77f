//! JSON-schema validation of request and response bodies.
//!
//! Both middlewares buffer the body, validate it against a schema from the
//! shared [`SchemaRegistry`] and, when it passes, hand the original bytes on
//! unchanged.

use std::collections::{BTreeMap, HashMap};
use std::error::Error as _;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use news_core::error::AppError;
use news_core::schema::{ROOT_FIELD, SchemaRegistry};

use crate::error::{
    ApiError, ErrorCode, error_response, internal_error, invalid_body, payload_too_large,
};

/// State for [`validate_request_body`]: which schema the route's body must match.
#[derive(Clone)]
pub struct RequestSchema {
    registry: Arc<SchemaRegistry>,
    name: &'static str,
}

impl RequestSchema {
    pub fn new(registry: Arc<SchemaRegistry>, name: &'static str) -> Self {
        Self { registry, name }
    }
}

/// Reject request bodies that are not JSON (400), violate the schema (400) or
/// overrun the body limit (413).
pub async fn validate_request_body(
    State(schema): State<RequestSchema>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => {
            tracing::info!(error = %e, "Request body over the size limit");
            return payload_too_large();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read the request body");
            return internal_error("Failed to read the request body");
        }
    };

    let instance: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(instance) => instance,
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON");
            return invalid_body();
        }
    };

    if let Err(err) = schema.registry.validate(schema.name, &instance) {
        return ApiError(err).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// State for [`validate_response_body`]: the schema expected for each status.
#[derive(Clone)]
pub struct ResponseSchemas {
    registry: Arc<SchemaRegistry>,
    by_status: Arc<HashMap<StatusCode, &'static str>>,
}

impl ResponseSchemas {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            by_status: Arc::new(HashMap::new()),
        }
    }

    pub fn with(mut self, status: StatusCode, name: &'static str) -> Self {
        Arc::make_mut(&mut self.by_status).insert(status, name);
        self
    }

    pub fn schema_for(&self, status: StatusCode) -> Option<&'static str> {
        self.by_status.get(&status).copied()
    }
}

/// Debug-only check that handlers answer with the documented shapes.
///
/// `204 No Content` and the router's own `405 Method Not Allowed` pass
/// through untouched. Any other status without a
/// registered schema, or a body violating its schema, is replaced by a 500
/// `ResponseError`.
pub async fn validate_response_body(
    State(schemas): State<ResponseSchemas>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let Some(name) = schemas.schema_for(status) else {
        tracing::error!(status = status.as_u16(), "No response schema configured");
        return response_error(
            format!("No schema is configured for response code {}", status.as_u16()),
            BTreeMap::new(),
        );
    };

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read the response body");
            return internal_error("Failed to read the response body");
        }
    };

    let instance: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(instance) => instance,
        Err(e) => {
            tracing::error!(error = %e, schema = name, "Response body is not JSON");
            let details = BTreeMap::from([(ROOT_FIELD.to_string(), e.to_string())]);
            return response_error(format!("Response schema validation failed for {name}"), details);
        }
    };

    match schemas.registry.validate(name, &instance) {
        Ok(()) => Response::from_parts(parts, Body::from(bytes)),
        Err(AppError::SchemaValidation { schema, violations }) => {
            tracing::error!(%schema, %violations, "Response failed schema validation");
            response_error(
                format!("Response schema validation failed for {schema}"),
                violations.by_field(),
            )
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to validate response");
            internal_error("Failed to validate against schema")
        }
    }
}

/// A `RequestBodyLimitLayer` without `Content-Length` to check only trips
/// while the body is read, so the limit error arrives wrapped.
fn is_length_limit(error: &axum::Error) -> bool {
    let mut source = error.source();
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

fn response_error(message: String, details: BTreeMap<String, String>) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::ResponseError,
        message,
        details,
    )
}
