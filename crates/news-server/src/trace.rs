//! Request-scoped trace identifiers.
//!
//! Every request gets a [`TraceId`], taken from an inbound `x-trace-id` or
//! W3C `traceparent` header when one is present and well formed, or generated
//! otherwise. The id is recorded on a `request` span wrapping the rest of the
//! stack, exposed to handlers through the [`RequestContext`] extension and
//! echoed back in the `x-trace-id` response header.

use std::convert::Infallible;
use std::fmt;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const TRACEPARENT_HEADER: &str = "traceparent";

const MAX_TRACE_ID_LEN: usize = 128;

/// Correlation identifier attached to every log line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    /// Fresh id: 32 lowercase hex characters.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept 1 to 128 characters of `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_TRACE_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    /// Extract the trace-id part of `version-traceid-parentid-flags`.
    pub fn from_traceparent(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let parent_id = parts.next()?;
        let flags = parts.next()?;

        let is_hex =
            |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit());
        if !is_hex(version, 2) || version.eq_ignore_ascii_case("ff") {
            return None;
        }
        if !is_hex(trace_id, 32) || !is_hex(parent_id, 16) || !is_hex(flags, 2) {
            return None;
        }
        if trace_id.bytes().all(|b| b == b'0') {
            return None;
        }
        Some(Self(trace_id.to_ascii_lowercase()))
    }

    /// Reuse an inbound id if there is a usable one, otherwise generate.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        header(TRACE_ID_HEADER)
            .and_then(TraceId::parse)
            .or_else(|| header(TRACEPARENT_HEADER).and_then(TraceId::from_traceparent))
            .unwrap_or_else(TraceId::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request values handed to handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: TraceId,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Routers built without the trace middleware still get a usable context.
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext {
                trace_id: TraceId::generate(),
            }))
    }
}

/// Middleware resolving the trace id and running the request inside its span.
pub async fn propagate_trace_id(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_headers(request.headers());
    let span = tracing::info_span!(
        "request",
        trace_id = %trace_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(RequestContext {
        trace_id: trace_id.clone(),
    });

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
