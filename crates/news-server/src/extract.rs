//! Extractors whose rejections use the API's error envelope.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use news_core::error::AppError;
use news_core::models::Page;

use crate::dto::PageQuery;
use crate::error::{ApiError, invalid_body, invalid_uri, payload_too_large};

/// The `{category_id}` path segment. Anything that is not a UUID cannot name
/// a category and is rejected as 404 `InvalidUri`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryId(pub Uuid);

impl<S> FromRequestParts<S> for CategoryId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_uri())?;

        match Uuid::parse_str(&raw) {
            Ok(id) => Ok(CategoryId(id)),
            Err(_) => {
                tracing::debug!(category_id = %raw, "Path segment is not a UUID");
                Err(invalid_uri())
            }
        }
    }
}

/// JSON body whose decode failures become 400 `Invalid request body provided`.
///
/// The body is decoded whatever its `Content-Type`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                payload_too_large()
            } else {
                tracing::debug!(reason = %rejection.body_text(), "Failed to buffer request body");
                invalid_body()
            }
        })?;

        serde_json::from_slice(&bytes).map(ApiJson).map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            invalid_body()
        })
    }
}

/// `$skip` / `$top` pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination(pub Page);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::try_from_uri(&parts.uri).map_err(|_| {
            ApiError(AppError::invalid_input("", "Invalid query string")).into_response()
        })?;
        parse_page(&query)
            .map(Pagination)
            .map_err(|err| ApiError(err).into_response())
    }
}

/// Parse the raw query values; `top` is clamped by [`Page::new`].
pub fn parse_page(query: &PageQuery) -> Result<Page, AppError> {
    let skip = parse_param(query.skip.as_deref(), "$skip")?;
    let top = parse_param(query.top.as_deref(), "$top")?;
    Ok(Page::new(skip, top))
}

fn parse_param(raw: Option<&str>, name: &str) -> Result<Option<u64>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        // Postgres binds LIMIT/OFFSET as BIGINT, so the upper bound is i64::MAX.
        Some(value) => value
            .parse::<i64>()
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| AppError::invalid_input(name, format!("Invalid {name} query parameter"))),
    }
}
