use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, delete, get, post, put};
use utoipa_swagger_ui::{Config, SwaggerUi};

use news_core::error::AppError;
use news_core::models::Category;
use news_core::traits::CategoryStore;

use crate::docs::{self, ERROR_RESPONSE};
use crate::dto::{
    CategoryListResponse, CategoryRequest, CategoryResponse, CreateCategoryResponse,
    StatusResponse,
};
use crate::error::{ApiError, invalid_uri};
use crate::extract::{ApiJson, CategoryId, Pagination};
use crate::state::AppState;
use crate::trace::{RequestContext, propagate_trace_id};
use crate::validation::{
    RequestSchema, ResponseSchemas, validate_request_body, validate_response_body,
};

pub const ROOT_MESSAGE: &str = "News Today API";

/// Build the full router with all routes and middleware.
pub fn router<S: CategoryStore>(state: Arc<AppState<S>>) -> Router {
    let category = validated(
        post(create_category::<S>),
        &state,
        Some(docs::CREATE_CATEGORY_REQUEST),
        &[
            (StatusCode::OK, docs::CREATE_CATEGORY_RESPONSE),
            (StatusCode::BAD_REQUEST, ERROR_RESPONSE),
            (StatusCode::INTERNAL_SERVER_ERROR, ERROR_RESPONSE),
        ],
    )
    .merge(validated(
        get(list_categories::<S>),
        &state,
        None,
        &[
            (StatusCode::OK, docs::LIST_CATEGORIES_RESPONSE),
            (StatusCode::BAD_REQUEST, ERROR_RESPONSE),
            (StatusCode::INTERNAL_SERVER_ERROR, ERROR_RESPONSE),
        ],
    ));

    let category_by_id = validated(
        get(get_category::<S>),
        &state,
        None,
        &[
            (StatusCode::OK, docs::GET_CATEGORY_RESPONSE),
            (StatusCode::BAD_REQUEST, ERROR_RESPONSE),
            (StatusCode::NOT_FOUND, ERROR_RESPONSE),
            (StatusCode::INTERNAL_SERVER_ERROR, ERROR_RESPONSE),
        ],
    )
    .merge(validated(
        put(update_category::<S>),
        &state,
        Some(docs::UPDATE_CATEGORY_REQUEST),
        &[
            (StatusCode::OK, docs::UPDATE_CATEGORY_RESPONSE),
            (StatusCode::BAD_REQUEST, ERROR_RESPONSE),
            (StatusCode::NOT_FOUND, ERROR_RESPONSE),
            (StatusCode::INTERNAL_SERVER_ERROR, ERROR_RESPONSE),
        ],
    ))
    .merge(validated(
        delete(delete_category::<S>),
        &state,
        None,
        &[
            (StatusCode::BAD_REQUEST, ERROR_RESPONSE),
            (StatusCode::NOT_FOUND, ERROR_RESPONSE),
            (StatusCode::INTERNAL_SERVER_ERROR, ERROR_RESPONSE),
        ],
    ));

    Router::new()
        .route("/", get(root))
        .route("/status", get(status::<S>))
        .route("/category", category)
        .route("/category/{category_id}", category_by_id)
        .route("/docs/{*path}", get(docs::serve_asset))
        .merge(SwaggerUi::new("/swagger-ui").config(Config::new(["/docs/openapi.json"])))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(propagate_trace_id))
}

/// Wrap a route in schema validation.
///
/// Response validation is only installed in debug mode; request validation,
/// when a schema is named, runs first so rejected bodies never reach it.
/// Both are route layers, so the 405 fallback bypasses them.
fn validated<S: CategoryStore>(
    route: MethodRouter<Arc<AppState<S>>>,
    state: &AppState<S>,
    request_schema: Option<&'static str>,
    response_schemas: &[(StatusCode, &'static str)],
) -> MethodRouter<Arc<AppState<S>>> {
    let mut route = route;
    if state.debug {
        let schemas = response_schemas
            .iter()
            .fold(ResponseSchemas::new(state.schemas.clone()), |acc, &(code, name)| {
                acc.with(code, name)
            });
        route = route.route_layer(middleware::from_fn_with_state(schemas, validate_response_body));
    }
    if let Some(name) = request_schema {
        route = route.route_layer(middleware::from_fn_with_state(
            RequestSchema::new(state.schemas.clone(), name),
            validate_request_body,
        ));
    }
    route
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/category",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CreateCategoryResponse),
        (status = 400, description = "Invalid body or duplicate identifier", body = crate::dto::ErrorResponse),
        (status = 500, description = "Internal error", body = crate::dto::ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn create_category<S: CategoryStore>(
    State(state): State<Arc<AppState<S>>>,
    ctx: RequestContext,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<CreateCategoryResponse>, ApiError> {
    let category = Category::new(body.category_id, body.name, body.title);
    state.store.store(&category).await?;

    tracing::info!(
        trace_id = %ctx.trace_id,
        category_id = %category.category_id,
        "Category created"
    );
    Ok(Json(CreateCategoryResponse {
        category_id: category.category_id,
    }))
}

#[utoipa::path(
    get,
    path = "/category",
    params(crate::dto::PageQuery),
    responses(
        (status = 200, description = "One page of categories", body = CategoryListResponse),
        (status = 400, description = "Invalid paging parameters", body = crate::dto::ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn list_categories<S: CategoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Pagination(page): Pagination,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.store.list_categories(page).await?;
    let total = state.store.count_categories().await?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/category/{category_id}",
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn get_category<S: CategoryStore>(
    State(state): State<Arc<AppState<S>>>,
    CategoryId(id): CategoryId,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state.store.get_category_by_id(id).await?;
    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    put,
    path = "/category/{category_id}",
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Invalid body", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn update_category<S: CategoryStore>(
    State(state): State<Arc<AppState<S>>>,
    ctx: RequestContext,
    CategoryId(id): CategoryId,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    // The identifier in the URL wins over one in the body.
    let mut category = state.store.get_category_by_id(id).await?;
    category.apply(body.name, body.title);
    state.store.update(&category).await?;

    tracing::info!(trace_id = %ctx.trace_id, category_id = %id, "Category updated");
    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/category/{category_id}",
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn delete_category<S: CategoryStore>(
    State(state): State<Arc<AppState<S>>>,
    ctx: RequestContext,
    CategoryId(id): CategoryId,
) -> Result<StatusCode, ApiError> {
    if !state.store.assert_exists(id).await? {
        return Err(AppError::CategoryNotFound(id).into());
    }
    state.store.discard(id).await?;

    tracing::info!(trace_id = %ctx.trace_id, category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Service is healthy", body = StatusResponse),
        (status = 503, description = "Database unreachable", body = StatusResponse),
    ),
    tag = "system"
)]
pub async fn status<S: CategoryStore>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse {
                    status: "unavailable".to_string(),
                    database: "unreachable".to_string(),
                }),
            )
        }
    }
}

async fn root() -> &'static str {
    ROOT_MESSAGE
}

async fn not_found() -> Response {
    invalid_uri()
}
