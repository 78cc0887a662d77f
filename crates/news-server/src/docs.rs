//! Documentation assets compiled into the binary and the schema registry
//! built from them.

use axum::Json;
use axum::extract::Path;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use utoipa::OpenApi;

use news_core::error::AppError;
use news_core::schema::SchemaRegistry;

use crate::error::invalid_uri;
use crate::openapi::ApiDoc;

pub const CREATE_CATEGORY_REQUEST: &str = "request/create_category.json";
pub const UPDATE_CATEGORY_REQUEST: &str = "request/update_category.json";
pub const CREATE_CATEGORY_RESPONSE: &str = "response/create_category.json";
pub const GET_CATEGORY_RESPONSE: &str = "response/get_category.json";
pub const UPDATE_CATEGORY_RESPONSE: &str = "response/update_category.json";
pub const LIST_CATEGORIES_RESPONSE: &str = "response/list_categories.json";
pub const ERROR_RESPONSE: &str = "response/error.json";

const API_RAML: &str = include_str!("../../../docs/api.raml");

const SCHEMAS: &[(&str, &str)] = &[
    (
        CREATE_CATEGORY_REQUEST,
        include_str!("../../../docs/schema/request/create_category.json"),
    ),
    (
        UPDATE_CATEGORY_REQUEST,
        include_str!("../../../docs/schema/request/update_category.json"),
    ),
    (
        CREATE_CATEGORY_RESPONSE,
        include_str!("../../../docs/schema/response/create_category.json"),
    ),
    (
        GET_CATEGORY_RESPONSE,
        include_str!("../../../docs/schema/response/get_category.json"),
    ),
    (
        UPDATE_CATEGORY_RESPONSE,
        include_str!("../../../docs/schema/response/update_category.json"),
    ),
    (
        LIST_CATEGORIES_RESPONSE,
        include_str!("../../../docs/schema/response/list_categories.json"),
    ),
    (
        ERROR_RESPONSE,
        include_str!("../../../docs/schema/response/error.json"),
    ),
];

/// Compile every embedded schema.
pub fn schema_registry() -> Result<SchemaRegistry, AppError> {
    let mut registry = SchemaRegistry::new();
    for (name, raw) in SCHEMAS {
        registry.register_str(*name, raw)?;
    }
    Ok(registry)
}

/// `GET /docs/{*path}`: the RAML document, the JSON schemas under
/// `schema/` and the generated `openapi.json`.
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    match path.as_str() {
        "api.raml" => ([(CONTENT_TYPE, "application/raml+yaml")], API_RAML).into_response(),
        "openapi.json" => Json(ApiDoc::openapi()).into_response(),
        other => match other.strip_prefix("schema/").and_then(find_schema) {
            Some(raw) => ([(CONTENT_TYPE, "application/schema+json")], raw).into_response(),
            None => invalid_uri(),
        },
    }
}

fn find_schema(name: &str) -> Option<&'static str> {
    SCHEMAS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, raw)| *raw)
}
