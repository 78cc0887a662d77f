use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use news_core::models::Category;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Body of `POST /category` and `PUT /category/{category_id}`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CategoryRequest {
    /// Client-chosen identifier; generated when absent. Ignored on update.
    pub category_id: Option<Uuid>,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryResponse {
    pub category_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub category_id: Uuid,
    pub name: String,
    pub title: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.category_id,
            name: category.name,
            title: category.title,
        }
    }
}

/// `$skip` / `$top` query parameters, kept raw so parse failures map to our envelope.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Number of categories to skip (default 0).
    #[serde(rename = "$skip")]
    #[param(value_type = Option<u64>)]
    pub skip: Option<String>,
    /// Page size (default 20, max 100).
    #[serde(rename = "$top")]
    #[param(value_type = Option<u64>)]
    pub top: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub database: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fixed error envelope: `{"error": {...}}`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    pub message: String,
    /// Field to violation, present for schema failures only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                target: String::new(),
                message: message.into(),
                details: BTreeMap::new(),
            },
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.error.target = target.into();
        self
    }

    pub fn with_details(mut self, details: BTreeMap<String, String>) -> Self {
        self.error.details = details;
        self
    }
}
