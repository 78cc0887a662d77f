use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest page the list operation will return.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// A news category, mapped one-to-one onto the `category` table.
///
/// `category_id` is assigned once (by the client or the server) and never
/// changes; `name` and `title` are the mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: Uuid,
    pub name: String,
    pub title: String,
}

impl Category {
    /// Build a category, generating a fresh identifier when none is supplied.
    pub fn new(
        category_id: Option<Uuid>,
        name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            category_id: category_id.unwrap_or_else(Uuid::new_v4),
            name: name.into(),
            title: title.into(),
        }
    }

    /// Overwrite the mutable fields, keeping the identifier.
    pub fn apply(&mut self, name: impl Into<String>, title: impl Into<String>) {
        self.name = name.into();
        self.title = title.into();
    }
}

/// Offset pagination window (`$skip` / `$top`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub top: u64,
}

impl Page {
    /// Build a page, clamping `top` into `1..=MAX_PAGE_SIZE`.
    pub fn new(skip: Option<u64>, top: Option<u64>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            top: top.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
