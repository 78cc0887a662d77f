use std::sync::Arc;

use news_core::SchemaRegistry;

/// Shared application state, available to all route handlers via `State<Arc<AppState<S>>>`.
pub struct AppState<S> {
    /// Category storage backend.
    pub store: S,
    /// Compiled request and response schemas.
    pub schemas: Arc<SchemaRegistry>,
    /// Installs response validation on every category route.
    pub debug: bool,
}

impl<S> AppState<S> {
    pub fn new(store: S, schemas: Arc<SchemaRegistry>, debug: bool) -> Self {
        Self {
            store,
            schemas,
            debug,
        }
    }
}
