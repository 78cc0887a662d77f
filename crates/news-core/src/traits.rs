use std::future::Future;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, Page};

/// Loads a single category.
pub trait CategoryGetter: Send + Sync + Clone {
    /// Returns [`AppError::CategoryNotFound`] when no row matches `id`.
    fn get_category_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Category, AppError>> + Send;
}

/// Lists categories one page at a time, ordered by name.
pub trait CategoryLister: Send + Sync + Clone {
    fn list_categories(
        &self,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    /// Total number of categories, independent of paging.
    fn count_categories(&self) -> impl Future<Output = Result<u64, AppError>> + Send;
}

/// Persists a new category.
pub trait CategoryStorer: Send + Sync + Clone {
    /// Fails with [`AppError::InvalidInput`] targeting `category_id` when the
    /// identifier is already taken.
    fn store(&self, category: &Category) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Overwrites the mutable fields of an existing category.
pub trait CategoryUpdater: Send + Sync + Clone {
    /// Returns [`AppError::CategoryNotFound`] when zero rows were updated.
    fn update(&self, category: &Category) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Hard-deletes a category.
pub trait CategoryDiscarder: Send + Sync + Clone {
    /// Returns [`AppError::CategoryNotFound`] when zero rows were deleted.
    fn discard(&self, id: Uuid) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Checks whether a category exists without loading it.
pub trait CategoryAsserter: Send + Sync + Clone {
    fn assert_exists(&self, id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Probes the backing store.
pub trait HealthCheck: Send + Sync + Clone {
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Every capability the HTTP layer needs from one backend.
pub trait CategoryStore:
    CategoryGetter
    + CategoryLister
    + CategoryStorer
    + CategoryUpdater
    + CategoryDiscarder
    + CategoryAsserter
    + HealthCheck
    + 'static
{
}

impl<T> CategoryStore for T where
    T: CategoryGetter
        + CategoryLister
        + CategoryStorer
        + CategoryUpdater
        + CategoryDiscarder
        + CategoryAsserter
        + HealthCheck
        + 'static
{
}
