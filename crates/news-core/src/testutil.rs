//! Test utilities: an in-memory implementation of every storage trait.
//!
//! The store keeps its rows in an `Arc<Mutex<_>>` map so that clones handed
//! to a router share state with the test that inspects them, and records the
//! name of every storage call for assertions.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, Page};
use crate::traits::{
    CategoryAsserter, CategoryDiscarder, CategoryGetter, CategoryLister, CategoryStorer,
    CategoryUpdater, HealthCheck,
};

/// In-memory category store.
#[derive(Clone, Default)]
pub struct MockCategoryStore {
    categories: Arc<Mutex<BTreeMap<Uuid, Category>>>,
    fail_next: Arc<Mutex<Option<AppError>>>,
    unhealthy: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockCategoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let store = Self::empty();
        for category in categories {
            store.insert(category);
        }
        store
    }

    /// Insert a row directly, bypassing the recorded storage calls.
    pub fn insert(&self, category: Category) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.category_id, category);
    }

    pub fn get(&self, id: Uuid) -> Option<Category> {
        self.categories.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.categories.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next storage call fail with `error`.
    pub fn fail_next(&self, error: AppError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.unhealthy.lock().unwrap() = !healthy;
    }

    /// Names of the storage operations called so far, oldest first.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl CategoryGetter for MockCategoryStore {
    async fn get_category_by_id(&self, id: Uuid) -> Result<Category, AppError> {
        self.record("get")?;
        self.get(id).ok_or(AppError::CategoryNotFound(id))
    }
}

impl CategoryLister for MockCategoryStore {
    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, AppError> {
        self.record("list")?;
        let mut categories: Vec<Category> =
            self.categories.lock().unwrap().values().cloned().collect();
        categories.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        Ok(categories
            .into_iter()
            .skip(page.skip as usize)
            .take(page.top as usize)
            .collect())
    }

    async fn count_categories(&self) -> Result<u64, AppError> {
        self.record("count")?;
        Ok(self.len() as u64)
    }
}

impl CategoryStorer for MockCategoryStore {
    async fn store(&self, category: &Category) -> Result<(), AppError> {
        self.record("store")?;
        let mut categories = self.categories.lock().unwrap();
        if categories.contains_key(&category.category_id) {
            return Err(AppError::invalid_input(
                "category_id",
                "A category with this identifier already exists.",
            ));
        }
        categories.insert(category.category_id, category.clone());
        Ok(())
    }
}

impl CategoryUpdater for MockCategoryStore {
    async fn update(&self, category: &Category) -> Result<(), AppError> {
        self.record("update")?;
        let mut categories = self.categories.lock().unwrap();
        match categories.get_mut(&category.category_id) {
            Some(existing) => {
                existing.apply(category.name.clone(), category.title.clone());
                Ok(())
            }
            None => Err(AppError::CategoryNotFound(category.category_id)),
        }
    }
}

impl CategoryDiscarder for MockCategoryStore {
    async fn discard(&self, id: Uuid) -> Result<(), AppError> {
        self.record("discard")?;
        match self.categories.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::CategoryNotFound(id)),
        }
    }
}

impl CategoryAsserter for MockCategoryStore {
    async fn assert_exists(&self, id: Uuid) -> Result<bool, AppError> {
        self.record("assert_exists")?;
        Ok(self.categories.lock().unwrap().contains_key(&id))
    }
}

impl HealthCheck for MockCategoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.record("health_check")?;
        if *self.unhealthy.lock().unwrap() {
            return Err(AppError::DatabaseError("store marked unhealthy".into()));
        }
        Ok(())
    }
}
