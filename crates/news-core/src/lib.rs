pub mod error;
pub mod models;
pub mod schema;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use models::{Category, Page};
pub use schema::{SchemaRegistry, Violation, Violations};
pub use traits::{
    CategoryAsserter, CategoryDiscarder, CategoryGetter, CategoryLister, CategoryStore,
    CategoryStorer, CategoryUpdater, HealthCheck,
};
