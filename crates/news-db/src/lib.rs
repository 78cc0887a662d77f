pub mod category_repository;
pub mod config;
pub mod database;

pub use category_repository::CategoryRepository;
pub use config::DatabaseConfig;
pub use database::{Database, MIGRATOR};
