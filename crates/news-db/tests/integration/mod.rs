mod category_tests;
pub mod common;
mod migration_tests;
