use std::fs;

use news_db::Database;

use crate::integration::common::{index_exists, start_postgres, table_exists};

#[tokio::test]
async fn embedded_migrations_create_category_table() {
    let (pool, _container) = start_postgres().await;
    let db = Database::from_pool(pool.clone());

    db.migrate_to(None, None).await.unwrap();

    assert!(table_exists(&pool, "category").await);
    assert!(index_exists(&pool, "idx_category_name").await);
}

#[tokio::test]
async fn target_version_reverts_newer_migrations() {
    let (pool, _container) = start_postgres().await;
    let db = Database::from_pool(pool.clone());

    db.migrate_to(None, None).await.unwrap();
    db.migrate_to(None, Some(1)).await.unwrap();

    assert!(table_exists(&pool, "category").await);
    assert!(!index_exists(&pool, "idx_category_name").await);

    // and forward again
    db.migrate_to(None, Some(2)).await.unwrap();
    assert!(index_exists(&pool, "idx_category_name").await);
}

#[tokio::test]
async fn migrations_can_be_loaded_from_a_directory() {
    let (pool, _container) = start_postgres().await;
    let db = Database::from_pool(pool.clone());

    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("0001_create_widgets.up.sql"),
        "CREATE TABLE widgets (id INT PRIMARY KEY);",
    )
    .unwrap();
    fs::write(
        dir.path().join("0001_create_widgets.down.sql"),
        "DROP TABLE widgets;",
    )
    .unwrap();

    db.migrate_to(Some(dir.path()), None).await.unwrap();
    assert!(table_exists(&pool, "widgets").await);
}

#[tokio::test]
async fn unknown_target_version_is_a_config_error() {
    let (pool, _container) = start_postgres().await;
    let db = Database::from_pool(pool.clone());

    let err = db.migrate_to(None, Some(99)).await.unwrap_err();
    assert!(matches!(err, news_core::AppError::ConfigError(_)));

    let err = db.migrate_to(None, Some(0)).await.unwrap_err();
    assert!(matches!(err, news_core::AppError::ConfigError(_)));
    assert!(!table_exists(&pool, "category").await);
}
