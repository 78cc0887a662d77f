use news_core::AppError;
use news_core::models::{Category, Page};
use uuid::Uuid;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn store_and_retrieve_category() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let category = Category::new(None, "tech", "Technology");
    repo.store(&category).await.unwrap();

    let loaded = repo.get_by_id(category.category_id).await.unwrap();
    assert_eq!(loaded, category);
    assert!(repo.exists(category.category_id).await.unwrap());
}

#[tokio::test]
async fn get_unknown_category_is_not_found() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let id = Uuid::new_v4();
    let err = repo.get_by_id(id).await.unwrap_err();
    assert!(matches!(err, AppError::CategoryNotFound(missing) if missing == id));
    assert!(!repo.exists(id).await.unwrap());
}

#[tokio::test]
async fn duplicate_identifier_is_rejected() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let category = Category::new(None, "tech", "Technology");
    repo.store(&category).await.unwrap();

    let duplicate = Category::new(Some(category.category_id), "sport", "Sport");
    let err = repo.store(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput { ref target, .. } if target == "category_id"));

    // The failed insert was rolled back and the original row is intact.
    let loaded = repo.get_by_id(category.category_id).await.unwrap();
    assert_eq!(loaded.name, "tech");
}

#[tokio::test]
async fn update_overwrites_mutable_fields() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let mut category = Category::new(None, "tech", "Technology");
    repo.store(&category).await.unwrap();

    category.apply("science", "Science & Tech");
    repo.update(&category).await.unwrap();

    let loaded = repo.get_by_id(category.category_id).await.unwrap();
    assert_eq!(loaded.name, "science");
    assert_eq!(loaded.title, "Science & Tech");
}

#[tokio::test]
async fn update_and_discard_of_missing_rows_are_not_found() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let category = Category::new(None, "ghost", "Ghost");
    assert!(repo.update(&category).await.unwrap_err().is_not_found());
    assert!(repo.discard(category.category_id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn discard_twice_reports_not_found_the_second_time() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let category = Category::new(None, "tech", "Technology");
    repo.store(&category).await.unwrap();

    repo.discard(category.category_id).await.unwrap();
    let err = repo.discard(category.category_id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_is_ordered_by_name_and_paged() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    for (name, title) in [("world", "World"), ("arts", "Arts"), ("sport", "Sport")] {
        repo.store(&Category::new(None, name, title)).await.unwrap();
    }

    let all = repo.list(Page::default()).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["arts", "sport", "world"]);

    let second = repo.list(Page::new(Some(1), Some(1))).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "sport");

    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn concurrent_creates_with_distinct_ids_never_collide() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let mut handles = Vec::new();
    for i in 0..10 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let category = Category::new(None, format!("cat-{i}"), format!("Category {i}"));
            repo.store(&category).await.map(|_| category.category_id)
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(repo.count().await.unwrap(), 10);
}

#[tokio::test]
async fn concurrent_updates_leave_one_consistent_write() {
    let (db, _container) = setup_test_db().await;
    let repo = db.category_repo();

    let category = Category::new(None, "tech", "Technology");
    repo.store(&category).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = repo.clone();
        let mut update = category.clone();
        update.apply(format!("name-{i}"), format!("Title {i}"));
        handles.push(tokio::spawn(async move { repo.update(&update).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // name and title always come from the same write
    let loaded = repo.get_by_id(category.category_id).await.unwrap();
    let suffix = loaded.name.strip_prefix("name-").expect("one of the writes");
    assert_eq!(loaded.title, format!("Title {suffix}"));
}

#[tokio::test]
async fn health_check_succeeds_against_live_database() {
    let (db, _container) = setup_test_db().await;
    db.category_repo().health_check().await.unwrap();
}
