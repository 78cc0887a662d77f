use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::integration::common::{TestApp, setup_test_app};

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn status_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = send(&app, empty_request("GET", "/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn create_read_delete_category() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app,
        json_request("POST", "/category", json!({"name": "tech", "title": "Technology"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = json["category_id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, empty_request("GET", &format!("/category/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "tech");
    assert_eq!(json["title"], "Technology");

    let (status, _) = send(&app, empty_request("DELETE", &format!("/category/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, empty_request("GET", &format!("/category/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json,
        json!({"error": {
            "code": "InvalidUri",
            "message": "The requested URI does not represent any resource on the server."
        }})
    );
}

#[tokio::test]
async fn update_persists_new_fields() {
    let app = setup_test_app().await;

    let (_, json) = send(
        &app,
        json_request("POST", "/category", json!({"name": "tech", "title": "Technology"})),
    )
    .await;
    let id = json["category_id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        json_request(
            "PUT",
            &format!("/category/{id}"),
            json!({"name": "science", "title": "Science"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"category_id": id, "name": "science", "title": "Science"}));

    let stored: (String, String) =
        sqlx::query_as("SELECT name, title FROM category WHERE category_id = $1::uuid")
            .bind(&id)
            .fetch_one(app.db.pool())
            .await
            .unwrap();
    assert_eq!(stored, ("science".to_string(), "Science".to_string()));
}

#[tokio::test]
async fn duplicate_identifier_returns_400() {
    let app = setup_test_app().await;
    let body = json!({
        "category_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
        "name": "tech",
        "title": "Technology"
    });

    let (status, _) = send(&app, json_request("POST", "/category", body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, json_request("POST", "/category", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "InvalidInput");
    assert_eq!(json["error"]["target"], "category_id");
}

#[tokio::test]
async fn missing_name_is_rejected_before_storage() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app,
        json_request("POST", "/category", json!({"title": "Technology"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "InvalidInput");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
        .fetch_one(app.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn list_returns_page_and_total() {
    let app = setup_test_app().await;
    for name in ["world", "arts", "sport"] {
        let (status, _) = send(
            &app,
            json_request("POST", "/category", json!({"name": name, "title": name})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(&app, empty_request("GET", "/category?$top=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    let names: Vec<&str> = json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["arts", "sport"]);
}
