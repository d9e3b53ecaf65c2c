mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_category_derives_slug() {
    let (server, _rx) = common::make_server();

    let category = common::create_category(&server, "Web Dev").await;

    assert_eq!(category["name"], "Web Dev");
    assert_eq!(category["slug"], "web-dev");
}

#[tokio::test]
async fn test_create_category_duplicate_name_ignores_case() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Web Dev").await;

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "web dev" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_create_category_empty_name() {
    let (server, _rx) = common::make_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

// ─── READ ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_categories_with_search() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Web Dev").await;
    common::create_category(&server, "Algorithms").await;

    let response = server.get("/api/categories").await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["pagination"]["total_items"], 2);
    assert_eq!(json["items"][0]["name"], "Algorithms");

    let response = server.get("/api/categories?search=WEB").await;
    let json = response.json::<Value>();
    assert_eq!(json["pagination"]["total_items"], 1);
    assert_eq!(json["items"][0]["slug"], "web-dev");
}

#[tokio::test]
async fn test_get_category_with_stats() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Algorithms").await;
    common::create_snippet(&server, "Quick Sort", Some("algorithms")).await;
    common::create_snippet(&server, "Merge Sort", Some("algorithms")).await;

    let response = server.get("/api/categories/algorithms").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["name"], "Algorithms");
    assert_eq!(json["stats"]["snippet_count"], 2);
    assert_eq!(json["stats"]["languages"]["python"], 2);
}

#[tokio::test]
async fn test_get_category_not_found() {
    let (server, _rx) = common::make_server();

    server
        .get("/api/categories/missing")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_category_snippets() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Algorithms").await;
    common::create_snippet(&server, "Quick Sort", Some("algorithms")).await;
    common::create_snippet(&server, "Hello World", None).await;

    let response = server.get("/api/categories/algorithms/snippets").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["pagination"]["total_items"], 1);
    assert_eq!(json["items"][0]["slug"], "quick-sort");

    server
        .get("/api/categories/missing/snippets")
        .await
        .assert_status_not_found();
}

// ─── UPDATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rename_category_regenerates_slug() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Web Dev").await;

    let response = server
        .patch("/api/categories/web-dev")
        .json(&json!({ "name": "Frontend" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["slug"], "frontend");
    server
        .get("/api/categories/web-dev")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_description_keeps_slug() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Web Dev").await;

    let response = server
        .patch("/api/categories/web-dev")
        .json(&json!({ "name": "Web Dev", "description": "HTML and friends" }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["slug"], "web-dev");
    assert_eq!(json["description"], "HTML and friends");
}

#[tokio::test]
async fn test_rename_to_same_normalized_name_keeps_slug() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Web Dev").await;

    let response = server
        .patch("/api/categories/web-dev")
        .json(&json!({ "name": "WEB dev!" }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["slug"], "web-dev");
    assert_eq!(json["name"], "WEB dev!");
}

#[tokio::test]
async fn test_long_transliterated_name_gets_bounded_slug() {
    let (server, _rx) = common::make_server();
    let name = "中".repeat(100);

    let first = common::create_category(&server, &name).await;
    let slug = first["slug"].as_str().unwrap();
    assert!(slug.len() <= 96);
    assert!(slug.starts_with("zhong"));

    server
        .get(&format!("/api/categories/{slug}"))
        .await
        .assert_status_ok();
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_category_detaches_snippets() {
    let (server, _rx) = common::make_server();
    common::create_category(&server, "Algorithms").await;
    common::create_snippet(&server, "Quick Sort", Some("algorithms")).await;

    server
        .delete("/api/categories/algorithms")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let snippet = server.get("/api/snippets/quick-sort").await;
    snippet.assert_status_ok();
    assert_eq!(snippet.json::<Value>()["category_id"], Value::Null);

    server
        .delete("/api/categories/algorithms")
        .await
        .assert_status_not_found();
}
