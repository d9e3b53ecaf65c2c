mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

// ─── COMMENTS ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_comment_requires_user() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    server
        .post("/api/snippets/quick-sort/comments")
        .json(&json!({ "text": "Nice" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_comment_threads() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let root = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "  Why the middle pivot?  " }))
        .await;
    root.assert_status(StatusCode::CREATED);
    let root = root.json::<Value>();
    assert_eq!(root["text"], "Why the middle pivot?");
    assert_eq!(root["parent_id"], Value::Null);

    let reply = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "2")
        .json(&json!({ "text": "It avoids the sorted-input worst case", "parent": root["id"] }))
        .await;
    reply.assert_status(StatusCode::CREATED);
    assert_eq!(reply.json::<Value>()["parent_id"], root["id"]);

    let threads = server
        .get("/api/snippets/quick-sort/comments")
        .await
        .json::<Value>();
    let threads = threads.as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["id"], root["id"]);
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 1);

    let detail = server.get("/api/snippets/quick-sort").await.json::<Value>();
    assert_eq!(detail["engagement"]["comment_count"], 2);
}

#[tokio::test]
async fn test_reply_must_share_snippet() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;
    common::create_snippet(&server, "Merge Sort", None).await;

    let root = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "First" }))
        .await
        .json::<Value>();

    let response = server
        .post("/api/snippets/merge-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "Misplaced reply", "parent": root["id"] }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_blank_comment_rejected() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "   " }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_only_author_edits_comment() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let comment = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "Draft" }))
        .await
        .json::<Value>();
    let id = comment["id"].as_i64().unwrap();

    let forbidden = server
        .patch(&format!("/api/comments/{id}"))
        .add_header("X-User-Id", "2")
        .json(&json!({ "text": "Hijacked" }))
        .await;
    forbidden.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(forbidden.json::<Value>()["error"]["code"], "forbidden");

    server
        .delete(&format!("/api/comments/{id}"))
        .add_header("X-User-Id", "2")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let updated = server
        .patch(&format!("/api/comments/{id}"))
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "Final", "is_resolved": true }))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["text"], "Final");
    assert_eq!(updated["is_resolved"], true);
}

#[tokio::test]
async fn test_delete_comment_removes_replies() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let root = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "1")
        .json(&json!({ "text": "Root" }))
        .await
        .json::<Value>();
    let reply = server
        .post("/api/snippets/quick-sort/comments")
        .add_header("X-User-Id", "2")
        .json(&json!({ "text": "Reply", "parent": root["id"] }))
        .await
        .json::<Value>();

    let root_id = root["id"].as_i64().unwrap();
    server
        .delete(&format!("/api/comments/{root_id}"))
        .add_header("X-User-Id", "1")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let reply_id = reply["id"].as_i64().unwrap();
    server
        .get(&format!("/api/comments/{reply_id}"))
        .await
        .assert_status_not_found();
}

// ─── SHARES ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_share_defaults_to_link() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let response = server
        .post("/api/snippets/quick-sort/shares")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let share = response.json::<Value>();
    assert_eq!(share["share_method"], "link");
    assert_eq!(share["user_id"], Value::Null);
}

#[tokio::test]
async fn test_share_records_forwarded_ip_behind_proxy() {
    let server = common::make_proxy_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let response = server
        .post("/api/snippets/quick-sort/shares")
        .add_header("X-User-Id", "7")
        .add_header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
        .json(&json!({ "share_method": "email", "shared_to": " friend@example.com " }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let share = response.json::<Value>();
    assert_eq!(share["ip_address"], "203.0.113.9");
    assert_eq!(share["user_id"], 7);
    assert_eq!(share["shared_to"], "friend@example.com");
}

#[tokio::test]
async fn test_forwarded_header_ignored_without_proxy() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let share = server
        .post("/api/snippets/quick-sort/shares")
        .add_header("X-Forwarded-For", "203.0.113.9")
        .json(&json!({ "share_method": "social" }))
        .await
        .json::<Value>();

    assert_ne!(share["ip_address"], "203.0.113.9");
}

#[tokio::test]
async fn test_unknown_share_method_rejected() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let response = server
        .post("/api/snippets/quick-sort/shares")
        .json(&json!({ "share_method": "fax" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_list_shares_paginated() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;
    for _ in 0..3 {
        server
            .post("/api/snippets/quick-sort/shares")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let page = server
        .get("/api/snippets/quick-sort/shares")
        .add_query_param("page_size", 2)
        .await
        .json::<Value>();

    assert_eq!(page["pagination"]["total_items"], 3);
    assert_eq!(page["pagination"]["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

// ─── RUNS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_captures_user_agent() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    let response = server
        .post("/api/snippets/quick-sort/runs")
        .add_header("User-Agent", "codehub-test/1.0")
        .json(&json!({ "was_modified": true, "execution_time_ms": 12.5 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let run = response.json::<Value>();
    assert_eq!(run["user_agent"], "codehub-test/1.0");
    assert_eq!(run["was_modified"], true);
    assert_eq!(run["execution_time_ms"], 12.5);

    let detail = server.get("/api/snippets/quick-sort").await.json::<Value>();
    assert_eq!(detail["engagement"]["run_count"], 1);
}

#[tokio::test]
async fn test_run_negative_time_rejected() {
    let (server, _rx) = common::make_server();
    common::create_snippet(&server, "Quick Sort", None).await;

    server
        .post("/api/snippets/quick-sort/runs")
        .json(&json!({ "execution_time_ms": -1.0 }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_run_unknown_snippet() {
    let (server, _rx) = common::make_server();

    server
        .post("/api/snippets/missing/runs")
        .json(&json!({}))
        .await
        .assert_status_not_found();
}
