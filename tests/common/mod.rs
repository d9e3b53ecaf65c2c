#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use codehub::domain::clock::SystemClock;
use codehub::domain::events::{DomainEvent, EventPublisher};
use codehub::infrastructure::memory::MemoryStore;
use codehub::routes::unlimited_router;
use codehub::state::{AppState, Repositories};

/// App state over a fresh in-memory store.
pub fn create_memory_state() -> (AppState, mpsc::Receiver<DomainEvent>) {
    let (events, rx) = EventPublisher::channel(100);
    let state = AppState::new(
        Repositories::memory(MemoryStore::new()),
        events,
        Arc::new(SystemClock),
        None,
        false,
    );
    (state, rx)
}

/// App state over PostgreSQL.
pub fn create_pg_state(pool: PgPool) -> (AppState, mpsc::Receiver<DomainEvent>) {
    let (events, rx) = EventPublisher::channel(100);
    let state = AppState::new(
        Repositories::postgres(Arc::new(pool.clone())),
        events,
        Arc::new(SystemClock),
        Some(pool),
        false,
    );
    (state, rx)
}

/// Test server with every route, backed by the in-memory store.
pub fn make_server() -> (TestServer, mpsc::Receiver<DomainEvent>) {
    let (state, rx) = create_memory_state();
    (TestServer::new(unlimited_router(state)).unwrap(), rx)
}

pub async fn create_category(server: &TestServer, name: &str) -> Value {
    let response = server
        .post("/api/categories")
        .json(&json!({ "name": name, "description": "" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn create_snippet(server: &TestServer, title: &str, category: Option<&str>) -> Value {
    let response = server
        .post("/api/snippets")
        .json(&json!({
            "title": title,
            "description": "A short example",
            "tags": "sorting, algorithms",
            "language": "python",
            "code_content": "print('hello')",
            "category": category,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn insert_test_category(pool: &PgPool, name: &str, slug: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, '') RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_test_snippet(pool: &PgPool, title: &str, slug: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO snippets (id, title, slug, language, output_type, code_content)
         VALUES ($1, $2, $3, 'python', 'console', 'print(1)') RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Test server that trusts `X-Forwarded-For`, as when deployed behind a proxy.
pub fn make_proxy_server() -> TestServer {
    let (events, _rx) = EventPublisher::channel(100);
    let state = AppState::new(
        Repositories::memory(MemoryStore::new()),
        events,
        Arc::new(SystemClock),
        None,
        true,
    );
    TestServer::new(unlimited_router(state)).unwrap()
}
