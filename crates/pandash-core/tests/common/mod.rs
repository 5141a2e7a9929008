//! Common test utilities for `Pandash` integration tests.
//!
//! Spawns an in-process backend on an ephemeral port that speaks the
//! control panel's REST dialect and records every request it sees.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

/// API key the mock backend accepts.
pub const TEST_KEY: &str = "test-key";

/// Shared state of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    /// Number of `GET /api/control/queues` calls
    pub queue_fetches: AtomicUsize,
    /// Every request as `METHOD /path?query`
    pub log: Mutex<Vec<String>>,
    /// Last body received by `PUT /api/control/settings`
    pub saved_settings: Mutex<Option<Value>>,
}

impl MockState {
    fn record(&self, method: &str, path: &str, query: &HashMap<String, String>) {
        let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        self.log
            .lock()
            .expect("log lock")
            .push(format!("{method} {path}?{}", pairs.join("&")));
    }

    /// Requests recorded so far.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }

    /// Recorded requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.split_once(' ').is_some_and(|(_, p)| p.starts_with(prefix)))
            .collect()
    }

    /// Queue snapshot fetches so far.
    pub fn queue_fetches(&self) -> usize {
        self.queue_fetches.load(Ordering::SeqCst)
    }
}

/// A running mock backend.
pub struct MockBackend {
    /// `http://127.0.0.1:<port>`
    pub base_url: String,
    /// Recorded traffic
    pub state: Arc<MockState>,
}

type Shared = State<Arc<MockState>>;
type Params = Query<HashMap<String, String>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "error": "Invalid API key"})),
    )
        .into_response()
}

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

async fn health(State(state): Shared, Query(q): Params) -> Response {
    state.record("GET", "/api/health", &q);
    Json(json!({
        "status": "ok",
        "message": "running",
        "version": "1.0.0",
        "accounts": ["A", "B"],
        "timestamp": "2024-05-01T10:00:00"
    }))
    .into_response()
}

async fn info(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/info", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "app_name": "pan control",
        "version": "1.0.0",
        "environment": "test",
        "accounts": ["A", "B"],
        "active_services": ["A"]
    }))
}

async fn list_files(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/files/list", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!([
        {"server_filename": "docs", "path": "/docs", "size": 0, "isdir": 1, "fs_id": 1001},
        {"filename": "notes.txt", "path": "/notes.txt", "size": 1536, "isdir": 0,
         "mtime": 1_700_000_000, "fs_id": 1002, "md5": "abc123"}
    ]))
}

async fn search_files(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/files/search", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!([
        {"server_filename": "report.pdf", "path": "/docs/report.pdf", "size": 2048, "isdir": false}
    ]))
}

async fn overview(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/control/overview", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "health": {"status": "healthy", "total_accounts": 2, "active_accounts": 1,
                   "timestamp": "2024-05-01T10:00:00"},
        "accounts": [{"name": "A", "available": true, "has_adapter": true},
                     {"name": "B", "available": false, "has_adapter": false}],
        "queues_summary": {"total_transfer_pending": 2, "total_transfer_running": 1}
    }))
}

async fn queues(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/control/queues", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    state.queue_fetches.fetch_add(1, Ordering::SeqCst);
    ok(json!({
        "accounts": {
            "A": {
                "available": true,
                "transfer": {
                    "status": {"pending": 2, "running": 1, "completed": 0, "failed": 0},
                    "queue": [
                        {"status": "pending", "share_link": "https://pan.example.com/s/1a",
                         "target_path": "/in", "created_at": "2024-05-01 09:00:00"}
                    ]
                },
                "share": {"status": {}, "queue": []}
            },
            "B": {
                "available": true,
                "transfer": {
                    "status": {"pending": 2, "running": 1, "completed": 0, "failed": 0},
                    "queue": []
                },
                "share": {"status": {"completed": 4}, "queue": []}
            },
            "C": {"available": false, "error": "service offline"}
        },
        "timestamp": "2024-05-01T10:00:00"
    }))
}

fn queue_action(
    state: &MockState,
    headers: &HeaderMap,
    kind: &str,
    action: &str,
    q: &HashMap<String, String>,
    body: &Value,
) -> Response {
    state.record("POST", &format!("/api/{kind}/{action}"), q);
    if !authorized(headers) {
        return unauthorized();
    }
    if body.get("account").and_then(Value::as_str) != q.get("account").map(String::as_str) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "account mismatch"})),
        )
            .into_response();
    }
    if action == "resume" {
        return Json(json!({"success": false, "error": "queue is not paused"})).into_response();
    }
    Json(json!({"success": true, "message": format!("{kind} queue: {action} ok")})).into_response()
}

fn queue_export(
    state: &MockState,
    headers: &HeaderMap,
    kind: &str,
    action: &str,
    q: &HashMap<String, String>,
) -> Response {
    state.record("GET", &format!("/api/{kind}/{action}"), q);
    if !authorized(headers) {
        return unauthorized();
    }
    if action != "export" {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [(header::CONTENT_TYPE, "text/csv")],
        "status,share_link\ncompleted,https://pan.example.com/s/1a\n",
    )
        .into_response()
}

async fn transfer_export(
    State(state): Shared,
    headers: HeaderMap,
    Path(action): Path<String>,
    Query(q): Params,
) -> Response {
    queue_export(&state, &headers, "transfer", &action, &q)
}

async fn transfer_action(
    State(state): Shared,
    headers: HeaderMap,
    Path(action): Path<String>,
    Query(q): Params,
    Json(body): Json<Value>,
) -> Response {
    queue_action(&state, &headers, "transfer", &action, &q, &body)
}

async fn share_export(
    State(state): Shared,
    headers: HeaderMap,
    Path(action): Path<String>,
    Query(q): Params,
) -> Response {
    queue_export(&state, &headers, "share", &action, &q)
}

async fn share_action(
    State(state): Shared,
    headers: HeaderMap,
    Path(action): Path<String>,
    Query(q): Params,
    Json(body): Json<Value>,
) -> Response {
    queue_action(&state, &headers, "share", &action, &q, &body)
}

fn default_settings() -> Value {
    json!({
        "throttle": {
            "jitter_ms_min": 500, "jitter_ms_max": 1500, "ops_per_window": 50,
            "window_sec": 60, "window_rest_sec": 20, "max_consecutive_failures": 5,
            "pause_sec_on_failure": 60, "backoff_factor": 1.5,
            "cooldown_on_errno_-62_sec": 120
        },
        "workers": {"max_transfer_workers": 1, "max_share_workers": 1},
        "rate_limit": {"enabled": true},
        "ui": {"auto_refresh_interval": 5000, "api_key_retention": true}
    })
}

async fn get_settings(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/control/settings", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    let saved = state.saved_settings.lock().expect("settings lock").clone();
    ok(saved.unwrap_or_else(default_settings))
}

async fn put_settings(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Params,
    Json(body): Json<Value>,
) -> Response {
    state.record("PUT", "/api/control/settings", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    *state.saved_settings.lock().expect("settings lock") = Some(body.clone());
    Json(json!({"success": true, "data": body, "message": "saved"})).into_response()
}

async fn knowledge_entries(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Params,
) -> Response {
    state.record("GET", "/api/knowledge/entries", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    let page: i64 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let entries = if page == 1 {
        json!([{
            "id": 7, "article_id": 42, "article_title": "Rust in Action",
            "tag": "books", "original_link": "https://pan.example.com/s/orig",
            "original_password": "abcd", "status": "completed",
            "created_at": "2024-05-01 09:00:00"
        }])
    } else {
        json!([])
    };
    Json(json!({
        "success": true,
        "data": {
            "entries": entries,
            "pagination": {"page": page, "page_size": 50, "total": 1, "total_pages": 1}
        },
        "summary": {"completed": 1, "failed": 0}
    }))
    .into_response()
}

async fn knowledge_tags(State(state): Shared, headers: HeaderMap, Query(q): Params) -> Response {
    state.record("GET", "/api/knowledge/tags", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({"tags": ["books", "video"]}))
}

async fn knowledge_statuses(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Params,
) -> Response {
    state.record("GET", "/api/knowledge/statuses", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({"statuses": {"completed": 1, "failed": 0, "pending": 3}}))
}

async fn knowledge_export(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Params,
) -> Response {
    state.record("GET", "/api/knowledge/export", &q);
    if !authorized(&headers) {
        return unauthorized();
    }
    let fields = q.get("fields").cloned().unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/csv")], format!("{fields}\n")).into_response()
}

/// Start a mock backend on an ephemeral port.
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/info", get(info))
        .route("/api/files/list", get(list_files))
        .route("/api/files/search", get(search_files))
        .route("/api/control/overview", get(overview))
        .route("/api/control/queues", get(queues))
        .route("/api/control/settings", get(get_settings).put(put_settings))
        .route(
            "/api/transfer/{action}",
            get(transfer_export).post(transfer_action),
        )
        .route("/api/share/{action}", get(share_export).post(share_action))
        .route("/api/knowledge/entries", get(knowledge_entries))
        .route("/api/knowledge/tags", get(knowledge_tags))
        .route("/api/knowledge/statuses", get(knowledge_statuses))
        .route("/api/knowledge/export", get(knowledge_export))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
