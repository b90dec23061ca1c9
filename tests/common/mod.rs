//! In-process stand-in for the diary backend.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Multipart, Path, Query, State},
    Form,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

/// Title that makes the upload endpoint answer 500.
pub const FAILING_TITLE: &str = "please fail";

pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "correct horse";
/// Token handed out by login and register.
pub const ISSUED_TOKEN: &str = "issued-token";

#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    pub video: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub uploads: Vec<Upload>,
    pub list_queries: Vec<HashMap<String, String>>,
    pub authorizations: Vec<Option<String>>,
    pub deleted: Vec<i64>,
    pub registrations: Vec<Value>,
    pub profile_updates: Vec<(Option<String>, Value)>,
}

type Shared = Arc<Mutex<Recorded>>;

pub struct TestServer {
    pub base_url: String,
    pub recorded: Shared,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let recorded: Shared = Arc::new(Mutex::new(Recorded::default()));
        let app = Router::new()
            .route("/api/entries", get(list_entries))
            .route("/api/entries/upload", post(upload))
            .route("/api/entries/:id", get(get_entry).delete(delete_entry))
            .route("/api/entries/:id/favorite", post(toggle_favorite))
            .route("/api/analytics/stats", get(stats))
            .route("/api/analytics/mood-heatmap", get(mood_heatmap))
            .route("/api/analytics/day-of-week", get(day_of_week))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me).put(update_me))
            .with_state(recorded.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let port = listener.local_addr().expect("local addr").port();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            recorded,
            handle,
        }
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.recorded.lock().unwrap().uploads.clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn entry_json(id: i64, favorite: bool) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "title": format!("entry {id}"),
        "mood": "happy",
        "mood_intensity": 7,
        "manual_tags": ["aile"],
        "auto_tags": null,
        "is_private": true,
        "is_favorite": favorite,
        "duration_seconds": 65.0,
        // Naive UTC, the way the backend serializes its columns.
        "recorded_at": format!("2024-05-{:02}T10:00:00.250000", (id % 28) + 1),
        "created_at": format!("2024-05-{:02}T10:00:01", (id % 28) + 1),
        "updated_at": null,
    })
}

pub fn user_json(full_name: Option<&str>, bio: Option<&str>) -> Value {
    json!({
        "id": 3,
        "email": "ada@example.com",
        "username": USERNAME,
        "full_name": full_name,
        "avatar_url": null,
        "bio": bio,
        "is_active": true,
        "is_premium": false,
        "is_verified": false,
        "language": "tr",
        "timezone": "Europe/Istanbul",
        "theme": "light",
        "created_at": "2024-04-01T09:30:00.000001",
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"detail": message}))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn upload(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut upload = Upload {
        authorization: bearer(&headers),
        ..Upload::default()
    };

    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        if name == "video" {
            upload.file_name = field.file_name().map(str::to_string);
            upload.content_type = field.content_type().map(str::to_string);
            upload.video = field.bytes().await.expect("video bytes").to_vec();
        } else {
            let value = field.text().await.expect("text field");
            upload.fields.insert(name, value);
        }
    }

    let fail = upload.fields.get("title").map(String::as_str) == Some(FAILING_TITLE);
    recorded.lock().unwrap().uploads.push(upload);

    if fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "storage unavailable"})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(entry_json(41, false))).into_response()
}

async fn list_entries(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u32 = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    {
        let mut recorded = recorded.lock().unwrap();
        recorded.authorizations.push(bearer(&headers));
        recorded.list_queries.push(params);
    }

    // Two pages of two entries each.
    let first = i64::from(page) * 2 - 1;
    Json(json!({
        "items": [entry_json(first, false), entry_json(first + 1, true)],
        "total": 4,
        "page": page,
        "page_size": page_size,
        "has_more": page < 2,
    }))
}

async fn toggle_favorite(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Entry not found"})),
        )
            .into_response();
    }
    Json(entry_json(id, true)).into_response()
}

async fn get_entry(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return detail(StatusCode::NOT_FOUND, "Entry not found");
    }
    Json(entry_json(id, false)).into_response()
}

async fn delete_entry(State(recorded): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    recorded.lock().unwrap().deleted.push(id);
    StatusCode::NO_CONTENT
}

async fn stats() -> Json<Value> {
    Json(json!({
        "total_entries": 12,
        "total_duration_minutes": 31.5,
        "mood_distribution": {"happy": 7, "sad": 5},
        "entries_this_week": 3,
        "entries_this_month": 9,
        "streak_days": 4,
    }))
}

async fn mood_heatmap(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let year = params.get("year").cloned().unwrap_or_else(|| "2024".into());
    let mut body = serde_json::Map::new();
    body.insert(
        format!("{year}-01-02"),
        json!({"mood": "peaceful", "intensity": 6, "count": 2}),
    );
    Json(Value::Object(body))
}

async fn day_of_week() -> Json<Value> {
    Json(json!({
        "Monday": {"happy": {"count": 3, "avg_intensity": 6.5}},
        "Friday": {"tired": {"count": 1, "avg_intensity": 9.0}},
    }))
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
    let known = matches!(
        form.get("username").map(String::as_str),
        Some(USERNAME) | Some("ada@example.com")
    );
    if !known || form.get("password").map(String::as_str) != Some(PASSWORD) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid e-mail or password");
    }
    Json(json!({
        "access_token": ISSUED_TOKEN,
        "token_type": "bearer",
        "user": user_json(Some("Ada L."), None),
    }))
    .into_response()
}

async fn register(State(recorded): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return detail(StatusCode::BAD_REQUEST, "Username already in use");
    }
    let full_name = body["full_name"].as_str().map(str::to_string);
    recorded.lock().unwrap().registrations.push(body);
    (
        StatusCode::CREATED,
        Json(json!({
            "access_token": ISSUED_TOKEN,
            "token_type": "bearer",
            "user": user_json(full_name.as_deref(), None),
        })),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(format!("Bearer {ISSUED_TOKEN}")) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    Json(user_json(Some("Ada L."), None)).into_response()
}

async fn update_me(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorded
        .lock()
        .unwrap()
        .profile_updates
        .push((bearer(&headers), body.clone()));
    let full_name = body
        .get("full_name")
        .and_then(Value::as_str)
        .unwrap_or("Ada L.");
    Json(user_json(Some(full_name), body.get("bio").and_then(Value::as_str))).into_response()
}
