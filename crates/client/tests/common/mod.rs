//! In-process mock backend for client tests.
//!
//! Tests build an axum router with just the routes they need; `spawn` binds
//! it to an ephemeral port and wraps it in a per-path hit counter so tests
//! can assert exactly how often the network was touched.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use sidequest_client::{ClientConfig, HttpClient, SessionController, TokenStore};

/// Per-path request counter shared with the running server.
#[derive(Clone, Default)]
pub struct Hits(Arc<Mutex<HashMap<String, usize>>>);

impl Hits {
    pub fn count(&self, path: &str) -> usize {
        *self.0.lock().expect("hits poisoned").get(path).unwrap_or(&0)
    }

    fn bump(&self, path: &str) {
        *self
            .0
            .lock()
            .expect("hits poisoned")
            .entry(path.to_string())
            .or_insert(0) += 1;
    }
}

async fn count_hits(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    hits.bump(request.uri().path());
    next.run(request).await
}

/// Serve `router` on an ephemeral port. Returns the base URL and counters.
pub async fn spawn(router: Router) -> (String, Hits) {
    let hits = Hits::default();
    let app = router.layer(middleware::from_fn_with_state(hits.clone(), count_hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server error");
    });

    (format!("http://{addr}"), hits)
}

/// Client wiring against a mock backend, with an in-memory token store.
pub fn wiring(base_url: &str) -> (Arc<HttpClient>, Arc<TokenStore>) {
    let config = ClientConfig::with_base(base_url);
    let tokens = Arc::new(TokenStore::in_memory());
    let http = Arc::new(HttpClient::new(&config, Arc::clone(&tokens)));
    (http, tokens)
}

/// Full session wiring against a mock backend.
pub fn session_wiring(base_url: &str) -> (Arc<HttpClient>, Arc<TokenStore>, SessionController) {
    let (http, tokens) = wiring(base_url);
    let session = SessionController::new(Arc::clone(&http), Arc::clone(&tokens));
    (http, tokens, session)
}

/// Mint an HS256 token whose `exp` lies `offset_secs` from now.
pub fn token_with_exp(offset_secs: i64) -> String {
    let claims = json!({
        "sub": "aria",
        "exp": chrono::Utc::now().timestamp() + offset_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"mock-backend-secret"),
    )
    .expect("encoding should succeed")
}

// -- fixture payloads --------------------------------------------------------

pub fn user_json() -> Value {
    json!({
        "id": "u1",
        "username": "aria",
        "email": "aria@example.com",
        "created_at": "2025-06-01T12:00:00Z",
        "updated_at": "2025-06-01T12:00:00Z",
    })
}

pub fn adventurer_json(id: &str, name: &str, level: i64, experience: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "level": level,
        "experience": experience,
        "experience_for_next_level": level * 100,
        "progress_percentage": (experience as f64 / (level * 100) as f64 * 100.0).min(100.0),
        "completed_quests_count": 0,
        "adventurer_type": "druid",
    })
}

pub fn quest_json(id: &str, title: &str, adventurer_id: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "experience_reward": 100,
        "completed": completed,
        "adventurer_id": adventurer_id,
        "created_at": "2025-06-02T09:30:00Z",
        "updated_at": "2025-06-02T09:30:00Z",
    })
}
