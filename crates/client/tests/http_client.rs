//! Request-layer behavior: caching, invalidation, timeouts, error mapping,
//! and file transfer.

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Json, Multipart, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use common::{adventurer_json, quest_json, spawn, wiring};
use sidequest_client::http::{Method, RequestOptions};
use sidequest_client::ApiError;
use sidequest_core::quest::Quest;

fn adventurers_route() -> Router {
    Router::new().route(
        "/api/v1/adventurers",
        get(|| async {
            Json(json!({
                "adventurers": [adventurer_json("a1", "Aria", 1, 40)],
                "count": 1,
            }))
        }),
    )
}

// -- caching -------------------------------------------------------------------

#[tokio::test]
async fn repeated_get_is_served_from_cache() {
    let (base, hits) = spawn(adventurers_route()).await;
    let (http, _tokens) = wiring(&base);

    let first: Value = http.get("/api/v1/adventurers").await.unwrap().data;
    let second: Value = http.get("/api/v1/adventurers").await.unwrap().data;

    assert_eq!(first, second);
    assert_eq!(hits.count("/api/v1/adventurers"), 1);
}

#[tokio::test]
async fn different_headers_miss_the_cache() {
    let (base, hits) = spawn(adventurers_route()).await;
    let (http, _tokens) = wiring(&base);

    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;
    let options = RequestOptions::new(Method::GET).header("X-Trace", "1");
    let _: Value = http
        .request("/api/v1/adventurers", options)
        .await
        .unwrap()
        .data;

    assert_eq!(hits.count("/api/v1/adventurers"), 2);
}

#[tokio::test]
async fn mutation_invalidates_the_resource_family() {
    let router = adventurers_route()
        .route(
            "/api/v1/quests/{id}",
            get(|| async { Json(json!([quest_json("q1", "First", "a1", false)])) }),
        )
        .route(
            "/api/v1/quest",
            post(|Json(body): Json<Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({"message": "created", "quest": quest_json(
                        "q2",
                        body["title"].as_str().unwrap_or(""),
                        body["adventurer_id"].as_str().unwrap_or(""),
                        false,
                    )})),
                )
            }),
        );
    let (base, hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let _: Value = http.get("/api/v1/quests/a1").await.unwrap().data;
    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;

    // Creating a quest evicts the quest family but leaves adventurers cached.
    let _: Value = http
        .post(
            "/api/v1/quest",
            &json!({"title": "New Quest", "adventurer_id": "a1", "experience_reward": 100}),
        )
        .await
        .unwrap()
        .data;

    let _: Value = http.get("/api/v1/quests/a1").await.unwrap().data;
    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;

    assert_eq!(hits.count("/api/v1/quests/a1"), 2);
    assert_eq!(hits.count("/api/v1/adventurers"), 1);
}

#[tokio::test]
async fn clear_cache_by_pattern_and_wholesale() {
    let router = adventurers_route().route(
        "/api/v1/quests/{id}",
        get(|| async { Json(json!([quest_json("q1", "First", "a1", false)])) }),
    );
    let (base, hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;
    let _: Value = http.get("/api/v1/quests/a1").await.unwrap().data;

    let pattern = regex::Regex::new("/quests/").unwrap();
    http.clear_cache(Some(&pattern));

    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;
    let _: Value = http.get("/api/v1/quests/a1").await.unwrap().data;
    assert_eq!(hits.count("/api/v1/adventurers"), 1);
    assert_eq!(hits.count("/api/v1/quests/a1"), 2);

    http.clear_cache(None);
    let _: Value = http.get("/api/v1/adventurers").await.unwrap().data;
    assert_eq!(hits.count("/api/v1/adventurers"), 2);
}

// -- timeout -------------------------------------------------------------------

#[tokio::test]
async fn slow_response_times_out_with_timeout_error() {
    let router = Router::new().route(
        "/api/v1/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"ok": true}))
        }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let options = RequestOptions::new(Method::GET).timeout(Duration::from_millis(50));
    let err = http
        .request::<Value>("/api/v1/slow", options)
        .await
        .expect_err("should time out");

    assert_matches!(err, ApiError::Timeout { .. });
    assert_eq!(err.code(), "TIMEOUT_ERROR");
}

// -- error mapping --------------------------------------------------------------

#[tokio::test]
async fn failure_body_maps_to_status_coded_error() {
    let router = Router::new().route(
        "/api/v1/quest/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Quest with ID: q9 not found"})),
            )
        }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let err = http
        .get::<Value>("/api/v1/quest/q9")
        .await
        .expect_err("should fail");

    assert_eq!(err.code(), "HTTP_ERROR_404");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Quest with ID: q9 not found");
}

#[tokio::test]
async fn undecodable_failure_body_maps_to_unknown_error() {
    let router = Router::new().route(
        "/api/v1/broken",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "not json at all") }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let err = http
        .get::<Value>("/api/v1/broken")
        .await
        .expect_err("should fail");

    assert_eq!(err.code(), "UNKNOWN_ERROR");
    assert_eq!(err.to_string(), "Unknown error occurred");
}

#[tokio::test]
async fn backend_supplied_code_passes_through() {
    let router = Router::new().route(
        "/api/v1/auth/me",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Session revoked", "code": "UNAUTHORIZED"})),
            )
        }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let err = http
        .get::<Value>("/api/v1/auth/me")
        .await
        .expect_err("should fail");

    assert_eq!(err.code(), "UNAUTHORIZED");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn schema_mismatch_fails_loudly() {
    let router = Router::new().route(
        "/api/v1/quest/{id}",
        get(|| async { Json(json!({"unexpected": true})) }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let err = http
        .get::<Quest>("/api/v1/quest/q1")
        .await
        .expect_err("should fail");

    assert_matches!(err, ApiError::Schema { .. });
    assert_eq!(err.code(), "CLIENT_ERROR");
}

#[tokio::test]
async fn missing_token_still_sends_the_request() {
    // with_auth defaults to true, but no token is stored; the request must
    // go out unauthenticated rather than fail locally.
    let (base, hits) = spawn(adventurers_route()).await;
    let (http, tokens) = wiring(&base);
    assert!(!tokens.has_token());

    let response: Value = http.get("/api/v1/adventurers").await.unwrap().data;

    assert_eq!(response["count"], 1);
    assert_eq!(hits.count("/api/v1/adventurers"), 1);
}

// -- query params ----------------------------------------------------------------

#[tokio::test]
async fn query_params_are_appended() {
    let router = Router::new().route(
        "/api/v1/echo",
        get(
            |Query(params): Query<std::collections::HashMap<String, String>>| async move {
                Json(json!({"page": params.get("page")}))
            },
        ),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let options = RequestOptions::new(Method::GET).param("page", "2");
    let data: Value = http.request("/api/v1/echo", options).await.unwrap().data;

    assert_eq!(data, json!({"page": "2"}));
}

// -- upload ----------------------------------------------------------------------

#[tokio::test]
async fn upload_reports_progress_to_completion() {
    let router = Router::new().route(
        "/api/v1/import",
        post(|mut multipart: Multipart| async move {
            let mut received = 0usize;
            let mut field_name = String::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                field_name = field.name().unwrap_or_default().to_string();
                received += field.bytes().await.unwrap().len();
            }
            Json(json!({"received": received, "field": field_name}))
        }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.bin");
    let payload = vec![7u8; 256 * 1024];
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&payload)
        .unwrap();

    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = Arc::clone(&seen);
    let progress: sidequest_client::http::ProgressFn = Arc::new(move |pct| {
        seen_in_callback.lock().unwrap().push(pct);
    });

    let response = http
        .upload_file::<Value>(
            "/api/v1/import",
            &path,
            Some(progress),
            RequestOptions::new(Method::POST),
        )
        .await
        .expect("upload should succeed");

    assert_eq!(response.data["received"], payload.len());
    assert_eq!(response.data["field"], "file");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.last().copied(), Some(100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress must not regress");
}

// -- download --------------------------------------------------------------------

fn export_route(payload: Vec<u8>) -> Router {
    Router::new().route(
        "/api/v1/export",
        get(move || {
            let payload = payload.clone();
            async move { payload }
        }),
    )
}

#[tokio::test]
async fn download_writes_the_payload_to_disk() {
    let payload = vec![42u8; 64 * 1024];
    let (base, _hits) = spawn(export_route(payload.clone())).await;
    let (http, _tokens) = wiring(&base);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("export.bin");

    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = Arc::clone(&seen);
    let progress: sidequest_client::http::ProgressFn = Arc::new(move |pct| {
        seen_in_callback.lock().unwrap().push(pct);
    });

    http.download_file(
        "/api/v1/export",
        &dest,
        Some(progress),
        RequestOptions::new(Method::GET),
    )
    .await
    .expect("download should succeed");

    assert_eq!(std::fs::read(&dest).unwrap(), payload);
    assert_eq!(seen.lock().unwrap().last().copied(), Some(100));
}

#[tokio::test]
async fn download_failure_status_keeps_its_code() {
    let router = Router::new().route(
        "/api/v1/export",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "No export available"})),
            )
        }),
    );
    let (base, _hits) = spawn(router).await;
    let (http, _tokens) = wiring(&base);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("export.bin");

    let err = http
        .download_file(
            "/api/v1/export",
            &dest,
            None,
            RequestOptions::new(Method::GET),
        )
        .await
        .expect_err("should fail");

    assert_eq!(err.code(), "HTTP_ERROR_404");
    assert!(!dest.exists(), "no file is created for a failed download");
}

#[tokio::test]
async fn unwritable_destination_is_a_download_error() {
    let (base, _hits) = spawn(export_route(b"payload".to_vec())).await;
    let (http, _tokens) = wiring(&base);

    let dest = std::path::Path::new("/nonexistent-dir/export.bin");
    let err = http
        .download_file("/api/v1/export", dest, None, RequestOptions::new(Method::GET))
        .await
        .expect_err("should fail");

    assert_eq!(err.code(), "DOWNLOAD_ERROR");
}
