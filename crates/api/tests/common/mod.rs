//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use lens_api::config::ServerConfig;
use lens_api::engine::scheduler::FrameScheduler;
use lens_api::router::build_app_router;
use lens_api::state::AppState;
use lens_core::types::DbId;
use lens_db::models::feed::Feed;
use lens_db::models::frame::Frame;
use lens_db::models::recording::{CreateRecording, Recording, RecordingKind};
use lens_db::repositories::{FeedRepo, FrameRepo, RecordingRepo};

/// Build a test `ServerConfig` with safe defaults and the standard
/// 10-minute frame lease.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        lease_ttl_secs: 600,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let scheduler = Arc::new(FrameScheduler::new(pool.clone(), config.lease_ttl()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        scheduler,
    };

    build_app_router(state, &config)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
    .expect("request failed")
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
    .await
    .expect("request failed")
}

/// Collect a response body as parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body was not valid JSON")
}

/// Assert a 404 with the standard `NOT_FOUND` error code.
pub async fn assert_not_found(response: Response<Body>) {
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

// --- Seeding -------------------------------------------------------------

pub async fn seed_recording(pool: &PgPool, name: &str) -> Recording {
    RecordingRepo::create(
        pool,
        RecordingKind::Bag,
        &CreateRecording {
            name: name.to_string(),
            location: "test tank".to_string(),
            conditions: vec!["murky".to_string()],
            recorded_at: Utc::now(),
        },
    )
    .await
    .expect("failed to seed recording")
}

pub async fn seed_feed(pool: &PgPool, recording_id: DbId, stream: &str) -> Feed {
    FeedRepo::get_or_create(pool, recording_id, stream)
        .await
        .expect("failed to seed feed")
}

pub async fn seed_frame(pool: &PgPool, feed_id: DbId, seq: i32) -> Frame {
    FrameRepo::create(pool, feed_id, seq, &[0xFF, 0xD8, 0xFF], "image/jpeg", 8, 8)
        .await
        .expect("failed to seed frame")
}

/// Seed one recording with a single feed of `count` consecutive frames,
/// returning the frames in sequence order.
pub async fn seed_single_feed(pool: &PgPool, count: i32) -> (Feed, Vec<Frame>) {
    let recording = seed_recording(pool, "dive-1").await;
    let feed = seed_feed(pool, recording.id, "camera/front").await;
    let mut frames = Vec::new();
    for seq in 1..=count {
        frames.push(seed_frame(pool, feed.id, seq).await);
    }
    (feed, frames)
}
