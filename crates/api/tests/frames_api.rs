mod common;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

use common::{
    assert_not_found, body_json, build_test_app, get, post_json, seed_feed, seed_frame,
    seed_recording, seed_single_feed,
};

/// One annotator walking a single feed end to end: frames arrive in
/// sequence order, an annotated frame never comes back, and once every
/// frame is leased or annotated the endpoint reports nothing left.
#[sqlx::test(migrations = "../db/migrations")]
async fn annotator_walks_a_feed_in_order(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 3).await;
    let app = build_test_app(pool);

    // First call, no previous: the lowest-sequence frame.
    let response = get(app.clone(), "/api/v1/frames/next").await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"]["id"], frames[0].id);
    assert_eq!(first["data"]["seq"], 1);
    assert!(first["data"]["accessed"].is_string());

    // Continue from frame 1: frame 2.
    let uri = format!("/api/v1/frames/next?previous={}", frames[0].id);
    let second = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(second["data"]["id"], frames[1].id);

    // Annotate frame 2.
    let uri = format!("/api/v1/frames/{}/annotations", frames[1].id);
    let response = post_json(
        app.clone(),
        &uri,
        json!({ "annotations": [{ "label": "starfish" }], "tags": ["Red"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let annotated = body_json(response).await;
    assert_eq!(annotated["data"]["tags"], json!(["red"]));
    assert_eq!(annotated["data"]["annotations"].as_array().unwrap().len(), 1);
    assert_eq!(annotated["data"]["annotations"][0]["author"], "robotics");

    // Continue from frame 2: frame 3 (frame 2 is annotated, 1 is leased).
    let uri = format!("/api/v1/frames/next?previous={}", frames[1].id);
    let third = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(third["data"]["id"], frames[2].id);

    // Everything is now leased or annotated.
    assert_not_found(get(app, "/api/v1/frames/next").await).await;
}

/// `previous` keeps the annotator on the same feed even when the global
/// scan order would pick a different one.
#[sqlx::test(migrations = "../db/migrations")]
async fn continuation_stays_on_the_previous_feed(pool: PgPool) {
    let recording = seed_recording(&pool, "dive-1").await;
    let front = seed_feed(&pool, recording.id, "camera/front").await;
    let down = seed_feed(&pool, recording.id, "camera/down").await;
    let front_1 = seed_frame(&pool, front.id, 1).await;
    let down_1 = seed_frame(&pool, down.id, 1).await;
    let down_2 = seed_frame(&pool, down.id, 2).await;
    let app = build_test_app(pool);

    // The global scan would offer the front camera's frame first.
    let uri = format!("/api/v1/frames/next?previous={}", down_1.id);
    let body = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(body["data"]["id"], down_2.id);
    assert_eq!(body["data"]["feed"]["stream"], "camera/down");

    // Exhausted feed: fall back to the other one.
    let uri = format!("/api/v1/frames/next?previous={}", down_2.id);
    let body = body_json(get(app, &uri).await).await;
    assert_eq!(body["data"]["id"], front_1.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_previous_falls_back_to_global_scan(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 1).await;
    let app = build_test_app(pool);

    let response = get(app, "/api/v1/frames/next?previous=999999").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], frames[0].id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn no_frames_at_all_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    assert_not_found(get(app, "/api/v1/frames/next").await).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn annotating_unknown_frame_is_404(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/frames/424242/annotations",
        json!({ "annotations": [], "tags": ["red"] }),
    )
    .await;
    assert_not_found(response).await;
}

/// Annotations are append-only: committing twice stacks records instead
/// of replacing them, and repeated tags collapse to one.
#[sqlx::test(migrations = "../db/migrations")]
async fn annotations_append_and_tags_deduplicate(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 1).await;
    let app = build_test_app(pool);
    let uri = format!("/api/v1/frames/{}/annotations", frames[0].id);

    let first = body_json(
        post_json(
            app.clone(),
            &uri,
            json!({ "annotations": [{ "label": "rock" }], "tags": ["red"] }),
        )
        .await,
    )
    .await;
    assert_eq!(first["data"]["annotations"].as_array().unwrap().len(), 1);

    let second = body_json(
        post_json(
            app,
            &uri,
            json!({ "annotations": [{ "label": "coral" }], "tags": ["RED", "red "] }),
        )
        .await,
    )
    .await;
    assert_eq!(second["data"]["annotations"].as_array().unwrap().len(), 2);
    assert_eq!(second["data"]["tags"], json!(["red"]));
    // The feed's observed-tag set also carries it.
    assert_eq!(second["data"]["feed"]["available_tags"], json!(["red"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn frame_detail_and_image_round_out_the_view(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 1).await;
    let app = build_test_app(pool);

    let body = body_json(get(app.clone(), &format!("/api/v1/frames/{}", frames[0].id)).await).await;
    assert_eq!(body["data"]["id"], frames[0].id);
    assert_eq!(body["data"]["media_type"], "image/jpeg");
    // Never offered to anyone yet.
    assert!(body["data"]["accessed"].is_null());

    let response = get(app.clone(), &format!("/api/v1/frames/{}/image", frames[0].id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/jpeg"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);

    assert_not_found(get(app, "/api/v1/frames/424242/image").await).await;
}
