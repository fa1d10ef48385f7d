//! Integration tests for tag resolution and frame-tag associations.

mod common;

use lens_db::repositories::TagRepo;
use sqlx::PgPool;

/// Creating the same tag twice yields the same row.
#[sqlx::test]
async fn create_or_get_is_idempotent(pool: PgPool) {
    let first = TagRepo::create_or_get(&pool, "buoy").await.unwrap();
    let second = TagRepo::create_or_get(&pool, "buoy").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "buoy");
}

/// Case variants fold to the same lowercase tag.
#[sqlx::test]
async fn create_or_get_folds_case(pool: PgPool) {
    let lower = TagRepo::create_or_get(&pool, "red").await.unwrap();
    let upper = TagRepo::create_or_get(&pool, "  RED ").await.unwrap();

    assert_eq!(lower.id, upper.id);
    assert_eq!(upper.name, "red");
}

/// `find_by_name` resolves any casing but never creates.
#[sqlx::test]
async fn find_by_name_does_not_create(pool: PgPool) {
    assert!(TagRepo::find_by_name(&pool, "gate").await.unwrap().is_none());

    let created = TagRepo::create_or_get(&pool, "gate").await.unwrap();
    let found = TagRepo::find_by_name(&pool, "GATE").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
}

/// Applying the same tag to a frame twice leaves a single association.
#[sqlx::test]
async fn apply_to_frame_has_set_semantics(pool: PgPool) {
    let recording = common::seed_recording(&pool, "run-1").await;
    let feed = common::seed_feed(&pool, recording.id, "/camera/front").await;
    let frame = common::seed_frame(&pool, feed.id, 0).await;

    let tag = TagRepo::create_or_get(&pool, "buoy").await.unwrap();

    assert!(TagRepo::apply_to_frame(&pool, frame.id, tag.id).await.unwrap());
    assert!(!TagRepo::apply_to_frame(&pool, frame.id, tag.id).await.unwrap());

    let names = TagRepo::frame_tag_names(&pool, frame.id).await.unwrap();
    assert_eq!(names, vec!["buoy"]);
}
