//! Shared seeding helpers for database integration tests.

use chrono::Utc;
use lens_core::types::DbId;
use lens_db::models::feed::Feed;
use lens_db::models::frame::Frame;
use lens_db::models::recording::{CreateRecording, Recording, RecordingKind};
use lens_db::repositories::{FeedRepo, FrameRepo, RecordingRepo};
use sqlx::PgPool;

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
