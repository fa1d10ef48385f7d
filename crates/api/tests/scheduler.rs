//! Engine-level tests for the frame scheduler: mutual exclusion under
//! concurrency and the lease lifecycle.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use lens_api::engine::scheduler::FrameScheduler;
use lens_db::repositories::{FrameRepo, UserRepo};

use common::{seed_single_feed, test_config};

fn scheduler(pool: &PgPool) -> FrameScheduler {
    FrameScheduler::new(pool.clone(), test_config().lease_ttl())
}

/// N concurrent callers over M eligible frames receive min(N, M) distinct
/// frames; nobody receives the same frame as anyone else.
#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_callers_never_share_a_frame(pool: PgPool) {
    seed_single_feed(&pool, 3).await;
    let scheduler = Arc::new(scheduler(&pool));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let scheduler = Arc::clone(&scheduler);
        handles.push(tokio::spawn(
            async move { scheduler.next_frame(None).await },
        ));
    }

    let mut assigned = HashSet::new();
    let mut empty = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            Some(frame) => {
                assert!(assigned.insert(frame.id), "frame {} assigned twice", frame.id);
            }
            None => empty += 1,
        }
    }

    assert_eq!(assigned.len(), 3);
    assert_eq!(empty, 5);
}

/// An assigned frame returns to the eligible pool once its lease lapses.
#[sqlx::test(migrations = "../db/migrations")]
async fn lapsed_lease_reopens_a_frame(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 1).await;
    let scheduler = scheduler(&pool);

    let first = scheduler.next_frame(None).await.unwrap().unwrap();
    assert_eq!(first.id, frames[0].id);

    // Still leased: nothing to hand out.
    assert!(scheduler.next_frame(None).await.unwrap().is_none());

    // Backdate the lease past the TTL, as if the annotator walked away.
    FrameRepo::touch(&pool, frames[0].id, Utc::now() - Duration::minutes(11))
        .await
        .unwrap();

    let again = scheduler.next_frame(None).await.unwrap().unwrap();
    assert_eq!(again.id, frames[0].id);
}

/// Passing `previous` refreshes that frame's lease even when its own
/// lease had already lapsed, keeping it out of rotation while the
/// annotator's work on it is still in flight.
#[sqlx::test(migrations = "../db/migrations")]
async fn previous_frame_lease_is_refreshed(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 2).await;
    let scheduler = scheduler(&pool);

    let first = scheduler.next_frame(None).await.unwrap().unwrap();
    FrameRepo::touch(&pool, first.id, Utc::now() - Duration::minutes(11))
        .await
        .unwrap();

    let second = scheduler.next_frame(Some(first.id)).await.unwrap().unwrap();
    assert_eq!(second.id, frames[1].id);

    // Both frames hold fresh leases now.
    assert!(scheduler.next_frame(None).await.unwrap().is_none());
}

/// Annotated frames never come back, lease or no lease.
#[sqlx::test(migrations = "../db/migrations")]
async fn annotated_frame_is_gone_for_good(pool: PgPool) {
    let (_, frames) = seed_single_feed(&pool, 1).await;
    // Zero TTL: every unannotated frame is always eligible.
    let scheduler = FrameScheduler::new(pool.clone(), Duration::zero());

    assert!(scheduler.next_frame(None).await.unwrap().is_some());

    let author = UserRepo::get_or_create(&pool, "robotics").await.unwrap();
    let annotated = scheduler
        .annotate(frames[0].id, &[json!({ "label": "rock" })], &[], author.id)
        .await
        .unwrap();
    assert!(annotated.is_some());

    assert!(scheduler.next_frame(None).await.unwrap().is_none());
}
