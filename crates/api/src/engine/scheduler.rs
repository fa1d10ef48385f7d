//! Lease-based frame assignment.
//!
//! A frame is *eligible* for assignment when it has no annotations and its
//! lease has lapsed (never offered, or last offered more than the TTL
//! ago). [`FrameScheduler::next_frame`] picks the next eligible frame and
//! stamps its lease; [`FrameScheduler::annotate`] commits annotation
//! records, which removes the frame from the eligible set for good.
//!
//! Both operations run their read-decide-write sequence while holding a
//! single process-wide async lock, so two concurrent `next_frame` calls
//! can never observe the same candidate before either has stamped it.
//! Work that does not touch the eligible set (resolving ids, tag
//! get-or-create) happens before the lock is taken.

use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;

use lens_core::types::{DbId, Timestamp};
use lens_db::models::frame::Frame;
use lens_db::repositories::{AnnotationRepo, FeedRepo, FrameRepo, TagRepo};

/// Hands out frames to annotators and commits their work.
///
/// One instance per process. All assignment and annotation writes must go
/// through it; writing to `frames.accessed` or `annotations` behind its
/// back breaks the mutual-exclusion guarantee.
pub struct FrameScheduler {
    pool: PgPool,
    lease_ttl: chrono::Duration,
    /// Serializes every read-decide-write sequence over the eligible set.
    /// Held across the await points inside the critical section, which is
    /// the point: the next caller must see this caller's writes.
    assignment_lock: Mutex<()>,
}

impl FrameScheduler {
    pub fn new(pool: PgPool, lease_ttl: chrono::Duration) -> Self {
        Self {
            pool,
            lease_ttl,
            assignment_lock: Mutex::new(()),
        }
    }

    /// Pick the next frame for an annotator and stamp its lease.
    ///
    /// When `previous` names the frame the annotator just finished
    /// looking at, its lease is refreshed first (whether or not it was
    /// annotated) and the search starts in the same feed at the smallest
    /// sequence number after it, so an annotator walks one feed in order.
    /// If that feed is exhausted, or `previous` is absent or does not
    /// resolve, the search falls back to a global scan in `(feed, seq)`
    /// order.
    ///
    /// Returns `Ok(None)` when no frame is currently eligible.
    pub async fn next_frame(
        &self,
        previous: Option<DbId>,
    ) -> Result<Option<Frame>, sqlx::Error> {
        // Resolve the previous frame before locking; a stale or bogus id
        // just degrades to the global scan.
        let prev = match previous {
            Some(id) => {
                let found = FrameRepo::find_by_id(&self.pool, id).await?;
                if found.is_none() {
                    tracing::debug!(previous_id = id, "Previous frame not found, scanning globally");
                }
                found
            }
            None => None,
        };

        let _guard = self.assignment_lock.lock().await;

        let now = Utc::now();
        let cutoff = self.cutoff(now);

        if let Some(prev) = prev {
            // Refresh the finished frame's lease so nobody else picks it
            // up while its annotations are still in flight.
            FrameRepo::touch(&self.pool, prev.id, now).await?;

            if let Some(frame) =
                FrameRepo::next_eligible_in_feed(&self.pool, prev.feed_id, prev.seq, cutoff).await?
            {
                return self.assign(frame, now).await;
            }
        }

        match FrameRepo::next_eligible_any(&self.pool, cutoff).await? {
            Some(frame) => self.assign(frame, now).await,
            None => Ok(None),
        }
    }

    /// Commit annotations and tags onto a frame.
    ///
    /// Tag records are resolved (get-or-create, lowercase) before the
    /// lock is taken; only the annotation inserts and tag applications,
    /// which change the frame's eligibility, run inside the critical
    /// section. Annotations are append-only: committing twice stacks a
    /// second set of records rather than replacing the first.
    ///
    /// Returns `Ok(None)` when `frame_id` does not resolve.
    pub async fn annotate(
        &self,
        frame_id: DbId,
        annotations: &[serde_json::Value],
        tag_names: &[String],
        author_id: DbId,
    ) -> Result<Option<Frame>, sqlx::Error> {
        let Some(frame) = FrameRepo::find_by_id(&self.pool, frame_id).await? else {
            return Ok(None);
        };

        let mut tags = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let tag = TagRepo::create_or_get(&self.pool, name).await?;
            FeedRepo::observe_tag(&self.pool, frame.feed_id, tag.id).await?;
            tags.push(tag);
        }

        let _guard = self.assignment_lock.lock().await;

        for payload in annotations {
            AnnotationRepo::create(&self.pool, frame.id, author_id, payload).await?;
        }
        for tag in &tags {
            TagRepo::apply_to_frame(&self.pool, frame.id, tag.id).await?;
        }

        tracing::info!(
            frame_id = frame.id,
            annotations = annotations.len(),
            tags = tags.len(),
            "Annotations committed",
        );

        FrameRepo::find_by_id(&self.pool, frame.id).await
    }

    /// Stamp the lease on a chosen frame and hand it out.
    ///
    /// Must be called with the assignment lock held. Returns the row as
    /// updated, so the caller sees the lease it was just given.
    async fn assign(&self, frame: Frame, now: Timestamp) -> Result<Option<Frame>, sqlx::Error> {
        tracing::debug!(frame_id = frame.id, feed_id = frame.feed_id, seq = frame.seq, "Frame assigned");
        FrameRepo::touch(&self.pool, frame.id, now).await
    }

    /// Leases stamped before this instant have lapsed.
    fn cutoff(&self, now: Timestamp) -> Timestamp {
        now - self.lease_ttl
    }
}
