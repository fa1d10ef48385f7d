//! Feed/Frame bookkeeping for one ingestion run.

use std::collections::HashMap;
use std::path::Path;

use lens_core::types::DbId;
use lens_db::models::recording::RecordingKind;
use lens_db::repositories::{FeedRepo, FrameRepo};
use sqlx::PgPool;

use crate::bag::BagFrameSource;
use crate::error::IngestError;
use crate::source::FrameSource;
use crate::video::VideoFrameSource;

/// Outcome summary of one ingestion run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub frames_written: u64,
    pub frames_skipped: u64,
    pub feeds: u64,
}

/// Per-feed bookkeeping: the feed row and the next sequence number.
struct FeedState {
    feed_id: DbId,
    next_seq: i32,
}

/// Drain `source`, registering one feed per stream and one frame per
/// extracted image.
///
/// Sequence numbers are assigned per feed in extraction order, continuing
/// from the feed's current maximum (so re-ingesting into an existing feed
/// cannot collide). A frame whose write fails is logged and skipped;
/// ingestion continues with the next frame.
pub async fn ingest<S: FrameSource>(
    pool: &PgPool,
    recording_id: DbId,
    source: &mut S,
) -> Result<IngestReport, IngestError> {
    let mut feeds: HashMap<String, FeedState> = HashMap::new();
    let mut report = IngestReport::default();

    while let Some(extracted) = source.next_frame().await? {
        // Feed lookup-or-create, cached per run like the extractor is
        // likely to interleave streams.
        let state = match feeds.get_mut(&extracted.stream) {
            Some(state) => state,
            None => {
                let feed = FeedRepo::get_or_create(pool, recording_id, &extracted.stream).await?;
                let next_seq = FrameRepo::max_seq(pool, feed.id)
                    .await?
                    .map_or(0, |max| max + 1);
                tracing::info!(
                    recording_id,
                    feed_id = feed.id,
                    stream = %extracted.stream,
                    next_seq,
                    "feed registered for ingestion"
                );
                feeds.entry(extracted.stream.clone()).or_insert(FeedState {
                    feed_id: feed.id,
                    next_seq,
                })
            }
        };

        let seq = state.next_seq;
        match FrameRepo::create(
            pool,
            state.feed_id,
            seq,
            &extracted.data,
            &extracted.media_type,
            extracted.width as i32,
            extracted.height as i32,
        )
        .await
        {
            Ok(_) => {
                state.next_seq += 1;
                report.frames_written += 1;
            }
            Err(e) => {
                // Skip this frame, keep the sequence number unused.
                tracing::warn!(
                    recording_id,
                    feed_id = state.feed_id,
                    seq,
                    error = %e,
                    "failed to write frame, skipping"
                );
                state.next_seq += 1;
                report.frames_skipped += 1;
            }
        }
    }

    report.feeds = feeds.len() as u64;
    Ok(report)
}

/// Open the right frame source for `kind` and run [`ingest`] over it.
///
/// Intended to be spawned as a background task after the upload request
/// has been answered; it keeps running even if the originating connection
/// closes.
pub async fn ingest_file(
    pool: &PgPool,
    recording_id: DbId,
    path: &Path,
    kind: RecordingKind,
) -> Result<IngestReport, IngestError> {
    match kind {
        RecordingKind::Video => {
            let mut source = VideoFrameSource::open(path).await?;
            ingest(pool, recording_id, &mut source).await
        }
        RecordingKind::Bag => {
            let mut source = BagFrameSource::open(path).await?;
            ingest(pool, recording_id, &mut source).await
        }
    }
}
