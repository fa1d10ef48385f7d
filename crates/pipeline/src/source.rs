//! The frame-source collaborator trait.

use async_trait::async_trait;

use crate::error::ExtractError;

/// One decoded image pulled out of a recording, ready to persist.
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    /// Logical stream the frame belongs to: a camera topic for bags, the
    /// single implicit `"video"` stream for video files.
    pub stream: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type of `data`.
    pub media_type: String,
    pub width: u32,
    pub height: u32,
}

/// A stream of frames extracted from one uploaded file.
///
/// Implementations yield frames in extraction order, per stream. A frame
/// that fails to decode is logged and skipped inside the source; `Err` is
/// reserved for failures the source cannot recover from (I/O, a missing
/// ffmpeg binary, a truncated container).
#[async_trait]
pub trait FrameSource: Send {
    /// The next frame, or `None` when the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<ExtractedFrame>, ExtractError>;
}
