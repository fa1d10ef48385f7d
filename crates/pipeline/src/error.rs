//! Error types for extraction and ingestion.

/// Fatal extraction failures.
///
/// Per-frame decode problems are not errors at this level: sources log and
/// skip those internally. An `ExtractError` means the source as a whole
/// cannot continue.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffmpeg binary not found: {0}")]
    FfmpegNotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    FfmpegFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("malformed bag file: {0}")]
    MalformedBag(String),
}

/// Failures that abort an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
