//! Video frame extraction via ffmpeg.
//!
//! Dumps every frame of the uploaded file as a JPEG into a temp directory
//! and yields them in playback order. A video has exactly one implicit
//! feed, so every frame reports the same stream name.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::error::ExtractError;
use crate::source::{ExtractedFrame, FrameSource};

/// Stream name for the single implicit feed of a video file.
pub const VIDEO_STREAM: &str = "video";

/// Frame source backed by an ffmpeg full-frame dump.
pub struct VideoFrameSource {
    /// Holds the extracted JPEGs; removed on drop.
    workdir: TempDir,
    remaining: VecDeque<PathBuf>,
}

impl VideoFrameSource {
    /// Extract all frames of `video_path` and prepare to yield them.
    pub async fn open(video_path: &Path) -> Result<Self, ExtractError> {
        if !video_path.exists() {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("video file not found: {}", video_path.display()),
            )));
        }

        let workdir = tempfile::tempdir()?;
        let pattern = workdir.path().join("frame_%06d.jpg");

        let output = tokio::process::Command::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(video_path)
            .args(["-q:v", "2"])
            .arg(&pattern)
            .output()
            .await
            .map_err(ExtractError::FfmpegNotFound)?;

        if !output.status.success() {
            return Err(ExtractError::FfmpegFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(workdir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        // Zero-padded names, so lexicographic order is playback order.
        files.sort();

        tracing::info!(
            video = %video_path.display(),
            frames = files.len(),
            "ffmpeg frame dump complete"
        );

        Ok(Self {
            workdir,
            remaining: files.into(),
        })
    }
}

#[async_trait]
impl FrameSource for VideoFrameSource {
    async fn next_frame(&mut self) -> Result<Option<ExtractedFrame>, ExtractError> {
        while let Some(path) = self.remaining.pop_front() {
            let data = tokio::fs::read(&path).await?;
            match lens_core::imagery::dimensions(&data) {
                Ok((width, height)) => {
                    return Ok(Some(ExtractedFrame {
                        stream: VIDEO_STREAM.to_string(),
                        data,
                        media_type: "image/jpeg".to_string(),
                        width,
                        height,
                    }));
                }
                Err(e) => {
                    // A frame ffmpeg wrote but we cannot read: skip it.
                    tracing::warn!(
                        frame = %path.display(),
                        workdir = %self.workdir.path().display(),
                        error = %e,
                        "skipping unreadable extracted frame"
                    );
                }
            }
        }
        Ok(None)
    }
}
