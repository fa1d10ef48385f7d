//! Ingestion pipeline: turns uploaded recordings into feeds and frames.
//!
//! Frame extraction itself is delegated to the source collaborators
//! ([`video::VideoFrameSource`] for video files, [`bag::BagFrameSource`]
//! for rosbags) behind the [`source::FrameSource`] trait; this crate's own
//! responsibility is the Feed/Frame bookkeeping and sequence-number
//! assignment in [`ingest`].

pub mod bag;
pub mod error;
pub mod ingest;
pub mod source;
pub mod video;

pub use error::{ExtractError, IngestError};
pub use ingest::{ingest, ingest_file, IngestReport};
pub use source::{ExtractedFrame, FrameSource};
