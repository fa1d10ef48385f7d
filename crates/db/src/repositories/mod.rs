//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod annotation_repo;
pub mod feed_repo;
pub mod frame_repo;
pub mod recording_repo;
pub mod tag_repo;
pub mod user_repo;

pub use annotation_repo::AnnotationRepo;
pub use feed_repo::FeedRepo;
pub use frame_repo::FrameRepo;
pub use recording_repo::RecordingRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
