/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Default lease staleness window for frame assignment, in seconds.
///
/// A frame offered to an annotator stays out of the candidate pool for
/// this long; if no annotation is committed within the window the frame
/// becomes assignable again. Overridable via `LEASE_TTL_SECS`.
pub const DEFAULT_LEASE_TTL_SECS: u64 = 600;
