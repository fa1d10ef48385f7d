//! Frame assignment engine.
//!
//! Contains the scheduler that hands out frames to annotators under a
//! lease model and commits annotation writes, serialized behind a single
//! process-wide lock so concurrent callers never receive the same frame.

pub mod scheduler;
