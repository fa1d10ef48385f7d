//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the request payloads that create them

pub mod annotation;
pub mod feed;
pub mod frame;
pub mod recording;
pub mod tag;
pub mod user;
