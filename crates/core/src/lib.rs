//! Shared domain types and helpers for the Lens annotation backend.

pub mod error;
pub mod imagery;
pub mod types;
