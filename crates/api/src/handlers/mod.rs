pub mod frames;
pub mod recordings;
pub mod search;
