//! Error handling
//!
//! Defines error types and handling for the storage layer and its tools.

pub mod handlers;
pub mod types;

pub use types::*;
