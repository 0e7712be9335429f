//! Shared types for the database crate.

pub mod errors;

pub use errors::StoreError;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
