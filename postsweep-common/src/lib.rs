//! Types shared by every Postsweep crate.
//!
//! This crate carries the error taxonomy a run can fail with and the logging
//! initialiser used by the binary and by integration tests. It stays small so the
//! client, storage, and app crates can all depend on it.
//!
//! # Overview
//!
//! - [`SweepError`] and [`Result`]: the failure modes of a run
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use postsweep_common::SweepError;
//!
//! let err = SweepError::Authentication("Invalid OAuth access token.".into());
//! assert!(err.is_authentication());
//! assert_eq!(err.to_string(), "Authentication error: Invalid OAuth access token.");
//! ```

pub mod observability;

/// Failure modes of a single run.
///
/// None of these are retried locally; they surface to the actor lifecycle,
/// which logs them and turns them into a non-zero exit status.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    /// The search API rejected the access token.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The search call failed: network, non-success status, quota, or a
    /// response that does not have the expected shape.
    #[error("Request error: {0}")]
    Request(String),

    /// The actor input could not be decoded.
    #[error("Input error: {0}")]
    Input(String),

    /// Reading the input store or writing the dataset failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was interrupted before it finished.
    #[error("Run cancelled")]
    Cancelled,
}

impl SweepError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, SweepError::Authentication(_))
    }
}

/// Convenient alias for results that use [`SweepError`].
pub type Result<T> = std::result::Result<T, SweepError>;
