//! Error types for dispatch setup.
//!
//! Dispatch itself never fails because a node failed: per-node outcomes
//! live in [`crate::DispatchResult`]. These errors cover configuration
//! that makes a dispatch impossible to start.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that prevent a dispatch from starting.
#[derive(Debug, Error)]
pub enum Error {
    /// There is nothing to dispatch to
    #[error("no valid nodes specified")]
    NoTargets,

    /// The concurrency ceiling is below one
    #[error("invalid concurrency ceiling {0}: must be at least 1")]
    InvalidConcurrency(usize),

    /// The remote-shell template is empty or cannot be parsed
    #[error("invalid remote shell command '{template}': {reason}")]
    InvalidRemoteShell {
        /// The template as configured
        template: String,
        /// Why it could not be used
        reason: String,
    },

    /// The worker pool could not be created
    #[error("failed to create worker pool: {0}")]
    ThreadPool(String),
}
