//! Error types for node-set operations.

use thiserror::Error;

/// Result type alias for node-set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a node directory or resolving a selection.
///
/// All of these are selection errors: they are reported before any task
/// is launched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A selector named a node that is not in the directory
    #[error("unknown node '{name}'")]
    UnknownNode {
        /// The name as given on the command line
        name: String,
    },

    /// A selector named a group that no node belongs to
    #[error("unknown group '{name}'")]
    UnknownGroup {
        /// The name as given on the command line
        name: String,
    },

    /// The same node name was defined twice
    #[error("node '{name}' is defined more than once")]
    DuplicateNode {
        /// The duplicated node name
        name: String,
    },

    /// A node or group name is empty or contains a separator
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Inclusion minus exclusion left nothing to run on
    #[error("no valid nodes specified")]
    NoTargets,
}
