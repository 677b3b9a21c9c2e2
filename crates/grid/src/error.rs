//! Error types for the grid crate.

use thiserror::Error;

/// Grid error type covering failures reported by grid collaborators.
#[derive(Debug, Error)]
pub enum GridError {
    // Path errors
    /// The path is not a well-formed absolute namespace path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The path does not name an existing collection or data object.
    #[error("path not found: {0}")]
    NotFound(String),

    /// The path lies outside the zone served by this grid.
    #[error("path is outside zone {zone}: {path}")]
    OutsideZone {
        /// The zone served by the grid.
        zone: String,
        /// The rejected path.
        path: String,
    },

    // User errors
    /// The logged-in principal is unknown to the grid.
    #[error("user not found: {0}")]
    UserNotFound(String),

    // Communication errors
    /// The grid could not be reached or answered with an error.
    #[error("grid communication failed: {0}")]
    Communication(String),

    /// IO error raised by a locally backed grid.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    /// Whether this error describes a missing entry rather than a failure
    /// to talk to the grid.
    pub fn is_not_found(&self) -> bool {
        match self {
            GridError::NotFound(_) | GridError::UserNotFound(_) => true,
            GridError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
