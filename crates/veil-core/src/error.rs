//! Secure input error types

use thiserror::Error;

/// Failures raised at the secure input boundary.
///
/// Both variants are loud on purpose: callers propagate them to the host
/// instead of degrading the access-control boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecureInputError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Something tried to observe or reconfigure a secure field it has no right to.
    #[error("access denied: {0}")]
    AccessDenied(String),
}

/// Result type for secure input operations
pub type Result<T> = std::result::Result<T, SecureInputError>;
