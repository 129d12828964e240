//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to construct or present the date-selection dialog
    #[error("Failed to present date picker: {0}")]
    DialogPresentation(String),

    /// The capability is not available on this host
    #[error("Date picker not available: {0}")]
    Unavailable(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
