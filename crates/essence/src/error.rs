//! Error types for Essence

use thiserror::Error;

/// Main error type for Essence operations
#[derive(Error, Debug)]
pub enum EssenceError {
    /// Storage-related errors (file system, key encoding, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

/// Result type alias for Essence operations
pub type Result<T> = std::result::Result<T, EssenceError>;
