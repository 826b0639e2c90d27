//! Error types for drive-qa

use thiserror::Error;

/// Result type alias for drive-qa operations
pub type Result<T> = std::result::Result<T, Error>;

/// drive-qa errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential load, refresh or authorization failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote storage call failed
    #[error("Drive error: {0}")]
    Drive(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// MIME type outside the supported set
    #[error("Unsupported MIME type: {0}")]
    UnsupportedMimeType(String),

    /// Question-answering capability failed
    #[error("QA error: {0}")]
    Qa(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a drive error
    pub fn drive(message: impl Into<String>) -> Self {
        Self::Drive(message.into())
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a QA error
    pub fn qa(message: impl Into<String>) -> Self {
        Self::Qa(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
