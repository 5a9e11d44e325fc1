// src/utils/error.rs
use thiserror::Error;

// Extraction itself never fails; these cover the host side of the tool.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 401 Unauthorized, 429 Too Many Requests

    #[error("API key not set")]
    MissingApiKey,

    #[error("No response from AI provider")]
    EmptyResponse,

    #[error("Failed to parse AI response: {0}")]
    Parse(String),

    #[error("AI request timed out after {0} seconds")]
    Timeout(u64),

    #[error("AI request cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid document id: {0:?}")]
    InvalidDocumentId(String),

    #[error("Timed out waiting for the lock on {0}")]
    Locked(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("AI generation failed: {0}")]
    Ai(#[from] AiError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
