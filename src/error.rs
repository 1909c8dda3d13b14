use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Unsupported document type: {0}")]
    #[diagnostic(code(coursecal::unsupported_document))]
    UnsupportedDocument(String),

    #[error("Text extraction error: {0}")]
    #[diagnostic(code(coursecal::text_extraction))]
    TextExtraction(String),

    #[error("Extraction service error: {0}")]
    #[diagnostic(code(coursecal::extraction_service))]
    ExtractionService(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(coursecal::storage))]
    Storage(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(coursecal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(coursecal::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(coursecal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(coursecal::serialization))]
    Serialization(String),
}

// Implement From for JSON serialization errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create extraction service errors
pub fn extraction_service_error(message: &str) -> Error {
    Error::ExtractionService(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create text extraction errors
pub fn text_extraction_error(message: &str) -> Error {
    Error::TextExtraction(message.to_string())
}
