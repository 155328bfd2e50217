use std::path::PathBuf;
use thiserror::Error;

/// Main error type for semrank
#[derive(Error, Debug)]
pub enum SemrankError {
    /// A chunking or re-ranking parameter is outside its documented range
    #[error("Invalid input for {parameter}: {message}")]
    InvalidInput { parameter: String, message: String },

    /// A candidate has neither a `date` nor a `timestamp` metadata field
    #[error("Candidate {id} has no date or timestamp metadata")]
    MissingMetadata { id: String },

    /// A candidate's date/timestamp value is not numeric
    #[error("Candidate {id} has a non-numeric date value: {value}")]
    ParseFailure { id: String, value: String },

    /// Document file not found
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SemrankError {
    pub fn invalid_input(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for semrank operations
pub type Result<T> = std::result::Result<T, SemrankError>;
