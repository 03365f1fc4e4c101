//! Error types for the cartag tagging and review pipeline.
//!
//! Errors are organized by stage so that a failed sample can be logged with
//! the image path or record line it came from, then skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for cartag operations.
#[derive(Error, Debug)]
pub enum CartagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tagging or review pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The classifier could not score an image
    #[error("Classification failed for {path}: {message}")]
    Classify { path: PathBuf, message: String },

    /// Classifier setup failed (bad embedding shape, missing model data)
    #[error("Model error: {message}")]
    Model { message: String },

    /// A category produced no candidate probabilities
    #[error("Empty probability distribution for category '{category}'")]
    EmptyDistribution { category: String },

    /// The classifier returned a different number of scores than prompts
    #[error("Category '{category}' has {expected} prompts but {actual} probabilities")]
    PromptMismatch {
        category: String,
        expected: usize,
        actual: usize,
    },

    /// A persisted sample record could not be decoded
    #[error("Invalid sample record at line {line}: {message}")]
    Record { line: usize, message: String },

    /// Reading or writing a sample file failed
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Convenience type alias for cartag results.
pub type Result<T> = std::result::Result<T, CartagError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mismatch_message() {
        let err = PipelineError::PromptMismatch {
            category: "angles".to_string(),
            expected: 24,
            actual: 23,
        };
        let msg = err.to_string();
        assert!(msg.contains("angles"));
        assert!(msg.contains("24 prompts"));
        assert!(msg.contains("23 probabilities"));
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: CartagError = PipelineError::EmptyDistribution {
            category: "brands".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Pipeline error:"));
    }
}
