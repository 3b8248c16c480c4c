//! Centralized error types for gke-release
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for release planning
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Invalid release parameters:\n  {}", .errors.join("\n  "))]
    ValidationFailed { errors: Vec<String> },
}

/// Parameter and credential file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid label '{value}', expected key=value")]
    InvalidLabel { value: String },

    #[error("No credentials file given; pass --credentials or set CREDENTIALS_FILE")]
    CredentialsNotProvided,
}

/// Credential lookup errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential '{name}' not found among {available} supplied credential(s)")]
    NotFound { name: String, available: usize },

    #[error("Credential '{name}' has type '{actual}', expected '{expected}'")]
    WrongType {
        name: String,
        actual: String,
        expected: String,
    },
}
