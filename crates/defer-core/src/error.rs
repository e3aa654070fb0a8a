//! Core error types for defer-core.
//!
//! The interaction state machine itself never fails; errors only exist at
//! the edges where text comes in (configuration files, simulation scripts).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for defer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Simulation script errors
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No home directory to put the configuration in
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Errors in a simulation step list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown step '{0}' (expected click, touch, scroll, wait:MS, navigate, paint or render)")]
    UnknownStep(String),

    #[error("Invalid duration in '{step}': {message}")]
    InvalidDuration { step: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
