use std::path::PathBuf;

use thiserror::Error;

/// Main error type for synbench
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing dependency: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Experiment and method configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown study: {study}")]
    UnknownStudy { study: String },

    #[error("Unknown method identifier: {method}")]
    UnknownMethod { method: String },

    #[error("Method requested more than once: {method}")]
    DuplicateMethod { method: String },

    #[error("Method {method} needs external-process paths but none are configured")]
    MissingExternalPaths { method: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Optional collaborators that a requested method needs but that are absent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Capability '{capability}' is not available but method '{method}' requires it")]
    Missing { capability: String, method: String },
}

impl BenchError {
    /// Whether this error is a configuration error (unknown study, method, ...).
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this error reports a missing optional dependency.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

/// Result type alias for synbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::BenchError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::BenchError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::BenchError::Config($crate::ConfigError::Invalid {
            message: format!($($arg)*),
        })
    };
}
