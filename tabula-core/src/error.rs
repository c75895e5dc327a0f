//! Error types for TABULA operations
//!
//! Only programmer errors and configuration failures are surfaced here.
//! Caller-input mistakes and stale pulls are absorbed by the engine.

use thiserror::Error;

/// Schema violations. These indicate a caller bug, not a timing race.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Field count mismatch: schema has {expected} columns, record has {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    #[error("Schema must declare at least one column")]
    EmptySchema,

    #[error("Duplicate column name: {name}")]
    DuplicateColumn { name: String },

    #[error("Invalid progress scale for column {column}: {max} (must be finite and > 0)")]
    InvalidProgressScale { column: String, max: f64 },
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all TABULA errors.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Telemetry error: {reason}")]
    Telemetry { reason: String },
}

/// Result type alias for TABULA operations.
pub type GridResult<T> = Result<T, GridError>;

// =============================================================================
// TESTS
// =============================================================================
