//! Error types for the Cleanflow core library.
//!
//! Construction-time invariant violations are returned as errors immediately.
//! Data-quality findings are never errors: they travel inside
//! [`ValidationStatus`](crate::validate::ValidationStatus).

use std::path::PathBuf;

/// An entity was built without a usable payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEntityError {
    #[error("data cannot be None or null")]
    NullData,

    #[error("entity builder has no payload")]
    MissingData,
}

/// A [`DatasetSchema`](crate::schema::DatasetSchema) was declared with an invalid shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaDefinitionError {
    #[error("columns must not be empty")]
    EmptyColumns,

    #[error("column names must not be blank")]
    BlankColumn,

    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    #[error("target names must not be blank")]
    BlankTarget,

    #[error("description must not be blank when present")]
    BlankDescription,

    #[error("invalid range for column '{column}': low {low} must be finite and <= high {high}")]
    InvalidRange { column: String, low: f64, high: f64 },
}

/// The payload could not be normalized into rows.
///
/// This never escapes validation; it is reported as the single blocking error
/// of the returned status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationExtractionError {
    #[error("payload of kind '{kind}' is not row-shaped")]
    UnsupportedPayload { kind: String },

    #[error("row {row} has {actual} values but {expected} columns are declared")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Failure raised by a staged strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// The input is structurally unusable for inspection.
    #[error("preparation failed: {0}")]
    Preparation(String),

    /// The config is incompatible with the input's current shape.
    #[error("application failed: {0}")]
    Application(String),
}

impl StrategyError {
    pub fn preparation(msg: impl Into<String>) -> Self {
        Self::Preparation(msg.into())
    }

    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }
}

/// Errors from configuration providers.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}
