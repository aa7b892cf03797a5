//! Error types for the experience store.

use std::fmt;

/// Errors returned by [`ExperienceStore`](super::ExperienceStore) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Column names supplied do not match the store's schema.
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// Supplied columns have different lengths.
    ColumnLengthMismatch {
        reference: String,
        expected: usize,
        key: String,
        actual: usize,
    },
    /// A single batch is larger than the whole store.
    CapacityExceeded {
        added: usize,
        capacity: usize,
    },
    /// Caller-chosen overwrite positions do not cover the overflow exactly.
    OverwriteCountMismatch {
        expected: usize,
        actual: usize,
    },
    /// Position outside the physical column.
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    /// Column name not in the schema.
    UnknownKey(String),
    /// Store construction parameters are invalid.
    InvalidConfig {
        param: &'static str,
        message: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaMismatch { expected, actual } => {
                write!(f, "Schema mismatch: expected keys {:?}, got {:?}", expected, actual)
            }
            Self::ColumnLengthMismatch {
                reference,
                expected,
                key,
                actual,
            } => write!(
                f,
                "Column length mismatch: '{}' has {} values but '{}' has {}",
                reference, expected, key, actual
            ),
            Self::CapacityExceeded { added, capacity } => write!(
                f,
                "Batch of {} items exceeds store capacity {}",
                added, capacity
            ),
            Self::OverwriteCountMismatch { expected, actual } => write!(
                f,
                "Expected {} overwrite indexes, got {}",
                expected, actual
            ),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds for column of length {}", index, len)
            }
            Self::UnknownKey(key) => write!(f, "Unknown key '{}'", key),
            Self::InvalidConfig { param, message } => {
                write!(f, "Invalid configuration for '{}': {}", param, message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
