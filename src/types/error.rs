//! Error types for the payment records store
//!
//! This module defines all error types that can occur while managing payment records.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Input Errors**: A field failed validation, an id is unknown
//! - **Capacity Errors**: The store or the id space is saturated
//! - **Persistence Errors**: The backing file could not be written or read
//! - **Load Diagnostics**: A stored line was malformed and skipped

use super::record::Field;
use thiserror::Error;

/// Main error type for the payment records store
///
/// Every store operation reports failure through this enum; nothing in the
/// library panics or aborts the process. Each variant carries enough context
/// for the CLI to render a useful message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    /// A field failed validation
    ///
    /// Recoverable: the caller re-prompts or drops the single operation.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// The offending field
        field: Field,
        /// Why the value was rejected
        reason: String,
    },

    /// No record with the given id
    #[error("Payment {id} not found")]
    NotFound {
        /// The id that was looked up
        id: String,
    },

    /// The store already holds `capacity` records
    ///
    /// Recoverable only by deleting existing records.
    #[error("Store is full ({capacity} records)")]
    StoreFull {
        /// Configured capacity of the store
        capacity: usize,
    },

    /// Every id suffix in `1..=capacity` is taken
    ///
    /// Can happen below the record count limit when ids sit outside the
    /// allocatable range.
    #[error("No free payment id left (P001-P{capacity:03} all in use)")]
    CapacityExhausted {
        /// Highest allocatable suffix
        capacity: usize,
    },

    /// Writing the backing file failed
    ///
    /// The in-memory change is kept but is not durable until the next
    /// successful save.
    #[error("Failed to persist {path}: {message}")]
    PersistenceError {
        /// Target path of the save
        path: String,
        /// Description of the failure
        message: String,
    },

    /// A stored line could not be turned into a record
    ///
    /// Load-time diagnostic; the line is dropped and loading continues.
    #[error("Malformed record{}: {reason}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedRecord {
        /// Line number in the file (if available)
        line: Option<u64>,
        /// What was wrong with the line
        reason: String,
    },

    /// I/O error occurred while reading the backing file
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },
}

// Conversion from io::Error to PaymentError
impl From<std::io::Error> for PaymentError {
    fn from(error: std::io::Error) -> Self {
        PaymentError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to PaymentError
impl From<csv::Error> for PaymentError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        PaymentError::MalformedRecord {
            line,
            reason: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl PaymentError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: Field, reason: impl Into<String>) -> Self {
        PaymentError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(id: &str) -> Self {
        PaymentError::NotFound { id: id.to_string() }
    }

    /// Create a StoreFull error
    pub fn store_full(capacity: usize) -> Self {
        PaymentError::StoreFull { capacity }
    }

    /// Create a CapacityExhausted error
    pub fn capacity_exhausted(capacity: usize) -> Self {
        PaymentError::CapacityExhausted { capacity }
    }

    /// Create a PersistenceError
    pub fn persistence(path: &std::path::Path, message: impl std::fmt::Display) -> Self {
        PaymentError::PersistenceError {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a MalformedRecord error
    pub fn malformed(line: Option<u64>, reason: impl Into<String>) -> Self {
        PaymentError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}
