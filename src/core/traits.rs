//! Core traits for record persistence
//!
//! The store talks to its backing file through the [`Storage`] trait, so
//! tests can inject backends that fail on demand.

use crate::types::{LoadReport, PaymentError, PaymentRecord};

/// Durable home of the payment records
///
/// Implementations never keep their own copy of the records: `save` receives
/// a read-only snapshot and `load` returns a freshly parsed collection.
pub trait Storage {
    /// Read every stored record, accepting at most `capacity` of them
    ///
    /// Missing storage is an empty load, not an error.
    fn load(&self, capacity: usize) -> Result<LoadReport, PaymentError>;

    /// Replace the stored records with `records`
    ///
    /// Either the whole snapshot becomes visible or the previous contents
    /// stay untouched.
    fn save(&self, records: &[PaymentRecord]) -> Result<(), PaymentError>;
}
