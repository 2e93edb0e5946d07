//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: Payment records, service types and operation inputs
//! - `error`: Error types for the payment store

pub mod error;
pub mod record;

pub use error::PaymentError;
pub use record::{
    Field, LoadReport, NewPayment, PaymentRecord, PaymentUpdate, ServiceType, ID_PREFIX, MAX_PAYER_LEN,
};
