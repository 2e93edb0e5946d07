//! Payment Records Library
//! # Overview
//!
//! This library keeps a bounded set of payment records in memory and persists
//! them to a CSV file after every change.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (PaymentRecord, ServiceType, errors, etc.)
//! - [`cli`] - CLI arguments parsing, logging setup and the interactive menu
//! - [`core`] - Business logic components:
//!   - [`core::validator`] - Field validation
//!   - [`core::matcher`] - Case-insensitive search and service type resolution
//!   - [`core::id_allocator`] - Lowest-free id allocation and id ordering
//!   - [`core::store`] - The record store
//! - [`io`] - CSV format handling and the file-backed storage
//!
//! # Records
//!
//! Each record holds:
//! - `id`: `P` followed by three digits, unique within the store
//! - `payer`: 1-49 characters
//! - `service_type`: one of Internet, Cable TV, Mobile banking, Website, ATM, QR Code
//! - `amount`: between 1 and 10000, kept to two decimal places
//! - `date`: `YYYY-MM-DD`, a real calendar date from 2020 on
//!
//! # Persistence
//!
//! The file is rewritten in full after every successful add, update or delete.
//! Records are written sorted by id, text fields are guarded against
//! spreadsheet formula injection, and the file is replaced atomically.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{PaymentStore, Storage, StoreConfig};
pub use io::CsvFileStorage;
pub use types::{
    LoadReport, NewPayment, PaymentError, PaymentRecord, PaymentUpdate, ServiceType,
};
