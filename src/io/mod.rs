//! I/O module
//!
//! Handles reading and writing the payment records file.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, formula guard, sorted output)
//! - `file_storage` - File-backed [`Storage`](crate::core::Storage) with atomic replace

pub mod csv_format;
pub mod file_storage;

pub use csv_format::{
    convert_csv_record, escape_formula, read_records_csv, to_csv_record, write_records_csv,
    CsvRecord,
};
pub use file_storage::CsvFileStorage;
