//! File-backed storage with atomic replace
//!
//! Records live in a single CSV file. Saving writes the complete snapshot to a
//! `<file>.tmp` sibling, syncs it, then renames it over the target in one
//! step, so the target is always either the previous or the new contents.
//!
//! # Error Handling
//!
//! - A missing file loads as an empty store
//! - Any other failure to open the file is returned as `IoError`
//! - Malformed lines are reported through the load report, not as errors
//! - A failed save leaves the target untouched and returns `PersistenceError`

use crate::core::traits::Storage;
use crate::io::csv_format::{read_records_csv, write_records_csv};
use crate::types::{LoadReport, PaymentError, PaymentRecord};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CSV file holding the payment records
#[derive(Debug, Clone)]
pub struct CsvFileStorage {
    path: PathBuf,
}

impl CsvFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used while saving
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_temp(&self, temp_path: &Path, records: &[PaymentRecord]) -> Result<(), String> {
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }

        let file = File::create(temp_path)
            .map_err(|e| format!("Failed to create '{}': {}", temp_path.display(), e))?;

        let mut writer = BufWriter::new(&file);
        write_records_csv(records, &mut writer)?;
        writer
            .flush()
            .map_err(|e| format!("Failed to write '{}': {}", temp_path.display(), e))?;
        drop(writer);

        file.sync_all()
            .map_err(|e| format!("Failed to sync '{}': {}", temp_path.display(), e))
    }
}

impl Storage for CsvFileStorage {
    fn load(&self, capacity: usize) -> Result<LoadReport, PaymentError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "File {} not found. It will be created on first save.",
                    self.path.display()
                );
                return Ok(LoadReport::default());
            }
            Err(e) => {
                return Err(PaymentError::IoError {
                    message: format!("Failed to open file '{}': {}", self.path.display(), e),
                })
            }
        };

        Ok(read_records_csv(BufReader::new(file), capacity))
    }

    fn save(&self, records: &[PaymentRecord]) -> Result<(), PaymentError> {
        let temp_path = self.temp_path();

        if let Err(message) = self.write_temp(&temp_path, records) {
            let _ = fs::remove_file(&temp_path);
            return Err(PaymentError::persistence(&self.path, message));
        }

        // rename replaces an existing target atomically on the same filesystem
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PaymentError::persistence(
                &self.path,
                format!("Failed to replace with '{}': {}", temp_path.display(), e),
            ));
        }

        debug!(
            path = %self.path.display(),
            records = records.len(),
            "Payment records saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn record(id: &str, payer: &str, amount: Decimal) -> PaymentRecord {
        PaymentRecord {
            id: id.to_string(),
            payer: payer.to_string(),
            service_type: "ATM".to_string(),
            amount,
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let storage = CsvFileStorage::new("data/paymentinfo.csv");
        assert_eq!(storage.temp_path(), PathBuf::from("data/paymentinfo.csv.tmp"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = CsvFileStorage::new(dir.path().join("missing.csv"));

        let report = storage.load(100).unwrap();
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn test_save_then_load_round_trip_sorted() {
        let dir = tempdir().unwrap();
        let storage = CsvFileStorage::new(dir.path().join("payments.csv"));
        let records = vec![
            record("P010", "Ten", Decimal::new(1050, 2)),
            record("P002", "Two", Decimal::from(2)),
        ];

        storage.save(&records).unwrap();
        let report = storage.load(100).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(report.records, vec![records[1].clone(), records[0].clone()]);
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payments.csv");
        let storage = CsvFileStorage::new(&path);
        let records = vec![
            record("P003", "C", Decimal::new(333, 2)),
            record("P001", "A", Decimal::from(1)),
        ];

        storage.save(&records).unwrap();
        let first = fs::read(&path).unwrap();
        storage.save(&records).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payments.csv");
        let storage = CsvFileStorage::new(&path);

        storage
            .save(&[record("P001", "A", Decimal::from(1)), record("P002", "B", Decimal::from(2))])
            .unwrap();
        storage.save(&[record("P002", "B", Decimal::from(2))]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "P002,B,ATM,2.00,2024-01-01\n"
        );
    }

    #[test]
    fn test_failed_temp_write_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payments.csv");
        let storage = CsvFileStorage::new(&path);
        storage.save(&[record("P001", "A", Decimal::from(1))]).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the temp write fail
        fs::create_dir(storage.temp_path()).unwrap();
        let result = storage.save(&[record("P002", "B", Decimal::from(2))]);

        assert!(matches!(
            result,
            Err(PaymentError::PersistenceError { .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_save_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("payments.csv");
        let storage = CsvFileStorage::new(&path);

        storage.save(&[record("P001", "A", Decimal::from(1))]).unwrap();
        assert!(path.exists());
    }
}
