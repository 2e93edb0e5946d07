//! Payment record store
//!
//! This module provides the PaymentStore that owns the in-memory collection of
//! payment records and keeps its backing storage in step with it.
//!
//! The store enforces:
//! - Bounded capacity (configurable, 100 by default)
//! - Unique ids, allocated by the store and never supplied by callers
//! - Field validation on every add and update
//! - A storage write after every successful mutation

use crate::core::id_allocator::{next_id, MAX_ID_SUFFIX};
use crate::core::matcher::{contains_ignore_case, resolve_service, ServiceMatch};
use crate::core::traits::Storage;
use crate::core::validator::{parse_date, validate_amount, validate_payer};
use crate::types::{
    Field, LoadReport, NewPayment, PaymentError, PaymentRecord, PaymentUpdate, ServiceType,
    MAX_PAYER_LEN,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default number of records a store can hold
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest capacity the three digit id space supports
pub const MAX_CAPACITY: usize = MAX_ID_SUFFIX;

/// Default backing file name
pub const DEFAULT_FILE: &str = "paymentinfo.csv";

/// Configuration for a file-backed store
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Path of the CSV file holding the records
    pub path: PathBuf,
    /// Maximum number of records
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Create a new StoreConfig with custom values
    ///
    /// A capacity of zero, or one beyond what three digit ids can address,
    /// falls back to the default with a warning.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let capacity = if capacity == 0 || capacity > MAX_CAPACITY {
            warn!(
                "Invalid capacity ({}), using default ({})",
                capacity, DEFAULT_CAPACITY
            );
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        Self {
            path: path.into(),
            capacity,
        }
    }
}

/// In-memory payment records backed by a [`Storage`]
///
/// Records keep insertion order; storage sorts its own snapshot when saving.
/// If a save fails the in-memory change is kept and the store is marked
/// dirty until a later save succeeds.
pub struct PaymentStore<S: Storage> {
    records: Vec<PaymentRecord>,
    capacity: usize,
    storage: S,
    dirty: bool,
}

impl<S: Storage> PaymentStore<S> {
    /// Create an empty store without touching storage
    ///
    /// A capacity above [`MAX_CAPACITY`] is lowered to it, since ids past
    /// `P999` cannot be represented.
    pub fn new(storage: S, capacity: usize) -> Self {
        PaymentStore {
            records: Vec::new(),
            capacity: bounded_capacity(capacity),
            storage,
            dirty: false,
        }
    }

    /// Create a store from whatever `storage` currently holds
    ///
    /// The returned report carries the load diagnostics; its `records` have
    /// been moved into the store.
    ///
    /// # Errors
    ///
    /// Returns an error if existing storage cannot be read at all. Malformed
    /// lines are not errors; they show up in the report.
    pub fn open(storage: S, capacity: usize) -> Result<(Self, LoadReport), PaymentError> {
        let capacity = bounded_capacity(capacity);
        let mut report = storage.load(capacity)?;
        let mut store = Self::new(storage, capacity);

        store.records = std::mem::take(&mut report.records);
        if store.records.len() > capacity {
            report.ignored += store.records.len() - capacity;
            store.records.truncate(capacity);
        }

        info!(
            loaded = store.records.len(),
            skipped = report.skipped.len(),
            ignored = report.ignored,
            "Payment records loaded"
        );
        Ok((store, report))
    }

    /// Add a new payment and return its allocated id
    ///
    /// The service text is resolved against the catalog: an exact name or a
    /// fragment matching a single entry is accepted, anything else is
    /// rejected. The amount is stored rounded to two decimal places.
    ///
    /// # Errors
    ///
    /// - `StoreFull` if the store is at capacity
    /// - `InvalidInput` if any field fails validation
    /// - `CapacityExhausted` if no id suffix is free
    /// - `PersistenceError` if the record was added but could not be saved
    pub fn add(&mut self, payment: NewPayment) -> Result<String, PaymentError> {
        if self.is_full() {
            return Err(PaymentError::store_full(self.capacity));
        }

        let payer = checked_payer(&payment.payer)?;
        let service = checked_service(&payment.service)?;
        let amount = checked_amount(payment.amount)?;
        let date = checked_date(&payment.date)?;

        let id = next_id(self.records.iter().map(|r| r.id.as_str()), self.capacity)?;
        self.records.push(PaymentRecord {
            id: id.clone(),
            payer,
            service_type: service.name().to_string(),
            amount,
            date,
        });
        debug!(id = %id, "Payment added");

        self.persist()?;
        Ok(id)
    }

    /// Look up a payment by id, ignoring case
    pub fn find_by_id(&self, id: &str) -> Result<&PaymentRecord, PaymentError> {
        self.position(id)
            .map(|i| &self.records[i])
            .ok_or_else(|| PaymentError::not_found(id))
    }

    /// All payments whose payer name contains `keyword`, in store order
    ///
    /// An empty keyword returns every record.
    pub fn search_by_name(&self, keyword: &str) -> Vec<&PaymentRecord> {
        let keyword = keyword.trim();
        self.records
            .iter()
            .filter(|record| contains_ignore_case(&record.payer, keyword))
            .collect()
    }

    /// Apply field changes to an existing payment
    ///
    /// Every supplied change is validated before any of them is applied, so a
    /// rejected update leaves the record untouched. An update with no changes
    /// succeeds without writing to storage.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `InvalidInput` if a supplied change fails validation
    /// - `PersistenceError` if the change was applied but could not be saved
    pub fn update(&mut self, id: &str, changes: PaymentUpdate) -> Result<(), PaymentError> {
        let index = self.position(id).ok_or_else(|| PaymentError::not_found(id))?;
        if changes.is_empty() {
            return Ok(());
        }

        let payer = changes.payer.as_deref().map(checked_payer).transpose()?;
        let service = changes.service.as_deref().map(checked_service).transpose()?;
        let amount = changes.amount.map(checked_amount).transpose()?;
        let date = changes.date.as_deref().map(checked_date).transpose()?;

        let record = &mut self.records[index];
        if let Some(payer) = payer {
            record.payer = payer;
        }
        if let Some(service) = service {
            record.service_type = service.name().to_string();
        }
        if let Some(amount) = amount {
            record.amount = amount;
        }
        if let Some(date) = date {
            record.date = date;
        }
        debug!(id = %record.id, "Payment updated");

        self.persist()
    }

    /// Remove a payment, keeping the remaining records in order
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `PersistenceError` if the record was removed but the removal could not be saved
    pub fn delete(&mut self, id: &str) -> Result<PaymentRecord, PaymentError> {
        let index = self.position(id).ok_or_else(|| PaymentError::not_found(id))?;
        let removed = self.records.remove(index);
        debug!(id = %removed.id, "Payment deleted");

        self.persist()?;
        Ok(removed)
    }

    /// Every record in store order
    pub fn list(&self) -> &[PaymentRecord] {
        &self.records
    }

    /// Retry saving after an earlier persistence failure
    pub fn sync(&mut self) -> Result<(), PaymentError> {
        self.persist()
    }

    /// True when memory holds changes the last save did not capture
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    fn position(&self, id: &str) -> Option<usize> {
        let id = id.trim();
        self.records
            .iter()
            .position(|record| record.id.eq_ignore_ascii_case(id))
    }

    fn persist(&mut self) -> Result<(), PaymentError> {
        match self.storage.save(&self.records) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                warn!("Change kept in memory but not saved: {}", e);
                Err(e)
            }
        }
    }
}

fn bounded_capacity(capacity: usize) -> usize {
    if capacity > MAX_CAPACITY {
        warn!(
            "Capacity {} exceeds the id space, limiting to {}",
            capacity, MAX_CAPACITY
        );
        MAX_CAPACITY
    } else {
        capacity
    }
}

fn checked_payer(payer: &str) -> Result<String, PaymentError> {
    if validate_payer(payer) {
        Ok(payer.trim().to_string())
    } else {
        Err(PaymentError::invalid_input(
            Field::Payer,
            format!("must be 1-{} characters on a single line", MAX_PAYER_LEN),
        ))
    }
}

fn checked_service(input: &str) -> Result<ServiceType, PaymentError> {
    if let Ok(service) = input.parse::<ServiceType>() {
        return Ok(service);
    }
    match resolve_service(input) {
        ServiceMatch::Unique(service) => Ok(service),
        ServiceMatch::NoMatch => Err(PaymentError::invalid_input(
            Field::ServiceType,
            format!("'{}' matches no service type", input.trim()),
        )),
        ServiceMatch::Ambiguous(candidates) => Err(PaymentError::invalid_input(
            Field::ServiceType,
            format!(
                "'{}' matches {} service types",
                input.trim(),
                candidates.len()
            ),
        )),
    }
}

fn checked_amount(amount: Decimal) -> Result<Decimal, PaymentError> {
    if validate_amount(amount) {
        Ok(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    } else {
        Err(PaymentError::invalid_input(
            Field::Amount,
            "must be between 1 and 10000",
        ))
    }
}

fn checked_date(date: &str) -> Result<String, PaymentError> {
    parse_date(date)
        .map(|(year, month, day)| format!("{:04}-{:02}-{:02}", year, month, day))
        .ok_or_else(|| {
            PaymentError::invalid_input(
                Field::Date,
                format!("'{}' is not a valid YYYY-MM-DD date from 2020 on", date.trim()),
            )
        })
}
