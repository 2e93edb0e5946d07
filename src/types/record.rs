//! Payment record types
//!
//! This module defines the stored payment record, the fixed catalog of
//! service types, and the inputs accepted by the store's add and update
//! operations.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every payment id
pub const ID_PREFIX: char = 'P';

/// Longest payer name accepted
pub const MAX_PAYER_LEN: usize = 49;

/// Record fields, used to tag validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Payer,
    ServiceType,
    Amount,
    Date,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Id => "payment id",
            Field::Payer => "payer name",
            Field::ServiceType => "service type",
            Field::Amount => "amount",
            Field::Date => "payment date",
        };
        f.write_str(name)
    }
}

/// Service types a payment can be made for
///
/// The declaration order is the catalog order: matching and menu listings
/// always present candidates in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    Internet,
    CableTv,
    MobileBanking,
    Website,
    Atm,
    QrCode,
}

impl ServiceType {
    /// The full catalog in display order
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Internet,
        ServiceType::CableTv,
        ServiceType::MobileBanking,
        ServiceType::Website,
        ServiceType::Atm,
        ServiceType::QrCode,
    ];

    /// Canonical name, as stored in records and on disk
    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Internet => "Internet",
            ServiceType::CableTv => "Cable TV",
            ServiceType::MobileBanking => "Mobile banking",
            ServiceType::Website => "Website",
            ServiceType::Atm => "ATM",
            ServiceType::QrCode => "QR Code",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    /// Exact, case-insensitive catalog membership
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ServiceType::ALL
            .into_iter()
            .find(|service| service.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown service type: '{}'", s))
    }
}

/// A stored payment
///
/// `service_type` holds the canonical catalog name for records created
/// through the store. Records loaded from disk keep whatever text the file
/// held, so it stays a plain string.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    /// `P` followed by three digits, assigned by the id allocator
    pub id: String,

    /// Name of the payer (1 to 49 characters)
    pub payer: String,

    /// Canonical service type name
    pub service_type: String,

    /// Amount paid, two decimal places
    pub amount: Decimal,

    /// Payment date as `YYYY-MM-DD`
    pub date: String,
}

/// Input for [`crate::core::PaymentStore::add`]
///
/// `service` is raw user text; the store resolves it against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub payer: String,
    pub service: String,
    pub amount: Decimal,
    pub date: String,
}

impl NewPayment {
    pub fn new(
        payer: impl Into<String>,
        service: impl Into<String>,
        amount: Decimal,
        date: impl Into<String>,
    ) -> Self {
        Self {
            payer: payer.into(),
            service: service.into(),
            amount,
            date: date.into(),
        }
    }
}

/// Field changes for [`crate::core::PaymentStore::update`]
///
/// `None` leaves the field untouched. The id is not part of the update and
/// can never change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentUpdate {
    pub payer: Option<String>,
    pub service: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<String>,
}

impl PaymentUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.payer.is_none() && self.service.is_none() && self.amount.is_none() && self.date.is_none()
    }
}

/// Result of loading records from storage
///
/// Load never fails on bad lines: they are dropped and reported here so the
/// caller can surface them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Records accepted, in file order
    pub records: Vec<PaymentRecord>,

    /// One `MalformedRecord` diagnostic per skipped line
    pub skipped: Vec<super::PaymentError>,

    /// Well-formed lines ignored because the store was already full
    pub ignored: usize,
}
