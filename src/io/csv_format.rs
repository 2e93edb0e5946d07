//! CSV format handling for payment records
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for (de)serialization
//! - Conversion between CSV records and domain records
//! - The spreadsheet formula guard applied to persisted text fields
//! - Sorted output serialization and tolerant input parsing
//!
//! The file has no header; every line is `id,payer,serviceType,amount,date`.
//! All functions work on generic readers and writers for easy testing.

use crate::core::id_allocator::compare_ids;
use crate::core::validator::is_valid_id;
use crate::types::{LoadReport, PaymentError, PaymentRecord, MAX_PAYER_LEN};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::warn;

/// Number of fields on every line
pub const FIELD_COUNT: usize = 5;

const MAX_ID_LEN: usize = 9;
const MAX_SERVICE_LEN: usize = 29;
const MAX_DATE_LEN: usize = 14;

/// Leading characters spreadsheet tools treat as a formula
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Prefix written in front of a value that starts with a formula trigger
const FORMULA_ESCAPE: char = '\'';

/// One line of the records file
///
/// Fields are kept as text; `amount` is formatted or parsed by the
/// conversion functions below.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub id: String,
    pub payer: String,
    pub service_type: String,
    pub amount: String,
    pub date: String,
}

/// Prefix a value that a spreadsheet would evaluate as a formula with `'`
///
/// This only affects what is written; the escape is not undone on load.
pub fn escape_formula(value: &str) -> Cow<'_, str> {
    if value.starts_with(&FORMULA_TRIGGERS[..]) {
        Cow::Owned(format!("{}{}", FORMULA_ESCAPE, value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Convert a PaymentRecord to its persisted form
pub fn to_csv_record(record: &PaymentRecord) -> CsvRecord {
    let amount = record
        .amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    CsvRecord {
        id: record.id.clone(),
        payer: escape_formula(&record.payer).into_owned(),
        service_type: escape_formula(&record.service_type).into_owned(),
        amount: format!("{:.2}", amount),
        date: record.date.clone(),
    }
}

/// Convert a CsvRecord to a PaymentRecord
///
/// This function:
/// - Checks that every field is present and within its length limit; text
///   fields carrying the formula escape may be one character longer
/// - Parses the amount into a Decimal rounded to two places
/// - Rejects ids that are not `P` plus three digits
///
/// # Returns
///
/// Result containing either:
/// - Ok(PaymentRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<PaymentRecord, String> {
    check_length("id", &csv_record.id, MAX_ID_LEN)?;
    check_length("payer", &csv_record.payer, escaped_limit(&csv_record.payer, MAX_PAYER_LEN))?;
    check_length(
        "service type",
        &csv_record.service_type,
        escaped_limit(&csv_record.service_type, MAX_SERVICE_LEN),
    )?;
    check_length("date", &csv_record.date, MAX_DATE_LEN)?;

    let amount = Decimal::from_str(&csv_record.amount)
        .or_else(|_| Decimal::from_scientific(&csv_record.amount))
        .map_err(|_| format!("Invalid amount '{}'", csv_record.amount))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if !is_valid_id(&csv_record.id) {
        return Err(format!("Invalid payment id '{}'", csv_record.id));
    }

    Ok(PaymentRecord {
        id: csv_record.id,
        payer: csv_record.payer,
        service_type: csv_record.service_type,
        amount,
        date: csv_record.date,
    })
}

fn escaped_limit(value: &str, max: usize) -> usize {
    if value.starts_with(FORMULA_ESCAPE) {
        max + 1
    } else {
        max
    }
}

fn check_length(name: &str, value: &str, max: usize) -> Result<(), String> {
    match value.chars().count() {
        0 => Err(format!("Missing {}", name)),
        n if n > max => Err(format!("{} longer than {} characters", name, max)),
        _ => Ok(()),
    }
}

/// Write payment records in CSV format
///
/// Records are written in id order (see [`compare_ids`]) so the output does
/// not depend on insertion order; the caller's slice is left as is. Writing
/// the same records twice produces identical bytes.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_records_csv(records: &[PaymentRecord], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);

    let mut sorted: Vec<&PaymentRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_ids(&a.id, &b.id));

    for record in sorted {
        writer
            .serialize(to_csv_record(record))
            .map_err(|e| format!("Failed to write record {}: {}", record.id, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Read payment records from CSV input
///
/// Bad lines never abort the load: each one is logged, recorded in
/// `skipped` and dropped. Once `capacity` records are accepted, the remaining
/// lines are only counted in `ignored`. Ids repeated (ignoring case) after
/// their first occurrence are skipped.
pub fn read_records_csv<R: Read>(input: R, capacity: usize) -> LoadReport {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut report = LoadReport::default();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let fatal = matches!(&result, Err(e) if e.is_io_error());

        // Past the cap every line only counts, well-formed or not
        if report.records.len() >= capacity && !fatal {
            report.ignored += 1;
            continue;
        }

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let error = PaymentError::from(e);
                warn!("Skipping record: {}", error);
                report.skipped.push(error);
                if fatal {
                    break;
                }
                continue;
            }
        };

        let line = row.position().map(|pos| pos.line());
        let error = match parse_row(&row) {
            Ok(record) if seen.insert(record.id.to_ascii_uppercase()) => {
                report.records.push(record);
                continue;
            }
            Ok(record) => {
                PaymentError::malformed(line, format!("Duplicate payment id '{}'", record.id))
            }
            Err(reason) => PaymentError::malformed(line, reason),
        };
        warn!("Skipping record: {}", error);
        report.skipped.push(error);
    }

    if report.ignored > 0 {
        warn!(
            "Store capacity ({}) reached, ignored {} remaining line(s)",
            capacity, report.ignored
        );
    }

    report
}

fn parse_row(row: &StringRecord) -> Result<PaymentRecord, String> {
    if row.len() != FIELD_COUNT {
        return Err(format!(
            "Expected {} fields, found {}",
            FIELD_COUNT,
            row.len()
        ));
    }

    let csv_record: CsvRecord = row.deserialize(None).map_err(|e| e.to_string())?;
    convert_csv_record(csv_record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(id: &str, payer: &str, service: &str, amount: Decimal, date: &str) -> PaymentRecord {
        PaymentRecord {
            id: id.to_string(),
            payer: payer.to_string(),
            service_type: service.to_string(),
            amount,
            date: date.to_string(),
        }
    }

    fn write_to_string(records: &[PaymentRecord]) -> String {
        let mut output = Vec::new();
        write_records_csv(records, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[rstest]
    #[case::equals("=cmd()", "'=cmd()")]
    #[case::plus("+1", "'+1")]
    #[case::minus("-1", "'-1")]
    #[case::at("@SUM(A1)", "'@SUM(A1)")]
    #[case::plain("Alice", "Alice")]
    #[case::inner_equals("a=b", "a=b")]
    #[case::empty("", "")]
    fn test_escape_formula(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_formula(input), expected);
    }

    #[rstest]
    #[case::whole(Decimal::from(100), "100.00")]
    #[case::one_place(Decimal::new(505, 1), "50.50")]
    #[case::round_half_up(Decimal::new(1005, 3), "1.01")]
    #[case::max(Decimal::from(10000), "10000.00")]
    fn test_to_csv_record_amount(#[case] amount: Decimal, #[case] expected: &str) {
        let csv = to_csv_record(&record("P001", "A", "ATM", amount, "2024-01-01"));
        assert_eq!(csv.amount, expected);
    }

    #[test]
    fn test_to_csv_record_leaves_source_untouched() {
        let source = record("P001", "=cmd()", "ATM", Decimal::from(5), "2024-01-01");
        let csv = to_csv_record(&source);
        assert_eq!(csv.payer, "'=cmd()");
        assert_eq!(source.payer, "=cmd()");
    }

    #[rstest]
    #[case::missing_payer("P001", "", "ATM", "1.00", "2024-01-01", "Missing payer")]
    #[case::long_id("P0000000001", "A", "ATM", "1.00", "2024-01-01", "id longer than 9")]
    #[case::long_payer("P001", &"x".repeat(50), "ATM", "1.00", "2024-01-01", "payer longer than 49")]
    #[case::long_service("P001", "A", &"s".repeat(30), "1.00", "2024-01-01", "service type longer than 29")]
    #[case::long_escaped_payer("P001", &format!("'{}", "x".repeat(50)), "ATM", "1.00", "2024-01-01", "payer longer than 50")]
    #[case::long_date("P001", "A", "ATM", "1.00", "2024-01-01T00:00:00", "date longer than 14")]
    #[case::bad_amount("P001", "A", "ATM", "ten", "2024-01-01", "Invalid amount")]
    #[case::bad_id("X12", "A", "ATM", "5.00", "2024-01-01", "Invalid payment id")]
    fn test_convert_csv_record_errors(
        #[case] id: &str,
        #[case] payer: &str,
        #[case] service: &str,
        #[case] amount: &str,
        #[case] date: &str,
        #[case] expected_error: &str,
    ) {
        let csv_record = CsvRecord {
            id: id.to_string(),
            payer: payer.to_string(),
            service_type: service.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        };

        let result = convert_csv_record(csv_record);
        assert!(result.is_err());
        assert!(
            result.as_ref().unwrap_err().contains(expected_error),
            "unexpected error: {:?}",
            result
        );
    }

    #[rstest]
    #[case::plain("123.45", Decimal::new(12345, 2))]
    #[case::integer("100", Decimal::from(100))]
    #[case::extra_places("7.005", Decimal::new(701, 2))]
    #[case::scientific("1e2", Decimal::from(100))]
    fn test_convert_csv_record_amount_parsing(#[case] amount: &str, #[case] expected: Decimal) {
        let csv_record = CsvRecord {
            id: "P001".to_string(),
            payer: "A".to_string(),
            service_type: "ATM".to_string(),
            amount: amount.to_string(),
            date: "2024-01-01".to_string(),
        };

        assert_eq!(convert_csv_record(csv_record).unwrap().amount, expected);
    }

    #[rstest]
    #[case::single(
        vec![record("P001", "Alice Smith", "Internet", Decimal::new(12345, 2), "2024-01-31")],
        "P001,Alice Smith,Internet,123.45,2024-01-31\n"
    )]
    #[case::sorted_numerically(
        vec![
            record("P010", "Ten", "ATM", Decimal::from(10), "2024-01-10"),
            record("P002", "Two", "ATM", Decimal::from(2), "2024-01-02"),
        ],
        "P002,Two,ATM,2.00,2024-01-02\nP010,Ten,ATM,10.00,2024-01-10\n"
    )]
    #[case::malformed_last(
        vec![
            record("BAD", "Junk", "ATM", Decimal::from(1), "2024-01-01"),
            record("P100", "Hundred", "ATM", Decimal::from(1), "2024-01-01"),
        ],
        "P100,Hundred,ATM,1.00,2024-01-01\nBAD,Junk,ATM,1.00,2024-01-01\n"
    )]
    #[case::formula_guard(
        vec![record("P001", "=cmd()", "@svc", Decimal::from(1), "2024-01-01")],
        "P001,'=cmd(),'@svc,1.00,2024-01-01\n"
    )]
    #[case::embedded_comma_quoted(
        vec![record("P001", "Lee, Bob", "ATM", Decimal::from(1), "2024-01-01")],
        "P001,\"Lee, Bob\",ATM,1.00,2024-01-01\n"
    )]
    #[case::empty(vec![], "")]
    fn test_write_records_csv(#[case] records: Vec<PaymentRecord>, #[case] expected: &str) {
        assert_eq!(write_to_string(&records), expected);
    }

    #[test]
    fn test_write_records_csv_is_deterministic() {
        let records = vec![
            record("P003", "C", "ATM", Decimal::from(3), "2024-01-03"),
            record("P001", "A", "ATM", Decimal::from(1), "2024-01-01"),
        ];
        assert_eq!(write_to_string(&records), write_to_string(&records));
        assert_eq!(records[0].id, "P003");
    }

    #[test]
    fn test_read_records_csv_valid_lines() {
        let input = "P001,Alice Smith,Internet,123.45,2024-01-31\nP002,Bob Lee,ATM,50.00,2024-02-01\n";
        let report = read_records_csv(input.as_bytes(), 100);

        assert_eq!(report.records.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.ignored, 0);
        assert_eq!(
            report.records[0],
            record("P001", "Alice Smith", "Internet", Decimal::new(12345, 2), "2024-01-31")
        );
    }

    #[test]
    fn test_read_records_csv_skips_bad_lines_with_line_numbers() {
        let input = "X12,Bad,ATM,5.00,2024-01-01\n\
                     P001,Good,ATM,7.00,2024-01-02\n\
                     P002,Short,ATM\n\
                     P003,Amount,ATM,abc,2024-01-03\n\
                     p001,Dup,ATM,1.00,2024-01-04\n";
        let report = read_records_csv(input.as_bytes(), 100);

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].id, "P001");

        let lines: Vec<Option<u64>> = report
            .skipped
            .iter()
            .map(|e| match e {
                PaymentError::MalformedRecord { line, .. } => *line,
                other => panic!("unexpected diagnostic {:?}", other),
            })
            .collect();
        assert_eq!(lines, vec![Some(1), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_read_records_csv_caps_at_capacity() {
        let input: String = (1..=105)
            .map(|i| format!("P{:03},Name{},ATM,10.00,2024-01-01\n", i, i))
            .collect();
        let report = read_records_csv(input.as_bytes(), 100);

        assert_eq!(report.records.len(), 100);
        assert_eq!(report.ignored, 5);
        assert_eq!(report.records.last().unwrap().id, "P100");
    }

    #[test]
    fn test_read_records_csv_counts_everything_past_capacity_as_ignored() {
        let input = "P001,A,ATM,1.00,2024-01-01\n\
                     P002,B,ATM,2.00,2024-01-02\n\
                     garbage\n\
                     P003,C,ATM,not-a-number,2024-01-03\n\
                     P004,D,ATM,4.00,2024-01-04\n";
        let report = read_records_csv(input.as_bytes(), 2);

        assert_eq!(report.records.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.ignored, 3);
    }

    #[rstest]
    #[case::payer(format!("={}", "a".repeat(MAX_PAYER_LEN - 1)), "ATM".to_string())]
    #[case::service("A".to_string(), format!("@{}", "s".repeat(MAX_SERVICE_LEN - 1)))]
    fn test_guarded_field_at_length_limit_survives_reload(
        #[case] payer: String,
        #[case] service: String,
    ) {
        let source = record("P001", &payer, &service, Decimal::from(10), "2024-01-01");
        let written = write_to_string(&[source]);
        let report = read_records_csv(written.as_bytes(), 100);

        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].payer, escape_formula(&payer));
        assert_eq!(report.records[0].service_type, escape_formula(&service));
    }

    #[test]
    fn test_read_records_csv_keeps_formula_escape() {
        let report = read_records_csv("P001,'=cmd(),ATM,1.00,2024-01-01\n".as_bytes(), 100);
        assert_eq!(report.records[0].payer, "'=cmd()");
    }

    #[test]
    fn test_read_records_csv_trims_whitespace_and_blank_lines() {
        let input = "\n  P001 ,  Alice  , ATM , 10 , 2024-01-01 \n\n";
        let report = read_records_csv(input.as_bytes(), 100);

        assert!(report.skipped.is_empty());
        assert_eq!(
            report.records,
            vec![record("P001", "Alice", "ATM", Decimal::from(10), "2024-01-01")]
        );
    }
}
