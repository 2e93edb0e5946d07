//! Field validation
//!
//! Pure predicates over identifiers, dates, amounts and payer names. The
//! store calls these on every add and update regardless of what the CLI has
//! already checked.

use crate::types::{ID_PREFIX, MAX_PAYER_LEN};
use rust_decimal::Decimal;

/// Earliest year a payment may be dated
pub const MIN_YEAR: i32 = 2020;

/// Smallest accepted amount
pub const MIN_AMOUNT: Decimal = Decimal::ONE;

/// Largest accepted amount
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

/// Check the shape of a payment id: `P` or `p` followed by exactly 3 digits
pub fn is_valid_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 4
        && bytes[0].eq_ignore_ascii_case(&(ID_PREFIX as u8))
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Number of days in `month` of `year`
///
/// Returns `None` when `month` is outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return None,
    };
    Some(days)
}

/// Check `1 <= amount <= 10000`
pub fn validate_amount(amount: Decimal) -> bool {
    (MIN_AMOUNT..=MAX_AMOUNT).contains(&amount)
}

/// Check that a date exists in the calendar and is not before 2020
pub fn validate_date(year: i32, month: u32, day: u32) -> bool {
    if year < MIN_YEAR {
        return false;
    }
    match days_in_month(year, month) {
        Some(max_day) => (1..=max_day).contains(&day),
        None => false,
    }
}

/// Parse a strict `YYYY-MM-DD` date and validate it
///
/// Only ASCII digits in the 4-2-2 layout are accepted, so the stored text is
/// always the canonical form.
pub fn parse_date(text: &str) -> Option<(i32, u32, u32)> {
    let mut parts = text.trim().split('-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(month, 2) || !digits(day, 2) {
        return None;
    }

    let (year, month, day) = (year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
    validate_date(year, month, day).then_some((year, month, day))
}

/// Check a payer name: non-empty once trimmed, at most 49 characters, single line
pub fn validate_payer(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name.chars().count() <= MAX_PAYER_LEN
        && !name.contains(&['\r', '\n'][..])
}
