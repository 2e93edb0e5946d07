//! Payment id allocation and ordering
//!
//! Ids are `P` plus a zero-padded three digit suffix. New ids always take the
//! smallest free suffix, so ids released by deletion are reused.

use crate::core::validator::is_valid_id;
use crate::types::{PaymentError, ID_PREFIX};
use std::cmp::Ordering;

/// Largest suffix a three digit id can carry
pub const MAX_ID_SUFFIX: usize = 999;

/// Numeric suffix of a syntactically valid id
pub fn id_suffix(id: &str) -> Option<usize> {
    if is_valid_id(id) {
        id[1..].parse().ok()
    } else {
        None
    }
}

/// Format a suffix as a payment id
pub fn format_id(suffix: usize) -> String {
    format!("{}{:03}", ID_PREFIX, suffix)
}

/// Allocate the smallest unused id in `P001..=P{capacity}`
///
/// The range never extends past `P999`, whatever `capacity` says. Only valid
/// ids with a suffix inside the range occupy a slot. Fails when every slot is
/// taken, which can happen before the number of ids reaches `capacity` if
/// some ids sit outside the range.
pub fn next_id<'a, I>(existing: I, capacity: usize) -> Result<String, PaymentError>
where
    I: IntoIterator<Item = &'a str>,
{
    let last = capacity.min(MAX_ID_SUFFIX);
    let mut used = vec![false; last + 1];
    for suffix in existing.into_iter().filter_map(id_suffix) {
        if (1..=last).contains(&suffix) {
            used[suffix] = true;
        }
    }

    (1..=last)
        .find(|&suffix| !used[suffix])
        .map(format_id)
        .ok_or_else(|| PaymentError::capacity_exhausted(capacity))
}

/// Total order over ids used when persisting
///
/// Valid ids compare by numeric suffix, malformed ids sort after every valid
/// one, and remaining ties fall back to plain string comparison.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (id_suffix(a), id_suffix(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
