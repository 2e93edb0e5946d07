//! Case-insensitive text matching
//!
//! Used for payer name search and for resolving free-text service type input
//! against the catalog.

use crate::types::ServiceType;

/// Substring containment with ASCII case folding
///
/// An empty needle matches every haystack.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// All catalog entries whose name contains `input`, in catalog order
pub fn find_service_matches(input: &str) -> Vec<ServiceType> {
    let input = input.trim();
    ServiceType::ALL
        .into_iter()
        .filter(|service| contains_ignore_case(service.name(), input))
        .collect()
}

/// Outcome of resolving free text against the service catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceMatch {
    /// Nothing matched; the input must be rejected
    NoMatch,
    /// Exactly one entry matched and is selected automatically
    Unique(ServiceType),
    /// Several entries matched; the caller must pick one explicitly
    Ambiguous(Vec<ServiceType>),
}

impl ServiceMatch {
    /// Pick a candidate by its 1-based position
    ///
    /// A unique match accepts only `1`; out-of-range choices yield `None`.
    pub fn select(&self, choice: usize) -> Option<ServiceType> {
        match self {
            ServiceMatch::NoMatch => None,
            ServiceMatch::Unique(service) => (choice == 1).then_some(*service),
            ServiceMatch::Ambiguous(candidates) => {
                choice.checked_sub(1).and_then(|i| candidates.get(i)).copied()
            }
        }
    }
}

/// Apply the resolution policy to user input
pub fn resolve_service(input: &str) -> ServiceMatch {
    let mut matches = find_service_matches(input);
    match matches.len() {
        0 => ServiceMatch::NoMatch,
        1 => ServiceMatch::Unique(matches.remove(0)),
        _ => ServiceMatch::Ambiguous(matches),
    }
}
