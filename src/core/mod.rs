//! Core business logic module
//!
//! This module contains the payment record components:
//! - `traits` - Storage abstraction the store persists through
//! - `validator` - Field validation predicates
//! - `matcher` - Case-insensitive matching and service type resolution
//! - `id_allocator` - Id allocation and id ordering
//! - `store` - The record store and its configuration

pub mod id_allocator;
pub mod matcher;
pub mod store;
pub mod traits;
pub mod validator;

pub use id_allocator::{compare_ids, next_id};
pub use matcher::{contains_ignore_case, find_service_matches, resolve_service, ServiceMatch};
pub use store::{PaymentStore, StoreConfig, DEFAULT_CAPACITY, DEFAULT_FILE, MAX_CAPACITY};
pub use traits::Storage;
