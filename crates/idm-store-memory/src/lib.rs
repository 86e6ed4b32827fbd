//! # idm-store-memory
//!
//! In-memory implementations of the store capabilities.
//!
//! - [`MemoryIdentityStore`] - users, groups, claims, credentials
//! - [`MemoryLinkedAccountStore`] - symmetric links between entries
//! - [`MemoryAuthorizationStore`] - role catalogue and assignments
//!
//! Every store records the calls it receives in a [`CallJournal`] and can be
//! told to fail the next call of an operation, which makes them suitable for
//! exercising callers against exact store interactions.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authz;
pub mod identity;
pub mod journal;
pub mod linked;

pub use authz::MemoryAuthorizationStore;
pub use identity::MemoryIdentityStore;
pub use journal::{CallJournal, Faults, StoreCall};
pub use linked::MemoryLinkedAccountStore;
