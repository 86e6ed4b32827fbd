//! # idm-store
//!
//! Capability traits for the backends a privileged-user facade consumes.
//!
//! This crate defines the interfaces that concrete stores (LDAP, SQL,
//! in-memory, ...) implement. It contains no persistence of its own.
//!
//! ## Capabilities
//!
//! - [`IdentityStore`] - user entries, groups, claims, profiles, credentials
//! - [`LinkedAccountStore`] - links between entries across identity domains
//! - [`AuthorizationStore`] - roles and permissions
//!
//! The identity and authorization capabilities are independent: neither
//! trait refers to the other.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authz;
pub mod error;
pub mod identity;
pub mod linked;

pub use authz::{AuthorizationStore, RoleSearchCriteria};
pub use error::{
    AccountLinkError, AccountLinkResult, AuthorizationStoreError, AuthorizationStoreResult,
    IdentityStoreError, IdentityStoreResult,
};
pub use identity::{GroupSearchCriteria, IdentityStore};
pub use linked::LinkedAccountStore;
