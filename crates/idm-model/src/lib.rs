//! # idm-model
//!
//! Identifiers and data types that cross the boundary between the
//! privileged-user facade and its identity and authorization stores.
//!
//! Everything here is a plain value type. Stores produce and consume these
//! types; the facade only passes them through.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod claim;
pub mod credential;
pub mod group;
pub mod ids;
pub mod list;
pub mod role;

pub use claim::{profiles, Claim, Profile};
pub use credential::{Credential, CredentialKind};
pub use group::PrivilegedGroup;
pub use ids::{
    ClaimIdentifier, DialectIdentifier, EntryIdentifier, GroupIdentifier, ProfileIdentifier,
    RoleIdentifier, StoreIdentifier, UserIdentifier,
};
pub use list::ReadOnlyList;
pub use role::{Permission, PrivilegedRole};
