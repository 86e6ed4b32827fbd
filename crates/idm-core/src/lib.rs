//! # idm-core
//!
//! The privileged-user facade.
//!
//! A [`PrivilegedUser`] is a single handle on an authenticated user that
//! unifies an identity store (entries, groups, claims, profiles, linked
//! accounts, credentials) and an authorization store (roles, permissions)
//! behind one API. It stores nothing itself apart from the user's entry
//! identifier, resolved lazily and cached for the lifetime of the handle.
//!
//! ## Example
//!
//! ```ignore
//! use idm_core::{AttributeQuery, PrivilegedUser};
//!
//! let user = PrivilegedUser::new(identity, authz, "alice".into());
//! let entry = user.user_entry_id().await?;
//! let claims = user.attributes(&dialect, &AttributeQuery::new()).await?;
//! if user.has_role(&"admin".into()).await? { /* ... */ }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod entry;
pub mod event;
pub mod user;

pub use config::{ConfigError, FacadeConfig, LinkSourcePolicy};
pub use entry::EntryIdCell;
pub use event::{
    Event, EventBuilder, EventListener, EventOutcome, EventType, InMemoryEventListener,
    TracingEventListener,
};
pub use user::{AttributeQuery, PrivilegedUser};
