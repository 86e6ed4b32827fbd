//! Linked-account sub-store.

use async_trait::async_trait;
use idm_model::{EntryIdentifier, UserIdentifier};

use crate::error::AccountLinkResult;

/// Store for associations between entries in different identity domains.
///
/// Reached through [`IdentityStore::linked_account_store`]. The source entry
/// is optional: callers that have not resolved their own entry identifier
/// pass `None`, and implementations decide how to treat that (typically by
/// returning `AccountLinkError::UnsetSource`).
///
/// [`IdentityStore::linked_account_store`]: crate::IdentityStore::linked_account_store
#[async_trait]
pub trait LinkedAccountStore: Send + Sync {
    /// Links `target` to `source`.
    ///
    /// ## Errors
    ///
    /// Returns `AccountLinkError::AlreadyLinked` if the pair is already linked.
    async fn link(
        &self,
        source: Option<&EntryIdentifier>,
        target: &EntryIdentifier,
    ) -> AccountLinkResult<()>;

    /// Removes the link between `source` and `target`.
    ///
    /// ## Errors
    ///
    /// Returns `AccountLinkError::NotLinked` if the pair is not linked.
    async fn unlink(
        &self,
        source: Option<&EntryIdentifier>,
        target: &EntryIdentifier,
    ) -> AccountLinkResult<()>;

    /// Lists the users whose entries are linked to `source`.
    async fn list_linked(
        &self,
        source: Option<&EntryIdentifier>,
    ) -> AccountLinkResult<Vec<UserIdentifier>>;
}
