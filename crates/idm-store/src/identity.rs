//! Identity store capability.

use async_trait::async_trait;
use idm_model::{
    Claim, ClaimIdentifier, Credential, DialectIdentifier, EntryIdentifier, GroupIdentifier,
    PrivilegedGroup, Profile, ProfileIdentifier, StoreIdentifier, UserIdentifier,
};

use crate::error::IdentityStoreResult;
use crate::linked::LinkedAccountStore;

/// Backend holding user entries, group memberships, claims, profiles and
/// credentials.
///
/// Implementations must be thread-safe and support concurrent access.
/// A `None` profile argument means "no specific profile"; each store applies
/// its own default-scope policy to it.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Identifies this store instance.
    fn store_identifier(&self) -> StoreIdentifier;

    /// Returns the sub-store that manages linked accounts.
    fn linked_account_store(&self) -> &dyn LinkedAccountStore;

    /// Resolves a user identifier to the entry identifier of its record.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityStoreError::UserNotFound` if the user has no entry.
    async fn resolve_entry_id(&self, user: &UserIdentifier) -> IdentityStoreResult<EntryIdentifier>;

    /// Lists the groups of a user, optionally filtered.
    async fn list_groups(
        &self,
        user: &UserIdentifier,
        criteria: Option<&GroupSearchCriteria>,
    ) -> IdentityStoreResult<Vec<PrivilegedGroup>>;

    /// Reads claims of a user under a dialect.
    ///
    /// `claims = None` selects every claim of the dialect.
    async fn get_attributes(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: Option<&[ClaimIdentifier]>,
        profile: Option<&ProfileIdentifier>,
    ) -> IdentityStoreResult<Vec<Claim>>;

    /// Appends claims for a user under a dialect.
    async fn add_attributes(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: &[Claim],
        profile: Option<&ProfileIdentifier>,
    ) -> IdentityStoreResult<()>;

    /// Lists the profiles that expose the given claims under a dialect.
    async fn list_profiles(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: &[ClaimIdentifier],
    ) -> IdentityStoreResult<Vec<Profile>>;

    /// Adds a user to several groups in one request.
    async fn add_to_groups(
        &self,
        user: &UserIdentifier,
        groups: &[GroupIdentifier],
    ) -> IdentityStoreResult<()>;

    /// Checks group membership.
    async fn is_in_group(
        &self,
        user: &UserIdentifier,
        group: &GroupIdentifier,
    ) -> IdentityStoreResult<bool>;

    /// Replaces every credential of the credential's kind.
    async fn reset_credentials(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()>;

    /// Adds a credential.
    async fn add_credential(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()>;

    /// Removes a credential.
    async fn remove_credential(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()>;

    /// Deletes the user entry.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityStoreError::UserNotFound` if the user doesn't exist.
    async fn drop_user(&self, user: &UserIdentifier) -> IdentityStoreResult<()>;
}

/// Search criteria for group listings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupSearchCriteria {
    /// Search string (matches group identifier or name).
    pub search: Option<String>,
    /// Maximum results to return.
    pub max_results: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl GroupSearchCriteria {
    /// Creates empty criteria (matches everything).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search: None,
            max_results: None,
            offset: None,
        }
    }

    /// Sets the search string.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets maximum results.
    #[must_use]
    pub const fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Sets offset for pagination.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Checks if a group matches the search string.
    #[must_use]
    pub fn matches(&self, group: &PrivilegedGroup) -> bool {
        self.search.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            group.identifier.as_str().to_lowercase().contains(&needle)
                || group.name.to_lowercase().contains(&needle)
        })
    }

    /// Applies offset and limit to an already filtered result.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let max = self.max_results.unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(max).collect()
    }
}
