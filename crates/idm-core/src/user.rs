//! The privileged-user facade.
//!
//! A [`PrivilegedUser`] binds one user identifier to one identity store and
//! one authorization store. Every operation forwards to the store that owns
//! the data and hands the result back as a read-only snapshot. Store errors
//! are returned exactly as the store produced them.

use std::fmt;
use std::sync::Arc;

use idm_model::{
    Claim, ClaimIdentifier, Credential, DialectIdentifier, EntryIdentifier, GroupIdentifier,
    Permission, PrivilegedGroup, PrivilegedRole, Profile, ProfileIdentifier, ReadOnlyList,
    RoleIdentifier, StoreIdentifier, UserIdentifier,
};
use idm_store::{
    AccountLinkResult, AuthorizationStore, AuthorizationStoreResult, GroupSearchCriteria,
    IdentityStore, IdentityStoreResult, RoleSearchCriteria,
};

use crate::config::{FacadeConfig, LinkSourcePolicy};
use crate::entry::EntryIdCell;
use crate::event::{Event, EventBuilder, EventListener, EventType, TracingEventListener};

/// Selects which claims an attribute read returns.
///
/// The default query asks for every claim of the dialect with no specific
/// profile, leaving the profile choice to the identity store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeQuery {
    /// Claims to return; `None` returns all claims of the dialect.
    pub claims: Option<Vec<ClaimIdentifier>>,
    /// Profile to read from; `None` lets the store pick its default scope.
    pub profile: Option<ProfileIdentifier>,
}

impl AttributeQuery {
    /// All claims, store-default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All claims in the given profile. `None` is the same as [`new`](Self::new).
    #[must_use]
    pub fn in_profile(profile: Option<ProfileIdentifier>) -> Self {
        Self {
            claims: None,
            profile,
        }
    }

    /// Restricts the read to the given claims.
    #[must_use]
    pub fn claims(mut self, claims: impl IntoIterator<Item = ClaimIdentifier>) -> Self {
        self.claims = Some(claims.into_iter().collect());
        self
    }

    /// Sets the profile.
    #[must_use]
    pub fn profile(mut self, profile: impl Into<ProfileIdentifier>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Unified handle on one user across an identity store and an authorization
/// store.
///
/// Construction does not touch either store; a missing user is reported by
/// the first operation that needs it. The only state kept between calls is
/// the lazily resolved entry identifier.
pub struct PrivilegedUser {
    identity_store: Arc<dyn IdentityStore>,
    authz_store: Arc<dyn AuthorizationStore>,
    user: UserIdentifier,
    entry_id: EntryIdCell,
    config: FacadeConfig,
    listener: Arc<dyn EventListener>,
}

impl fmt::Debug for PrivilegedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivilegedUser")
            .field("user", &self.user)
            .field("store", &self.identity_store.store_identifier())
            .field("entry_id", &self.entry_id.get())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PrivilegedUser {
    /// Binds a user to an identity store and an authorization store.
    #[must_use]
    pub fn new(
        identity_store: Arc<dyn IdentityStore>,
        authz_store: Arc<dyn AuthorizationStore>,
        user: UserIdentifier,
    ) -> Self {
        Self {
            identity_store,
            authz_store,
            user,
            entry_id: EntryIdCell::new(),
            config: FacadeConfig::default(),
            listener: Arc::new(TracingEventListener::new()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: FacadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the audit event listener.
    #[must_use]
    pub fn with_event_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Returns the bound user identifier.
    #[must_use]
    pub const fn user_identifier(&self) -> &UserIdentifier {
        &self.user
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Checks whether the entry identifier has been resolved.
    #[must_use]
    pub fn is_entry_resolved(&self) -> bool {
        self.entry_id.is_resolved()
    }

    /// Identifies the identity store this facade is bound to.
    #[must_use]
    pub fn store_identifier(&self) -> StoreIdentifier {
        self.identity_store.store_identifier()
    }

    // === Identity resolution ===

    /// Returns the user's entry identifier, resolving it on first use.
    ///
    /// After a successful resolution the identity store is never asked
    /// again by this instance.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged, typically
    /// `IdentityStoreError::UserNotFound`.
    pub async fn user_entry_id(&self) -> IdentityStoreResult<EntryIdentifier> {
        let store = &self.identity_store;
        let user = &self.user;
        let entry = self
            .entry_id
            .get_or_resolve(move || async move {
                tracing::debug!(user = %user, "resolving entry identifier");
                store.resolve_entry_id(user).await
            })
            .await
            .map_err(|e| self.failed("user_entry_id", e))?;
        Ok(entry.clone())
    }

    // === Listings ===

    /// Lists the user's groups, optionally filtered.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn groups(
        &self,
        criteria: Option<&GroupSearchCriteria>,
    ) -> IdentityStoreResult<ReadOnlyList<PrivilegedGroup>> {
        self.identity_store
            .list_groups(&self.user, criteria)
            .await
            .map(ReadOnlyList::from)
            .map_err(|e| self.failed("groups", e))
    }

    /// Lists the user's roles, optionally filtered.
    ///
    /// ## Errors
    ///
    /// Returns the authorization store's error unchanged.
    pub async fn roles(
        &self,
        criteria: Option<&RoleSearchCriteria>,
    ) -> AuthorizationStoreResult<ReadOnlyList<PrivilegedRole>> {
        self.authz_store
            .list_roles(&self.user, criteria)
            .await
            .map(ReadOnlyList::from)
            .map_err(|e| self.failed("roles", e))
    }

    /// Reads the user's claims under a dialect.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn attributes(
        &self,
        dialect: &DialectIdentifier,
        query: &AttributeQuery,
    ) -> IdentityStoreResult<ReadOnlyList<Claim>> {
        self.identity_store
            .get_attributes(
                &self.user,
                dialect,
                query.claims.as_deref(),
                query.profile.as_ref(),
            )
            .await
            .map(ReadOnlyList::from)
            .map_err(|e| self.failed("attributes", e))
    }

    /// Lists the profiles exposing the given claims under a dialect.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn profiles(
        &self,
        dialect: &DialectIdentifier,
        claims: &[ClaimIdentifier],
    ) -> IdentityStoreResult<ReadOnlyList<Profile>> {
        self.identity_store
            .list_profiles(&self.user, dialect, claims)
            .await
            .map(ReadOnlyList::from)
            .map_err(|e| self.failed("profiles", e))
    }

    // === Predicates ===

    /// Checks if the user holds a role.
    ///
    /// ## Errors
    ///
    /// A failed check is an error, never `Ok(false)`.
    pub async fn has_role(&self, role: &RoleIdentifier) -> AuthorizationStoreResult<bool> {
        self.authz_store
            .has_role(&self.user, role)
            .await
            .map_err(|e| self.failed("has_role", e))
    }

    /// Checks if the user is granted a permission.
    ///
    /// ## Errors
    ///
    /// A failed check is an error, never `Ok(false)`.
    pub async fn has_permission(&self, permission: &Permission) -> AuthorizationStoreResult<bool> {
        self.authz_store
            .has_permission(&self.user, permission)
            .await
            .map_err(|e| self.failed("has_permission", e))
    }

    /// Checks if the user belongs to a group.
    ///
    /// ## Errors
    ///
    /// A failed check is an error, never `Ok(false)`.
    pub async fn in_group(&self, group: &GroupIdentifier) -> IdentityStoreResult<bool> {
        self.identity_store
            .is_in_group(&self.user, group)
            .await
            .map_err(|e| self.failed("in_group", e))
    }

    // === Mutations ===

    /// Appends claims under a dialect, optionally in a profile.
    ///
    /// Claims are neither deduplicated nor validated here.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn add_attributes(
        &self,
        dialect: &DialectIdentifier,
        claims: &[Claim],
        profile: Option<&ProfileIdentifier>,
    ) -> IdentityStoreResult<()> {
        let result = self
            .identity_store
            .add_attributes(&self.user, dialect, claims, profile)
            .await;
        self.audit(EventType::AttributesAdded, &result, |event| {
            event
                .detail("dialect", dialect.as_str())
                .detail("count", claims.len().to_string())
                .detail("profile", profile.map_or("", ProfileIdentifier::as_str))
        });
        result.map_err(|e| self.failed("add_attributes", e))
    }

    /// Adds the user to several groups in one store request.
    ///
    /// No transaction is added on top of what the identity store provides.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn add_to_groups(&self, groups: &[GroupIdentifier]) -> IdentityStoreResult<()> {
        let result = self.identity_store.add_to_groups(&self.user, groups).await;
        self.audit(EventType::UserJoinedGroups, &result, |event| {
            event.detail("groups", join(groups))
        });
        result.map_err(|e| self.failed("add_to_groups", e))
    }

    /// Assigns several roles as one batch request.
    ///
    /// ## Errors
    ///
    /// Returns the authorization store's error unchanged.
    pub async fn assign_to_roles(&self, roles: &[RoleIdentifier]) -> AuthorizationStoreResult<()> {
        let result = self.authz_store.assign_roles(&self.user, roles).await;
        self.audit(EventType::RolesAssigned, &result, |event| {
            event.detail("roles", join(roles))
        });
        result.map_err(|e| self.failed("assign_to_roles", e))
    }

    /// Assigns a single role.
    ///
    /// ## Errors
    ///
    /// Returns the authorization store's error unchanged.
    pub async fn assign_to_role(&self, role: &RoleIdentifier) -> AuthorizationStoreResult<()> {
        let result = self.authz_store.assign_role(&self.user, role).await;
        self.audit(EventType::RoleAssigned, &result, |event| {
            event.detail("role", role.as_str())
        });
        result.map_err(|e| self.failed("assign_to_role", e))
    }

    // === Account linking ===

    /// Links another entry to this user's entry.
    ///
    /// The source entry is obtained according to
    /// [`FacadeConfig::link_source`].
    ///
    /// ## Errors
    ///
    /// Returns the link store's error unchanged, or
    /// `AccountLinkError::Identity` if resolving the source entry failed.
    pub async fn link_account(&self, linked: &EntryIdentifier) -> AccountLinkResult<()> {
        let result = match self.link_source().await {
            Ok(source) => {
                self.identity_store
                    .linked_account_store()
                    .link(source.as_ref(), linked)
                    .await
            }
            Err(e) => Err(e),
        };
        self.audit(EventType::AccountLinked, &result, |event| {
            event.detail("linked_entry", linked.as_str())
        });
        result.map_err(|e| self.failed("link_account", e))
    }

    /// Removes the link between this user's entry and another entry.
    ///
    /// ## Errors
    ///
    /// Returns the link store's error unchanged, or
    /// `AccountLinkError::Identity` if resolving the source entry failed.
    pub async fn unlink_account(&self, linked: &EntryIdentifier) -> AccountLinkResult<()> {
        let result = match self.link_source().await {
            Ok(source) => {
                self.identity_store
                    .linked_account_store()
                    .unlink(source.as_ref(), linked)
                    .await
            }
            Err(e) => Err(e),
        };
        self.audit(EventType::AccountUnlinked, &result, |event| {
            event.detail("linked_entry", linked.as_str())
        });
        result.map_err(|e| self.failed("unlink_account", e))
    }

    /// Lists the users whose entries are linked to this user's entry.
    ///
    /// ## Errors
    ///
    /// Returns the link store's error unchanged, or
    /// `AccountLinkError::Identity` if resolving the source entry failed.
    pub async fn linked_accounts(&self) -> AccountLinkResult<ReadOnlyList<UserIdentifier>> {
        let source = self.link_source().await?;
        self.identity_store
            .linked_account_store()
            .list_linked(source.as_ref())
            .await
            .map(ReadOnlyList::from)
            .map_err(|e| self.failed("linked_accounts", e))
    }

    async fn link_source(&self) -> AccountLinkResult<Option<EntryIdentifier>> {
        match self.config.link_source {
            LinkSourcePolicy::ResolveFirst => Ok(Some(self.user_entry_id().await?)),
            LinkSourcePolicy::CachedOnly => {
                let cached = self.entry_id.get().cloned();
                if cached.is_none() {
                    tracing::debug!(
                        user = %self.user,
                        "entry identifier unresolved, linking without source"
                    );
                }
                Ok(cached)
            }
        }
    }

    // === Credentials ===

    /// Replaces the user's credentials of the credential's kind.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn reset_credentials(&self, credential: &Credential) -> IdentityStoreResult<()> {
        let result = self
            .identity_store
            .reset_credentials(&self.user, credential)
            .await;
        self.audit(EventType::CredentialsReset, &result, |event| {
            event.detail("kind", credential.kind().as_str())
        });
        result.map_err(|e| self.failed("reset_credentials", e))
    }

    /// Adds a credential.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn add_credential(&self, credential: &Credential) -> IdentityStoreResult<()> {
        let result = self
            .identity_store
            .add_credential(&self.user, credential)
            .await;
        self.audit(EventType::CredentialAdded, &result, |event| {
            event.detail("kind", credential.kind().as_str())
        });
        result.map_err(|e| self.failed("add_credential", e))
    }

    /// Removes a credential.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn remove_credential(&self, credential: &Credential) -> IdentityStoreResult<()> {
        let result = self
            .identity_store
            .remove_credential(&self.user, credential)
            .await;
        self.audit(EventType::CredentialRemoved, &result, |event| {
            event.detail("kind", credential.kind().as_str())
        });
        result.map_err(|e| self.failed("remove_credential", e))
    }

    // === Deletion ===

    /// Deletes the user from the identity store.
    ///
    /// The facade should be discarded afterwards. Identity-store operations
    /// on it fail with whatever the store reports for a missing user; an
    /// already resolved entry identifier is still returned from the cache.
    /// Link operations still send that cached entry to the link store, which
    /// is expected to reject it once the entry is gone (the in-memory store
    /// returns `AccountLinkError::InvalidPair`). Authorization-store
    /// operations are left to the authorization store.
    ///
    /// ## Errors
    ///
    /// Returns the identity store's error unchanged.
    pub async fn drop_user(&self) -> IdentityStoreResult<()> {
        let result = self.identity_store.drop_user(&self.user).await;
        self.audit(EventType::UserDropped, &result, |event| event);
        result.map_err(|e| self.failed("drop_user", e))
    }

    // === Helpers ===

    fn failed<E: fmt::Display>(&self, operation: &'static str, err: E) -> E {
        tracing::debug!(user = %self.user, operation, error = %err, "store call failed");
        err
    }

    fn audit<T, E, F>(&self, event_type: EventType, result: &Result<T, E>, details: F)
    where
        E: fmt::Display,
        F: FnOnce(EventBuilder) -> EventBuilder,
    {
        if !self.config.audit_events {
            return;
        }

        let builder = Event::builder(event_type, self.user.clone(), self.store_identifier());
        let builder = match result {
            Ok(_) => builder.success(),
            Err(e) => builder.failure(e.to_string()),
        };
        self.listener.on_event(&details(builder).build());
    }
}

fn join<T: AsRef<str>>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(",")
}
