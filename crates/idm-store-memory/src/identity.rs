//! In-memory identity store.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use idm_model::{
    profiles, Claim, ClaimIdentifier, Credential, DialectIdentifier, EntryIdentifier,
    GroupIdentifier, PrivilegedGroup, Profile, ProfileIdentifier, StoreIdentifier, UserIdentifier,
};
use idm_store::{
    GroupSearchCriteria, IdentityStore, IdentityStoreError, IdentityStoreResult,
    LinkedAccountStore,
};

use crate::journal::{CallJournal, Faults, StoreCall};
use crate::linked::MemoryLinkedAccountStore;

struct UserRecord {
    entry: EntryIdentifier,
    groups: Vec<GroupIdentifier>,
    claims: BTreeMap<ProfileIdentifier, Vec<Claim>>,
    credentials: Vec<Credential>,
}

/// In-memory identity store for tests and embedding.
///
/// Claims written without a profile land in the `default` profile, and
/// reads without a profile read from it.
pub struct MemoryIdentityStore {
    id: StoreIdentifier,
    users: DashMap<UserIdentifier, UserRecord>,
    groups: DashMap<GroupIdentifier, PrivilegedGroup>,
    links: MemoryLinkedAccountStore,
    journal: CallJournal,
    faults: Faults<IdentityStoreError>,
    resolve_delay: Option<Duration>,
}

impl std::fmt::Debug for MemoryIdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentityStore")
            .field("id", &self.id)
            .field("users", &self.users.len())
            .field("groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryIdentityStore {
    /// Creates an empty store with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<StoreIdentifier>) -> Self {
        Self {
            id: id.into(),
            users: DashMap::new(),
            groups: DashMap::new(),
            links: MemoryLinkedAccountStore::new(),
            journal: CallJournal::new(),
            faults: Faults::default(),
            resolve_delay: None,
        }
    }

    /// Adds a user entry.
    #[must_use]
    pub fn with_user(self, user: impl Into<UserIdentifier>, entry: impl Into<EntryIdentifier>) -> Self {
        self.insert_user(user, entry);
        self
    }

    /// Adds a group to the catalogue.
    #[must_use]
    pub fn with_group(self, group: PrivilegedGroup) -> Self {
        self.insert_group(group);
        self
    }

    /// Delays every entry-id resolution, to widen race windows in tests.
    #[must_use]
    pub const fn with_resolve_delay(mut self, delay: Duration) -> Self {
        self.resolve_delay = Some(delay);
        self
    }

    /// Adds or replaces a user entry. The entry becomes linkable.
    pub fn insert_user(&self, user: impl Into<UserIdentifier>, entry: impl Into<EntryIdentifier>) {
        let user = user.into();
        let entry = entry.into();
        self.links.register_entry(entry.clone(), user.clone());
        self.users.insert(
            user,
            UserRecord {
                entry,
                groups: Vec::new(),
                claims: BTreeMap::new(),
                credentials: Vec::new(),
            },
        );
    }

    /// Adds or replaces a group in the catalogue.
    pub fn insert_group(&self, group: PrivilegedGroup) {
        self.groups.insert(group.identifier.clone(), group);
    }

    /// Checks whether a user entry exists.
    #[must_use]
    pub fn contains_user(&self, user: &UserIdentifier) -> bool {
        self.users.contains_key(user)
    }

    /// Returns the credentials currently held by a user.
    #[must_use]
    pub fn credentials_of(&self, user: &UserIdentifier) -> Vec<Credential> {
        self.users
            .get(user)
            .map(|record| record.credentials.clone())
            .unwrap_or_default()
    }

    /// Returns the concrete linked-account store.
    #[must_use]
    pub const fn links(&self) -> &MemoryLinkedAccountStore {
        &self.links
    }

    /// Calls received so far.
    #[must_use]
    pub const fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: IdentityStoreError) {
        self.faults.push(operation, error);
    }

    fn profile_key(profile: Option<&ProfileIdentifier>) -> ProfileIdentifier {
        profile
            .cloned()
            .unwrap_or_else(|| ProfileIdentifier::new(profiles::DEFAULT))
    }

    fn not_found(user: &UserIdentifier) -> IdentityStoreError {
        IdentityStoreError::UserNotFound(user.clone())
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    fn store_identifier(&self) -> StoreIdentifier {
        self.id.clone()
    }

    fn linked_account_store(&self) -> &dyn LinkedAccountStore {
        &self.links
    }

    async fn resolve_entry_id(&self, user: &UserIdentifier) -> IdentityStoreResult<EntryIdentifier> {
        self.journal
            .record(StoreCall::ResolveEntryId { user: user.clone() });
        self.faults.check("resolve_entry_id")?;

        if let Some(delay) = self.resolve_delay {
            tokio::time::sleep(delay).await;
        }

        self.users
            .get(user)
            .map(|record| record.entry.clone())
            .ok_or_else(|| Self::not_found(user))
    }

    async fn list_groups(
        &self,
        user: &UserIdentifier,
        criteria: Option<&GroupSearchCriteria>,
    ) -> IdentityStoreResult<Vec<PrivilegedGroup>> {
        self.journal.record(StoreCall::ListGroups {
            user: user.clone(),
            criteria: criteria.cloned(),
        });
        self.faults.check("list_groups")?;

        let record = self.users.get(user).ok_or_else(|| Self::not_found(user))?;
        let groups: Vec<PrivilegedGroup> = record
            .groups
            .iter()
            .filter_map(|id| self.groups.get(id).map(|group| group.value().clone()))
            .filter(|group| criteria.map_or(true, |c| c.matches(group)))
            .collect();

        Ok(match criteria {
            Some(criteria) => criteria.paginate(groups),
            None => groups,
        })
    }

    async fn get_attributes(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: Option<&[ClaimIdentifier]>,
        profile: Option<&ProfileIdentifier>,
    ) -> IdentityStoreResult<Vec<Claim>> {
        self.journal.record(StoreCall::GetAttributes {
            user: user.clone(),
            dialect: dialect.clone(),
            claims: claims.map(<[ClaimIdentifier]>::to_vec),
            profile: profile.cloned(),
        });
        self.faults.check("get_attributes")?;

        let record = self.users.get(user).ok_or_else(|| Self::not_found(user))?;
        let Some(stored) = record.claims.get(&Self::profile_key(profile)) else {
            return Ok(Vec::new());
        };

        Ok(stored
            .iter()
            .filter(|claim| &claim.dialect == dialect)
            .filter(|claim| claims.map_or(true, |wanted| wanted.contains(&claim.identifier)))
            .cloned()
            .collect())
    }

    async fn add_attributes(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: &[Claim],
        profile: Option<&ProfileIdentifier>,
    ) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::AddAttributes {
            user: user.clone(),
            dialect: dialect.clone(),
            claims: claims.to_vec(),
            profile: profile.cloned(),
        });
        self.faults.check("add_attributes")?;

        if let Some(foreign) = claims.iter().find(|claim| &claim.dialect != dialect) {
            return Err(IdentityStoreError::validation(format!(
                "claim {} belongs to dialect {}, not {dialect}",
                foreign.identifier, foreign.dialect
            )));
        }

        let mut record = self
            .users
            .get_mut(user)
            .ok_or_else(|| Self::not_found(user))?;
        let stored = record.claims.entry(Self::profile_key(profile)).or_default();
        for claim in claims {
            match stored.iter_mut().find(|c| c.is(dialect, &claim.identifier)) {
                Some(existing) => existing.value.clone_from(&claim.value),
                None => stored.push(claim.clone()),
            }
        }
        Ok(())
    }

    async fn list_profiles(
        &self,
        user: &UserIdentifier,
        dialect: &DialectIdentifier,
        claims: &[ClaimIdentifier],
    ) -> IdentityStoreResult<Vec<Profile>> {
        self.journal.record(StoreCall::ListProfiles {
            user: user.clone(),
            dialect: dialect.clone(),
            claims: claims.to_vec(),
        });
        self.faults.check("list_profiles")?;

        let record = self.users.get(user).ok_or_else(|| Self::not_found(user))?;
        Ok(record
            .claims
            .iter()
            .filter_map(|(profile, stored)| {
                let exposed: Vec<Claim> = stored
                    .iter()
                    .filter(|claim| &claim.dialect == dialect && claims.contains(&claim.identifier))
                    .cloned()
                    .collect();
                (!exposed.is_empty()).then(|| Profile {
                    identifier: profile.clone(),
                    claims: exposed,
                })
            })
            .collect())
    }

    async fn add_to_groups(
        &self,
        user: &UserIdentifier,
        groups: &[GroupIdentifier],
    ) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::AddToGroups {
            user: user.clone(),
            groups: groups.to_vec(),
        });
        self.faults.check("add_to_groups")?;

        if let Some(missing) = groups.iter().find(|g| !self.groups.contains_key(*g)) {
            return Err(IdentityStoreError::GroupNotFound(missing.clone()));
        }

        let mut record = self
            .users
            .get_mut(user)
            .ok_or_else(|| Self::not_found(user))?;
        for group in groups {
            if !record.groups.contains(group) {
                record.groups.push(group.clone());
            }
        }
        Ok(())
    }

    async fn is_in_group(
        &self,
        user: &UserIdentifier,
        group: &GroupIdentifier,
    ) -> IdentityStoreResult<bool> {
        self.journal.record(StoreCall::IsInGroup {
            user: user.clone(),
            group: group.clone(),
        });
        self.faults.check("is_in_group")?;

        let record = self.users.get(user).ok_or_else(|| Self::not_found(user))?;
        Ok(record.groups.contains(group))
    }

    async fn reset_credentials(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::ResetCredentials {
            user: user.clone(),
            kind: credential.kind().clone(),
        });
        self.faults.check("reset_credentials")?;

        let mut record = self
            .users
            .get_mut(user)
            .ok_or_else(|| Self::not_found(user))?;
        record
            .credentials
            .retain(|existing| existing.kind() != credential.kind());
        record.credentials.push(credential.clone());
        Ok(())
    }

    async fn add_credential(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::AddCredential {
            user: user.clone(),
            kind: credential.kind().clone(),
        });
        self.faults.check("add_credential")?;

        let mut record = self
            .users
            .get_mut(user)
            .ok_or_else(|| Self::not_found(user))?;
        if record.credentials.contains(credential) {
            return Err(IdentityStoreError::validation(format!(
                "{} credential already present",
                credential.kind().as_str()
            )));
        }
        record.credentials.push(credential.clone());
        Ok(())
    }

    async fn remove_credential(
        &self,
        user: &UserIdentifier,
        credential: &Credential,
    ) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::RemoveCredential {
            user: user.clone(),
            kind: credential.kind().clone(),
        });
        self.faults.check("remove_credential")?;

        let mut record = self
            .users
            .get_mut(user)
            .ok_or_else(|| Self::not_found(user))?;
        let before = record.credentials.len();
        record.credentials.retain(|existing| existing != credential);
        if record.credentials.len() == before {
            return Err(IdentityStoreError::validation(format!(
                "{} credential not present",
                credential.kind().as_str()
            )));
        }
        Ok(())
    }

    async fn drop_user(&self, user: &UserIdentifier) -> IdentityStoreResult<()> {
        self.journal.record(StoreCall::DropUser { user: user.clone() });
        self.faults.check("drop_user")?;

        let (_, record) = self.users.remove(user).ok_or_else(|| Self::not_found(user))?;
        self.links.unregister_entry(&record.entry);
        tracing::debug!(user = %user, store = %self.id, "Dropped user entry");
        Ok(())
    }
}
