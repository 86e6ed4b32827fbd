//! In-memory linked-account store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use idm_model::{EntryIdentifier, UserIdentifier};
use idm_store::{AccountLinkError, AccountLinkResult, LinkedAccountStore};
use parking_lot::RwLock;

use crate::journal::{CallJournal, Faults, StoreCall};

/// In-memory linked-account store.
///
/// Links are symmetric: linking `a` to `b` also makes `a` show up in the
/// linked accounts of `b`. Only registered entries can be linked, and a
/// missing source identifier is rejected with
/// [`AccountLinkError::UnsetSource`].
#[derive(Debug, Default)]
pub struct MemoryLinkedAccountStore {
    owners: DashMap<EntryIdentifier, UserIdentifier>,
    links: RwLock<BTreeSet<(EntryIdentifier, EntryIdentifier)>>,
    journal: CallJournal,
    faults: Faults<AccountLinkError>,
}

impl MemoryLinkedAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes an entry linkable and records which user owns it.
    ///
    /// Entries from other identity domains are registered the same way.
    pub fn register_entry(&self, entry: impl Into<EntryIdentifier>, owner: impl Into<UserIdentifier>) {
        self.owners.insert(entry.into(), owner.into());
    }

    /// Removes an entry and every link it takes part in.
    ///
    /// The entry can no longer be linked, unlinked or listed afterwards.
    pub fn unregister_entry(&self, entry: &EntryIdentifier) {
        self.owners.remove(entry);
        self.links
            .write()
            .retain(|(a, b)| a != entry && b != entry);
    }

    /// Checks whether two entries are linked, in either direction.
    #[must_use]
    pub fn are_linked(&self, a: &EntryIdentifier, b: &EntryIdentifier) -> bool {
        self.links.read().contains(&pair(a, b))
    }

    /// Returns the number of stored links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.read().len()
    }

    /// Calls received so far.
    #[must_use]
    pub const fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: AccountLinkError) {
        self.faults.push(operation, error);
    }

    fn checked_pair<'a>(
        &self,
        source: Option<&'a EntryIdentifier>,
        target: &'a EntryIdentifier,
    ) -> AccountLinkResult<(&'a EntryIdentifier, &'a EntryIdentifier)> {
        let source = source.ok_or(AccountLinkError::UnsetSource)?;
        if source == target {
            return Err(AccountLinkError::invalid_pair(format!(
                "cannot link {source} to itself"
            )));
        }
        for entry in [source, target] {
            if !self.owners.contains_key(entry) {
                return Err(AccountLinkError::invalid_pair(format!("unknown entry {entry}")));
            }
        }
        Ok((source, target))
    }
}

fn pair(a: &EntryIdentifier, b: &EntryIdentifier) -> (EntryIdentifier, EntryIdentifier) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[async_trait]
impl LinkedAccountStore for MemoryLinkedAccountStore {
    async fn link(
        &self,
        source: Option<&EntryIdentifier>,
        target: &EntryIdentifier,
    ) -> AccountLinkResult<()> {
        self.journal.record(StoreCall::Link {
            source: source.cloned(),
            target: target.clone(),
        });
        self.faults.check("link")?;

        let (source, target) = self.checked_pair(source, target)?;
        if !self.links.write().insert(pair(source, target)) {
            return Err(AccountLinkError::already_linked(source.as_str(), target.as_str()));
        }

        tracing::debug!(source = %source, target = %target, "Linked accounts");
        Ok(())
    }

    async fn unlink(
        &self,
        source: Option<&EntryIdentifier>,
        target: &EntryIdentifier,
    ) -> AccountLinkResult<()> {
        self.journal.record(StoreCall::Unlink {
            source: source.cloned(),
            target: target.clone(),
        });
        self.faults.check("unlink")?;

        let (source, target) = self.checked_pair(source, target)?;
        if !self.links.write().remove(&pair(source, target)) {
            return Err(AccountLinkError::not_linked(source.as_str(), target.as_str()));
        }

        tracing::debug!(source = %source, target = %target, "Unlinked accounts");
        Ok(())
    }

    async fn list_linked(
        &self,
        source: Option<&EntryIdentifier>,
    ) -> AccountLinkResult<Vec<UserIdentifier>> {
        self.journal.record(StoreCall::ListLinked {
            source: source.cloned(),
        });
        self.faults.check("list_linked")?;

        let source = source.ok_or(AccountLinkError::UnsetSource)?;
        if !self.owners.contains_key(source) {
            return Err(AccountLinkError::invalid_pair(format!("unknown entry {source}")));
        }
        let linked: Vec<EntryIdentifier> = self
            .links
            .read()
            .iter()
            .filter_map(|(a, b)| {
                if a == source {
                    Some(b.clone())
                } else if b == source {
                    Some(a.clone())
                } else {
                    None
                }
            })
            .collect();

        Ok(linked
            .iter()
            .filter_map(|entry| self.owners.get(entry).map(|owner| owner.value().clone()))
            .collect())
    }
}
