//! Call journal and fault injection shared by the in-memory stores.

use std::collections::{HashMap, VecDeque};

use idm_model::{
    Claim, ClaimIdentifier, CredentialKind, DialectIdentifier, EntryIdentifier, GroupIdentifier,
    Permission, ProfileIdentifier, RoleIdentifier, UserIdentifier,
};
use idm_store::{GroupSearchCriteria, RoleSearchCriteria};
use parking_lot::Mutex;

/// One recorded store call, with the arguments it received.
///
/// Credentials are recorded by kind only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `IdentityStore::resolve_entry_id`.
    ResolveEntryId {
        /// Bound user.
        user: UserIdentifier,
    },
    /// `IdentityStore::list_groups`.
    ListGroups {
        /// Bound user.
        user: UserIdentifier,
        /// Search criteria, if any.
        criteria: Option<GroupSearchCriteria>,
    },
    /// `IdentityStore::get_attributes`.
    GetAttributes {
        /// Bound user.
        user: UserIdentifier,
        /// Claim dialect.
        dialect: DialectIdentifier,
        /// Requested or written claims.
        claims: Option<Vec<ClaimIdentifier>>,
        /// Profile, `None` for the store default.
        profile: Option<ProfileIdentifier>,
    },
    /// `IdentityStore::add_attributes`.
    AddAttributes {
        /// Bound user.
        user: UserIdentifier,
        /// Claim dialect.
        dialect: DialectIdentifier,
        /// Requested or written claims.
        claims: Vec<Claim>,
        /// Profile, `None` for the store default.
        profile: Option<ProfileIdentifier>,
    },
    /// `IdentityStore::list_profiles`.
    ListProfiles {
        /// Bound user.
        user: UserIdentifier,
        /// Claim dialect.
        dialect: DialectIdentifier,
        /// Requested or written claims.
        claims: Vec<ClaimIdentifier>,
    },
    /// `IdentityStore::add_to_groups`.
    AddToGroups {
        /// Bound user.
        user: UserIdentifier,
        /// Groups joined.
        groups: Vec<GroupIdentifier>,
    },
    /// `IdentityStore::is_in_group`.
    IsInGroup {
        /// Bound user.
        user: UserIdentifier,
        /// Group checked.
        group: GroupIdentifier,
    },
    /// `IdentityStore::reset_credentials`.
    ResetCredentials {
        /// Bound user.
        user: UserIdentifier,
        /// Credential kind.
        kind: CredentialKind,
    },
    /// `IdentityStore::add_credential`.
    AddCredential {
        /// Bound user.
        user: UserIdentifier,
        /// Credential kind.
        kind: CredentialKind,
    },
    /// `IdentityStore::remove_credential`.
    RemoveCredential {
        /// Bound user.
        user: UserIdentifier,
        /// Credential kind.
        kind: CredentialKind,
    },
    /// `IdentityStore::drop_user`.
    DropUser {
        /// Bound user.
        user: UserIdentifier,
    },
    /// `LinkedAccountStore::link`.
    Link {
        /// Source entry, `None` when unresolved.
        source: Option<EntryIdentifier>,
        /// Target entry.
        target: EntryIdentifier,
    },
    /// `LinkedAccountStore::unlink`.
    Unlink {
        /// Source entry, `None` when unresolved.
        source: Option<EntryIdentifier>,
        /// Target entry.
        target: EntryIdentifier,
    },
    /// `LinkedAccountStore::list_linked`.
    ListLinked {
        /// Source entry, `None` when unresolved.
        source: Option<EntryIdentifier>,
    },
    /// `AuthorizationStore::list_roles`.
    ListRoles {
        /// Bound user.
        user: UserIdentifier,
        /// Search criteria, if any.
        criteria: Option<RoleSearchCriteria>,
    },
    /// `AuthorizationStore::assign_roles`.
    AssignRoles {
        /// Bound user.
        user: UserIdentifier,
        /// Roles assigned.
        roles: Vec<RoleIdentifier>,
    },
    /// `AuthorizationStore::assign_role`.
    AssignRole {
        /// Bound user.
        user: UserIdentifier,
        /// Role assigned or checked.
        role: RoleIdentifier,
    },
    /// `AuthorizationStore::has_role`.
    HasRole {
        /// Bound user.
        user: UserIdentifier,
        /// Role assigned or checked.
        role: RoleIdentifier,
    },
    /// `AuthorizationStore::has_permission`.
    HasPermission {
        /// Bound user.
        user: UserIdentifier,
        /// Permission checked.
        permission: Permission,
    },
}

impl StoreCall {
    /// Returns the name of the store operation, as used by [`Faults`].
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::ResolveEntryId { .. } => "resolve_entry_id",
            Self::ListGroups { .. } => "list_groups",
            Self::GetAttributes { .. } => "get_attributes",
            Self::AddAttributes { .. } => "add_attributes",
            Self::ListProfiles { .. } => "list_profiles",
            Self::AddToGroups { .. } => "add_to_groups",
            Self::IsInGroup { .. } => "is_in_group",
            Self::ResetCredentials { .. } => "reset_credentials",
            Self::AddCredential { .. } => "add_credential",
            Self::RemoveCredential { .. } => "remove_credential",
            Self::DropUser { .. } => "drop_user",
            Self::Link { .. } => "link",
            Self::Unlink { .. } => "unlink",
            Self::ListLinked { .. } => "list_linked",
            Self::ListRoles { .. } => "list_roles",
            Self::AssignRoles { .. } => "assign_roles",
            Self::AssignRole { .. } => "assign_role",
            Self::HasRole { .. } => "has_role",
            Self::HasPermission { .. } => "has_permission",
        }
    }
}

/// Ordered record of the calls a store received.
#[derive(Debug, Default)]
pub struct CallJournal {
    calls: Mutex<Vec<StoreCall>>,
}

impl CallJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    /// Returns a copy of every recorded call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Returns the calls of one operation, oldest first.
    #[must_use]
    pub fn calls_of(&self, operation: &str) -> Vec<StoreCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation() == operation)
            .cloned()
            .collect()
    }

    /// Counts the calls of one operation.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Returns the most recent call.
    #[must_use]
    pub fn last(&self) -> Option<StoreCall> {
        self.calls.lock().last().cloned()
    }

    /// Forgets every recorded call.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Errors queued to be returned by the next calls of given operations.
#[derive(Debug)]
pub struct Faults<E> {
    pending: Mutex<HashMap<&'static str, VecDeque<E>>>,
}

impl<E> Default for Faults<E> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl<E> Faults<E> {
    /// Queues an error for the next call of `operation`.
    pub fn push(&self, operation: &'static str, error: E) {
        self.pending
            .lock()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Takes the next queued error for `operation`, if any.
    ///
    /// ## Errors
    ///
    /// Returns the queued error.
    pub fn check(&self, operation: &'static str) -> Result<(), E> {
        match self
            .pending
            .lock()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
