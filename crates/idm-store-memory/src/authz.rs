//! In-memory authorization store.

use async_trait::async_trait;
use dashmap::DashMap;
use idm_model::{Permission, PrivilegedRole, RoleIdentifier, UserIdentifier};
use idm_store::{
    AuthorizationStore, AuthorizationStoreError, AuthorizationStoreResult, RoleSearchCriteria,
};

use crate::journal::{CallJournal, Faults, StoreCall};

/// In-memory authorization store.
///
/// Roles must be in the catalogue before they can be assigned. A batch
/// assignment is applied as a whole or not at all. Users without any
/// assignment simply hold no roles.
#[derive(Debug, Default)]
pub struct MemoryAuthorizationStore {
    roles: DashMap<RoleIdentifier, PrivilegedRole>,
    assignments: DashMap<UserIdentifier, Vec<RoleIdentifier>>,
    journal: CallJournal,
    faults: Faults<AuthorizationStoreError>,
}

impl MemoryAuthorizationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role to the catalogue.
    #[must_use]
    pub fn with_role(self, role: PrivilegedRole) -> Self {
        self.insert_role(role);
        self
    }

    /// Adds or replaces a role in the catalogue.
    pub fn insert_role(&self, role: PrivilegedRole) {
        self.roles.insert(role.identifier.clone(), role);
    }

    /// Returns the roles assigned to a user, in assignment order.
    #[must_use]
    pub fn assigned(&self, user: &UserIdentifier) -> Vec<RoleIdentifier> {
        self.assignments
            .get(user)
            .map(|roles| roles.value().clone())
            .unwrap_or_default()
    }

    /// Calls received so far.
    #[must_use]
    pub const fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: AuthorizationStoreError) {
        self.faults.push(operation, error);
    }

    fn ensure_known(&self, roles: &[RoleIdentifier]) -> AuthorizationStoreResult<()> {
        match roles.iter().find(|role| !self.roles.contains_key(*role)) {
            Some(missing) => Err(AuthorizationStoreError::RoleNotFound(missing.clone())),
            None => Ok(()),
        }
    }

    fn grant(&self, user: &UserIdentifier, roles: &[RoleIdentifier]) {
        let mut held = self.assignments.entry(user.clone()).or_default();
        for role in roles {
            if !held.contains(role) {
                held.push(role.clone());
            }
        }
    }
}

#[async_trait]
impl AuthorizationStore for MemoryAuthorizationStore {
    async fn list_roles(
        &self,
        user: &UserIdentifier,
        criteria: Option<&RoleSearchCriteria>,
    ) -> AuthorizationStoreResult<Vec<PrivilegedRole>> {
        self.journal.record(StoreCall::ListRoles {
            user: user.clone(),
            criteria: criteria.cloned(),
        });
        self.faults.check("list_roles")?;

        let roles: Vec<PrivilegedRole> = self
            .assigned(user)
            .iter()
            .filter_map(|id| self.roles.get(id).map(|role| role.value().clone()))
            .filter(|role| criteria.map_or(true, |c| c.matches(role)))
            .collect();

        Ok(match criteria {
            Some(criteria) => criteria.paginate(roles),
            None => roles,
        })
    }

    async fn assign_roles(
        &self,
        user: &UserIdentifier,
        roles: &[RoleIdentifier],
    ) -> AuthorizationStoreResult<()> {
        self.journal.record(StoreCall::AssignRoles {
            user: user.clone(),
            roles: roles.to_vec(),
        });
        self.faults.check("assign_roles")?;

        self.ensure_known(roles)?;
        self.grant(user, roles);
        tracing::debug!(user = %user, count = roles.len(), "Assigned roles");
        Ok(())
    }

    async fn assign_role(
        &self,
        user: &UserIdentifier,
        role: &RoleIdentifier,
    ) -> AuthorizationStoreResult<()> {
        self.journal.record(StoreCall::AssignRole {
            user: user.clone(),
            role: role.clone(),
        });
        self.faults.check("assign_role")?;

        let roles = std::slice::from_ref(role);
        self.ensure_known(roles)?;
        self.grant(user, roles);
        tracing::debug!(user = %user, role = %role, "Assigned role");
        Ok(())
    }

    async fn has_role(
        &self,
        user: &UserIdentifier,
        role: &RoleIdentifier,
    ) -> AuthorizationStoreResult<bool> {
        self.journal.record(StoreCall::HasRole {
            user: user.clone(),
            role: role.clone(),
        });
        self.faults.check("has_role")?;

        Ok(self
            .assignments
            .get(user)
            .is_some_and(|held| held.contains(role)))
    }

    async fn has_permission(
        &self,
        user: &UserIdentifier,
        permission: &Permission,
    ) -> AuthorizationStoreResult<bool> {
        self.journal.record(StoreCall::HasPermission {
            user: user.clone(),
            permission: permission.clone(),
        });
        self.faults.check("has_permission")?;

        Ok(self.assigned(user).iter().any(|id| {
            self.roles
                .get(id)
                .is_some_and(|role| role.grants(permission))
        }))
    }
}
