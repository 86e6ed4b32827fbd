//! Authorization store capability.

use async_trait::async_trait;
use idm_model::{Permission, PrivilegedRole, RoleIdentifier, UserIdentifier};

use crate::error::AuthorizationStoreResult;

/// Backend holding role memberships and permission grants.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Lists the roles of a user, optionally filtered.
    async fn list_roles(
        &self,
        user: &UserIdentifier,
        criteria: Option<&RoleSearchCriteria>,
    ) -> AuthorizationStoreResult<Vec<PrivilegedRole>>;

    /// Assigns several roles in one request.
    ///
    /// Implementations may apply their own batching or transaction
    /// semantics; callers must not assume it equals repeated
    /// [`assign_role`](Self::assign_role) calls.
    async fn assign_roles(
        &self,
        user: &UserIdentifier,
        roles: &[RoleIdentifier],
    ) -> AuthorizationStoreResult<()>;

    /// Assigns a single role.
    ///
    /// ## Errors
    ///
    /// Returns `AuthorizationStoreError::RoleNotFound` if the role doesn't exist.
    async fn assign_role(
        &self,
        user: &UserIdentifier,
        role: &RoleIdentifier,
    ) -> AuthorizationStoreResult<()>;

    /// Checks if the user holds a role.
    async fn has_role(
        &self,
        user: &UserIdentifier,
        role: &RoleIdentifier,
    ) -> AuthorizationStoreResult<bool>;

    /// Checks if any role of the user grants a permission.
    async fn has_permission(
        &self,
        user: &UserIdentifier,
        permission: &Permission,
    ) -> AuthorizationStoreResult<bool>;
}

/// Search criteria for role listings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoleSearchCriteria {
    /// Search string (matches role identifier or name).
    pub search: Option<String>,
    /// Only roles granting this permission.
    pub permission: Option<Permission>,
    /// Maximum results to return.
    pub max_results: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl RoleSearchCriteria {
    /// Creates empty criteria (matches everything).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search: None,
            permission: None,
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

    /// Restricts to roles granting a permission.
    #[must_use]
    pub fn granting(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
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

    /// Checks if a role satisfies the search string and permission filter.
    #[must_use]
    pub fn matches(&self, role: &PrivilegedRole) -> bool {
        let name_ok = self.search.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            role.identifier.as_str().to_lowercase().contains(&needle)
                || role.name.to_lowercase().contains(&needle)
        });
        let permission_ok = self
            .permission
            .as_ref()
            .map_or(true, |permission| role.grants(permission));
        name_ok && permission_ok
    }

    /// Applies offset and limit to an already filtered result.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let max = self.max_results.unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(max).collect()
    }
}
