//! Role membership projection and permissions.
//!
//! Roles come from the authorization store. A role carries the permissions
//! it grants so that callers can reason about them without a second lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::RoleIdentifier;

/// An action on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Resource the permission applies to (for example `/users`).
    pub resource: String,
    /// Action allowed on the resource (for example `read`).
    pub action: String,
}

impl Permission {
    /// Creates a new permission.
    #[must_use]
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// Read-only view of a role assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegedRole {
    /// Role key.
    pub identifier: RoleIdentifier,
    /// Display name.
    pub name: String,
    /// Permissions granted by this role.
    pub permissions: Vec<Permission>,
}

impl PrivilegedRole {
    /// Creates a role whose display name equals its identifier.
    #[must_use]
    pub fn new(identifier: impl Into<RoleIdentifier>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.as_str().to_owned(),
            identifier,
            permissions: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a granted permission.
    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Checks if this role grants the permission.
    #[must_use]
    pub fn grants(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}
