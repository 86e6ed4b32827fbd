//! Group membership projection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::GroupIdentifier;

/// Read-only view of a group a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegedGroup {
    /// Group key.
    pub identifier: GroupIdentifier,
    /// Display name.
    pub name: String,
    /// Free-form group attributes.
    pub attributes: HashMap<String, Vec<String>>,
}

impl PrivilegedGroup {
    /// Creates a group whose display name equals its identifier.
    #[must_use]
    pub fn new(identifier: impl Into<GroupIdentifier>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.as_str().to_owned(),
            identifier,
            attributes: HashMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}
