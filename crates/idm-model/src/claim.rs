//! Claims and profiles.
//!
//! A claim is a named attribute value of a user, qualified by a dialect.
//! Profiles group the claims that are visible in a given scope.

use serde::{Deserialize, Serialize};

use crate::ids::{ClaimIdentifier, DialectIdentifier, ProfileIdentifier};

/// A single user attribute value under a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Dialect the claim identifier belongs to.
    pub dialect: DialectIdentifier,
    /// Claim identifier inside the dialect.
    pub identifier: ClaimIdentifier,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a new claim.
    #[must_use]
    pub fn new(
        dialect: impl Into<DialectIdentifier>,
        identifier: impl Into<ClaimIdentifier>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            identifier: identifier.into(),
            value: value.into(),
        }
    }

    /// Checks whether this claim has the given dialect and identifier.
    #[must_use]
    pub fn is(&self, dialect: &DialectIdentifier, identifier: &ClaimIdentifier) -> bool {
        &self.dialect == dialect && &self.identifier == identifier
    }
}

/// A named scope and the claims it exposes for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name.
    pub identifier: ProfileIdentifier,
    /// Claims visible in this profile.
    pub claims: Vec<Claim>,
}

impl Profile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(identifier: impl Into<ProfileIdentifier>) -> Self {
        Self {
            identifier: identifier.into(),
            claims: Vec::new(),
        }
    }

    /// Adds a claim to the profile.
    #[must_use]
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Finds a claim value by identifier.
    #[must_use]
    pub fn claim_value(&self, identifier: &ClaimIdentifier) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| &c.identifier == identifier)
            .map(|c| c.value.as_str())
    }
}

/// Well-known profile names.
pub mod profiles {
    /// Profile used by stores when no profile is requested.
    pub const DEFAULT: &str = "default";
    /// Profile holding publicly visible claims.
    pub const PUBLIC: &str = "public";
}
