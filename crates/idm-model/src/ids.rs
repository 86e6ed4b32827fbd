//! Identifier value types.
//!
//! Every identifier is an immutable newtype over a string. They are used as
//! keys across both the identity store and the authorization store, so they
//! carry no backend-specific structure of their own.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_identifier!(
    /// Stable key for a user within one identity store's namespace.
    ///
    /// Supplied by the caller when a facade is built; never regenerated.
    UserIdentifier
);

string_identifier!(
    /// Backend-specific physical record key for a user entry.
    ///
    /// Distinct from [`UserIdentifier`]: an identity store maps the user
    /// identifier to an entry identifier when asked to resolve it.
    EntryIdentifier
);

string_identifier!(
    /// Key of a group in the identity store.
    GroupIdentifier
);

string_identifier!(
    /// Key of a role in the authorization store.
    RoleIdentifier
);

string_identifier!(
    /// Names one identity-store instance.
    ///
    /// Callers compare these before comparing users so that they never mix
    /// identifiers coming from different stores.
    StoreIdentifier
);

string_identifier!(
    /// Namespace qualifying claim identifiers (for example a URI prefix).
    DialectIdentifier
);

string_identifier!(
    /// Name of a claim inside a dialect.
    ClaimIdentifier
);

string_identifier!(
    /// Name of a profile, the scope that narrows which claims apply.
    ProfileIdentifier
);
