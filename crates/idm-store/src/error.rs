//! Store error types.
//!
//! One error family per backend capability. The facade never converts
//! between them: whatever a store returns is what the caller sees.

use idm_model::{GroupIdentifier, RoleIdentifier, UserIdentifier};
use thiserror::Error;

/// Errors raised by an identity store.
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    /// The user has no entry in the store.
    #[error("user not found: {0}")]
    UserNotFound(UserIdentifier),

    /// A referenced group does not exist.
    #[error("group not found: {0}")]
    GroupNotFound(GroupIdentifier),

    /// The store rejected the data (malformed claim, bad credential shape, ...).
    #[error("validation rejected: {0}")]
    Validation(String),

    /// The backend could not be reached.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time.
    #[error("identity store timed out: {0}")]
    Timeout(String),

    /// The backend call was cancelled.
    #[error("identity store call cancelled")]
    Cancelled,

    /// Any other backend failure.
    #[error("identity store error: {0}")]
    Backend(String),
}

impl IdentityStoreError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a generic backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::GroupNotFound(_))
    }

    /// Checks if retrying later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Errors raised by an authorization store.
#[derive(Debug, Error)]
pub enum AuthorizationStoreError {
    /// The user is unknown to the authorization store.
    #[error("user not found: {0}")]
    UserNotFound(UserIdentifier),

    /// A referenced role does not exist.
    #[error("role not found: {0}")]
    RoleNotFound(RoleIdentifier),

    /// The store rejected the request.
    #[error("validation rejected: {0}")]
    Validation(String),

    /// The backend could not be reached.
    #[error("authorization store unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time.
    #[error("authorization store timed out: {0}")]
    Timeout(String),

    /// The backend call was cancelled.
    #[error("authorization store call cancelled")]
    Cancelled,

    /// Any other backend failure.
    #[error("authorization store error: {0}")]
    Backend(String),
}

impl AuthorizationStoreError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a generic backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::RoleNotFound(_))
    }

    /// Checks if retrying later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Errors raised while linking or unlinking accounts.
#[derive(Debug, Error)]
pub enum AccountLinkError {
    /// The two entries are already linked.
    #[error("accounts already linked: {source_entry} -> {target_entry}")]
    AlreadyLinked {
        /// Source entry.
        source_entry: String,
        /// Target entry.
        target_entry: String,
    },

    /// The two entries are not linked.
    #[error("accounts not linked: {source_entry} -> {target_entry}")]
    NotLinked {
        /// Source entry.
        source_entry: String,
        /// Target entry.
        target_entry: String,
    },

    /// The pair cannot be linked (self-link, unknown entry, ...).
    #[error("invalid link pair: {0}")]
    InvalidPair(String),

    /// The request carried no source entry identifier.
    #[error("source entry identifier is unset")]
    UnsetSource,

    /// The link store could not be reached.
    #[error("link store unavailable: {0}")]
    Unavailable(String),

    /// Any other link-store failure.
    #[error("link store error: {0}")]
    Backend(String),

    /// Resolving the source entry through the identity store failed.
    #[error(transparent)]
    Identity(#[from] IdentityStoreError),
}

impl AccountLinkError {
    /// Creates an already-linked error.
    #[must_use]
    pub fn already_linked(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::AlreadyLinked {
            source_entry: source.into(),
            target_entry: target.into(),
        }
    }

    /// Creates a not-linked error.
    #[must_use]
    pub fn not_linked(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::NotLinked {
            source_entry: source.into(),
            target_entry: target.into(),
        }
    }

    /// Creates an invalid pair error.
    #[must_use]
    pub fn invalid_pair(msg: impl Into<String>) -> Self {
        Self::InvalidPair(msg.into())
    }

    /// Checks if the error is about the state of the link itself.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyLinked { .. } | Self::NotLinked { .. })
    }
}

/// Result type for identity store operations.
pub type IdentityStoreResult<T> = Result<T, IdentityStoreError>;

/// Result type for authorization store operations.
pub type AuthorizationStoreResult<T> = Result<T, AuthorizationStoreError>;

/// Result type for account-link operations.
pub type AccountLinkResult<T> = Result<T, AccountLinkError>;
