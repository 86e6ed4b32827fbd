//! Credential material.
//!
//! A credential is opaque to everything except the identity store that
//! persists it. The model only records what kind of secret it is so that
//! stores can route it; the bytes themselves are never inspected here.
//!
//! ## Security Note
//!
//! `Debug` output never includes the secret bytes, and the type does not
//! implement `Serialize`, so credentials cannot end up in logs or audit
//! records by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of secret material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// Password (plaintext or pre-hashed, as the store expects).
    Password,
    /// X.509 certificate.
    Certificate,
    /// Public or private key material.
    Key,
    /// Store-specific credential type.
    Other(String),
}

impl CredentialKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Password => "password",
            Self::Certificate => "certificate",
            Self::Key => "key",
            Self::Other(kind) => kind,
        }
    }
}

/// Secret material for a user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    label: Option<String>,
    secret: Vec<u8>,
}

impl Credential {
    /// Creates a credential of the given kind.
    #[must_use]
    pub fn new(kind: CredentialKind, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            label: None,
            secret: secret.into(),
        }
    }

    /// Creates a password credential.
    #[must_use]
    pub fn password(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(CredentialKind::Password, secret)
    }

    /// Creates a certificate credential from DER or PEM bytes.
    #[must_use]
    pub fn certificate(der_or_pem: impl Into<Vec<u8>>) -> Self {
        Self::new(CredentialKind::Certificate, der_or_pem)
    }

    /// Creates a key credential.
    #[must_use]
    pub fn key(material: impl Into<Vec<u8>>) -> Self {
        Self::new(CredentialKind::Key, material)
    }

    /// Sets a user-facing label (e.g., "laptop key").
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the credential kind.
    #[must_use]
    pub const fn kind(&self) -> &CredentialKind {
        &self.kind
    }

    /// Returns the label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the secret bytes.
    ///
    /// Only identity stores should call this.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("secret", &"<redacted>")
            .finish()
    }
}
