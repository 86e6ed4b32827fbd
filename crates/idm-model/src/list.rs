//! Read-only snapshot collection.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// An owned, immutable snapshot of a listing result.
///
/// Cloning is cheap and shares the same backing slice. No mutable access is
/// exposed, so a holder can never change what another holder sees. Callers
/// that need to edit the data take a copy with [`ReadOnlyList::to_vec`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReadOnlyList<T> {
    items: Arc<[T]>,
}

impl<T> ReadOnlyList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Returns the items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Checks whether two lists share the same backing snapshot.
    #[must_use]
    pub fn shares_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<T: Clone> ReadOnlyList<T> {
    /// Copies the items into a new, independently owned vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Clone for ReadOnlyList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for ReadOnlyList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for ReadOnlyList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for ReadOnlyList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }
}

impl<T> FromIterator<T> for ReadOnlyList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ReadOnlyList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for ReadOnlyList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.as_ref().serialize(serializer)
    }
}
