//! Once-resolved entry identifier slot.

use std::future::Future;
use std::sync::OnceLock;

use idm_model::EntryIdentifier;

/// Holds the entry identifier of a user once it has been resolved.
///
/// The slot moves from unresolved to resolved exactly once and never back.
/// Resolution is compute-then-store with first-write-wins: concurrent callers
/// that both find the slot empty may each run the resolver, but only the
/// first stored value is kept and every caller receives that value. A failed
/// resolution stores nothing.
#[derive(Debug, Default)]
pub struct EntryIdCell {
    slot: OnceLock<EntryIdentifier>,
}

impl EntryIdCell {
    /// Creates an unresolved cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Returns the resolved identifier without resolving.
    #[must_use]
    pub fn get(&self) -> Option<&EntryIdentifier> {
        self.slot.get()
    }

    /// Checks whether the identifier has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns the stored identifier, running `resolve` if there is none yet.
    ///
    /// ## Errors
    ///
    /// Returns the resolver's error unchanged; the cell stays unresolved.
    pub async fn get_or_resolve<F, Fut, E>(&self, resolve: F) -> Result<&EntryIdentifier, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EntryIdentifier, E>>,
    {
        if let Some(entry) = self.slot.get() {
            return Ok(entry);
        }

        let resolved = resolve().await?;
        Ok(self.slot.get_or_init(|| resolved))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn resolves_once() {
        let cell = EntryIdCell::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let entry = cell
                .get_or_resolve(move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(EntryIdentifier::new("e-1"))
                })
                .await
                .unwrap();
            assert_eq!(entry.as_str(), "e-1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cell.is_resolved());
    }

    #[tokio::test]
    async fn failure_leaves_cell_unresolved() {
        let cell = EntryIdCell::new();

        let result = cell
            .get_or_resolve(|| async { Err::<EntryIdentifier, _>("backend down") })
            .await;
        assert_eq!(result, Err("backend down"));
        assert!(!cell.is_resolved());
        assert!(cell.get().is_none());

        let entry = cell
            .get_or_resolve(|| async { Ok::<_, &str>(EntryIdentifier::new("e-2")) })
            .await
            .unwrap();
        assert_eq!(entry.as_str(), "e-2");
    }

    #[tokio::test]
    async fn first_write_wins() {
        let cell = EntryIdCell::new();
        let racing = &cell;

        // A resolution that finishes after another caller has already stored
        // a value must not replace it.
        let late = cell
            .get_or_resolve(move || async move {
                let _ = racing.slot.set(EntryIdentifier::new("first"));
                Ok::<_, ()>(EntryIdentifier::new("second"))
            })
            .await
            .unwrap();

        assert_eq!(late.as_str(), "first");
        assert_eq!(cell.get().map(EntryIdentifier::as_str), Some("first"));
    }
}
