//! Shared storage for the last observed value of a response header.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

static GLOBAL: LazyLock<CapturedHeader> = LazyLock::new(CapturedHeader::new);

/// A cloneable handle to a single captured header value.
///
/// All clones share one cell. Writes replace the stored value as a whole, so
/// concurrent readers observe either the old value or the new one. When several
/// responses race, the last writer wins.
///
/// [`CapturedHeader::global`] is the process-wide cell that clients built by
/// [`crate::new_http_client`] record the SSO challenge into by default. Tests and
/// embedders that need isolation create their own with [`CapturedHeader::new`].
#[derive(Debug, Clone, Default)]
pub struct CapturedHeader {
    value: Arc<RwLock<Option<String>>>,
}

impl CapturedHeader {
    /// Creates an empty cell, independent from every other one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the process-wide cell.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Returns the last captured value, or `None` if nothing was captured yet.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the captured value.
    pub fn set(&self, value: impl Into<String>) {
        let value = value.into();
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Reports whether `self` and `other` share the same cell.
    #[must_use]
    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::thread;

    use super::*;

    #[test]
    fn test_starts_empty() {
        assert_eq!(CapturedHeader::new().get(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let cell = CapturedHeader::new();
        cell.set("first");
        cell.set("second");
        assert_eq!(cell.get().as_deref(), Some("second"));
    }

    #[test]
    fn test_clones_share_storage() {
        let cell = CapturedHeader::new();
        let other = cell.clone();
        other.set("shared");
        assert_eq!(cell.get().as_deref(), Some("shared"));
        assert!(cell.same_cell(&other));
        assert!(!cell.same_cell(&CapturedHeader::new()));
    }

    #[test]
    fn test_global_is_a_singleton() {
        assert!(CapturedHeader::global().same_cell(&CapturedHeader::global()));
    }

    #[test]
    fn test_concurrent_writes_never_tear() {
        let cell = CapturedHeader::new();
        let values: Vec<String> = (0..8).map(|i| format!("value-{i}-{}", "x".repeat(64))).collect();

        let handles: Vec<_> = values
            .iter()
            .cloned()
            .map(|value| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        cell.set(value.clone());
                        let seen = cell.get().unwrap();
                        assert!(seen.starts_with("value-") && seen.len() == value.len());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(values.contains(&cell.get().unwrap()));
    }
}
