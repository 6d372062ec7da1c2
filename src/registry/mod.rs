//! Generic "have I seen this key recently" ledger.
//!
//! The registry stores `(key, deadline)` pairs and answers whether a key
//! was already recorded and has not yet expired. Each entry carries its
//! own deadline, fixed at record time, so deduplicators with different
//! windows can share one registry without the shorter window pruning the
//! longer one's keys. The registry has no side effects beyond its own
//! storage; the deduplicators layered on top decide what a duplicate hit
//! means. Expired entries are pruned inline after each insertion rather
//! than by a background task, which bounds memory at the cost of a small
//! amortized scan.

pub mod fingerprint;

pub use fingerprint::Fingerprint;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// A content-addressed dedup ledger with expiry.
///
/// Implementations must be safe for concurrent use; the reference
/// implementation is a mutex-guarded map, which is sufficient for the
/// single-process deployment this bot targets.
pub trait HashRegistry: Send + Sync {
    /// Records `key` with a deadline of now plus `expiry` if it is absent
    /// or already expired, returning `true`. Returns `false` on a
    /// duplicate hit without refreshing the stored deadline.
    fn record_if_new(&self, key: &Fingerprint, expiry: Duration) -> bool;

    /// Removes a key so a legitimate retry is not suppressed (used when the
    /// guarded operation failed after the key was registered).
    fn forget(&self, key: &Fingerprint);
}

/// In-memory registry for the single-instance deployment.
///
/// The map value is the entry's expiry deadline, not its recording time.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: moves a key's deadline `by` closer so expiry paths can
    /// be exercised without sleeping.
    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &Fingerprint, by: Duration) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(deadline) = entries.get_mut(key.as_str()) {
            *deadline -= by;
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl HashRegistry for InMemoryRegistry {
    fn record_if_new(&self, key: &Fingerprint, expiry: Duration) -> bool {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();

        if let Some(deadline) = entries.get(key.as_str()) {
            if *deadline > now {
                return false;
            }
        }

        entries.insert(key.as_str().to_string(), now + expiry);
        // Amortized purge on each entry's own deadline, so short-window
        // callers never evict a longer window's live keys.
        entries.retain(|_, deadline| *deadline > now);
        true
    }

    fn forget(&self, key: &Fingerprint) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key.as_str());
    }
}
