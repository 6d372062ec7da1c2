//! Negotiation record storage and lifecycle enforcement.
//!
//! The store is the single authority on state transitions: a record is
//! checked and flipped under one lock, so two concurrent decisions on the
//! same request cannot both succeed. Resolved records are removed from the
//! active table immediately; a small resolution ledger keeps their IDs for
//! a day so that a late duplicate decision can be distinguished from a
//! decision on a request that never existed.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::DecideError;
use crate::types::{Decision, RequestId, RequestStatus, SwapRequest, UserId};

/// How long a resolved request ID is remembered for `AlreadyResolved`
/// reporting after the record itself is gone.
pub const RESOLVED_LEDGER_TTL_SECS: i64 = 86_400;

/// Storage seam for negotiation records.
///
/// The single-process deployment uses [`InMemoryStore`]; a multi-instance
/// deployment would put a shared database behind this trait.
pub trait NegotiationStore: Send + Sync {
    /// Inserts a pending record, replacing any active record with the same
    /// ID (the caller has already ruled the old one stale).
    fn create(&self, request: SwapRequest);

    /// Looks up an active (pending) record.
    fn find(&self, id: &RequestId) -> Option<SwapRequest>;

    /// Applies a decision: checks the record exists, checks `decider` is
    /// its target, flips the status, stamps `responded_at`, removes the
    /// record from the active table, and remembers the resolution. All of
    /// that happens atomically; on any error the record is unchanged.
    fn resolve(
        &self,
        id: &RequestId,
        decider: &UserId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<SwapRequest, DecideError>;

    /// Removes every pending record older than `ttl`, marking each
    /// `Expired`, and returns them so the caller can archive them.
    fn expire_older_than(&self, ttl: Duration, now: DateTime<Utc>) -> Vec<SwapRequest>;
}

#[derive(Debug, Default)]
struct StoreInner {
    active: HashMap<RequestId, SwapRequest>,
    /// Resolution ledger: `(final status, resolved at)` per recently
    /// resolved ID. Pruned inline on every resolve.
    resolved: HashMap<RequestId, (RequestStatus, DateTime<Utc>)>,
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: rewrites a record's creation time so duplicate-window
    /// and expiry paths can be exercised without sleeping.
    #[cfg(test)]
    pub(crate) fn backdate_created(&self, id: &RequestId, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(request) = inner.active.get_mut(id) {
            request.created_at = created_at;
        }
    }
}

impl NegotiationStore for InMemoryStore {
    fn create(&self, request: SwapRequest) {
        let mut inner = self.inner.lock().unwrap();
        inner.active.insert(request.request_id.clone(), request);
    }

    fn find(&self, id: &RequestId) -> Option<SwapRequest> {
        let inner = self.inner.lock().unwrap();
        inner.active.get(id).cloned()
    }

    fn resolve(
        &self,
        id: &RequestId,
        decider: &UserId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<SwapRequest, DecideError> {
        let ledger_cutoff = now - Duration::seconds(RESOLVED_LEDGER_TTL_SECS);
        let mut inner = self.inner.lock().unwrap();
        inner
            .resolved
            .retain(|_, (_, resolved_at)| *resolved_at > ledger_cutoff);

        let Some(mut request) = inner.active.remove(id) else {
            if inner.resolved.contains_key(id) {
                return Err(DecideError::AlreadyResolved);
            }
            return Err(DecideError::NotFound);
        };

        if request.target_id != *decider {
            // Put the untouched record back; only the target may decide.
            inner.active.insert(id.clone(), request);
            return Err(DecideError::Forbidden);
        }

        request.status = decision.into();
        request.responded_at = Some(now);
        inner.resolved.insert(id.clone(), (request.status, now));
        Ok(request)
    }

    fn expire_older_than(&self, ttl: Duration, now: DateTime<Utc>) -> Vec<SwapRequest> {
        let cutoff = now - ttl;
        let mut inner = self.inner.lock().unwrap();
        let stale: Vec<RequestId> = inner
            .active
            .iter()
            .filter(|(_, request)| request.created_at <= cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        let mut expired = Vec::with_capacity(stale.len());
        for id in stale {
            if let Some(mut request) = inner.active.remove(&id) {
                request.status = RequestStatus::Expired;
                // responded_at stays None: nobody decided anything.
                expired.push(request);
            }
        }
        expired
    }
}
