//! Request/response correlation for one child session.
//!
//! The id space is local to a single child's stdio; ids are unique while in
//! flight and may be reused after completion. Correlation is by id, not by
//! arrival order, so responses may complete out of order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::protocol::RpcOutcome;

/// Tracks in-flight request ids for one child session and their waiters.
pub struct Correlator {
    next_id: AtomicI64,
    waiters: Mutex<HashMap<i64, oneshot::Sender<RpcOutcome>>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates a fresh request id and registers a waiter for it.
    pub fn register(&self) -> (i64, oneshot::Receiver<RpcOutcome>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Resolves the waiter for `id` with `outcome`, if one is still pending.
    /// A missing waiter (already resolved, or unknown id) is a no-op — the
    /// reader task must never fail on an unmatched response.
    pub fn resolve(&self, id: i64, outcome: RpcOutcome) {
        if let Some(tx) = self.waiters.lock().unwrap().remove(&id) {
            let _ = tx.send(outcome);
        }
    }

    /// Resolves every still-pending waiter with `PeerGone`, e.g. on disconnect.
    pub fn fail_all_pending(&self) {
        let pending: Vec<_> = self.waiters.lock().unwrap().drain().collect();
        for (_, tx) in pending {
            let _ = tx.send(RpcOutcome::PeerGone);
        }
    }

    /// Number of requests currently awaiting a response. Exposed for tests.
    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.waiters.lock().unwrap().len()
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}
