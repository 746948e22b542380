//! Diagnostic side-table of the reasons behind the last search's hits.
//!
//! The ledger is rebuilt after every search that returns hits and cleared
//! after every search that returns none. It is write-only from the search
//! path: nothing in scoring or ranking reads it. With concurrent queries on
//! one knowledge base the last writer wins; use [`Hit::reasons`] for
//! per-call data.
//!
//! [`Hit::reasons`]: crate::types::Hit::reasons

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::types::{Hit, Reason};

/// Entry id → reason labels of the most recent search.
#[derive(Debug, Default)]
pub struct ReasonLedger {
    reasons: Mutex<HashMap<String, BTreeSet<Reason>>>,
}

impl ReasonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BTreeSet<Reason>>> {
        // A poisoned ledger only ever holds diagnostic data.
        self.reasons.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the ledger with the reasons of `hits`; clears it when `hits`
    /// is empty.
    pub fn record(&self, hits: &[Hit]) {
        let mut reasons = self.lock();
        reasons.clear();
        for hit in hits {
            reasons.insert(hit.entry.id.clone(), hit.reasons.clone());
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Reasons recorded for `entry_id` by the last search.
    pub fn reasons_for(&self, entry_id: &str) -> Option<BTreeSet<Reason>> {
        self.lock().get(entry_id).cloned()
    }

    /// A copy of the whole table.
    pub fn snapshot(&self) -> HashMap<String, BTreeSet<Reason>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
