//! In-memory result history
//!
//! Stores the most recent outcomes for every target in a ring buffer.
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Limited capacity**: At most `capacity` outcomes per target, oldest evicted first
//!
//! ## Locking
//!
//! One reader/writer lock guards the whole map. Writers hold it only for a
//! push and an eviction; readers copy what they need out before releasing it,
//! so no caller ever holds a reference into the store.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::trace;

use crate::monitors::Outcome;

/// Maximum outcomes to keep in memory per target
pub const HISTORY_CAPACITY: usize = 100;

/// Bounded per-target outcome history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Arc<RwLock<HashMap<String, VecDeque<Outcome>>>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create a store keeping at most `capacity` outcomes per target (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an outcome, evicting the oldest ones beyond capacity.
    pub async fn append(&self, target_name: &str, outcome: Outcome) {
        let mut entries = self.entries.write().await;

        let entry = entries
            .entry(target_name.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        entry.push_back(outcome);

        while entry.len() > self.capacity {
            entry.pop_front();
        }

        trace!("{target_name}: {} outcomes in history", entry.len());
    }

    /// Deep copy of every target's history, oldest first.
    pub async fn snapshot_all(&self) -> HashMap<String, Vec<Outcome>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(name, outcomes)| (name.clone(), outcomes.iter().cloned().collect()))
            .collect()
    }

    /// Most recent outcome per target. Targets without outcomes are omitted.
    pub async fn snapshot_latest(&self) -> HashMap<String, Outcome> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter_map(|(name, outcomes)| {
                outcomes.back().map(|latest| (name.clone(), latest.clone()))
            })
            .collect()
    }

    /// Copy of one target's history, oldest first.
    pub async fn snapshot_target(&self, target_name: &str) -> Option<Vec<Outcome>> {
        let entries = self.entries.read().await;
        entries
            .get(target_name)
            .map(|outcomes| outcomes.iter().cloned().collect())
    }

    /// Number of outcomes recorded for a target.
    pub async fn len(&self, target_name: &str) -> usize {
        self.entries
            .read()
            .await
            .get(target_name)
            .map_or(0, VecDeque::len)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
