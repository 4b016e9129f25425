//! In-memory result store
//!
//! Histories live in a sharded concurrent map, one `RwLock`-protected deque per
//! key. The map shard lock is only held long enough to look up or create a
//! key's history handle; appends and reads then lock that key alone, so
//! writers for different keys never wait on each other.

use crate::storage::{ResultStore, ScrapeResult};
use crate::task::TaskKey;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

type History = Arc<RwLock<VecDeque<ScrapeResult>>>;

/// Thread-safe in-memory implementation of [`ResultStore`]
pub struct MemoryStore {
    histories: DashMap<TaskKey, History>,
    max_history_per_key: usize,
}

impl MemoryStore {
    /// Creates a store retaining at most `max_history_per_key` results per key
    pub fn new(max_history_per_key: usize) -> Self {
        Self {
            histories: DashMap::new(),
            max_history_per_key: max_history_per_key.max(1),
        }
    }

    fn history(&self, key: &TaskKey) -> Option<History> {
        self.histories.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn history_or_insert(&self, key: &TaskKey) -> History {
        if let Some(history) = self.history(key) {
            return history;
        }
        Arc::clone(self.histories.entry(key.clone()).or_default().value())
    }
}

impl ResultStore for MemoryStore {
    fn append(&self, key: &TaskKey, result: ScrapeResult) {
        let history = self.history_or_insert(key);
        let mut entries = history.write();

        match entries.back() {
            Some(last) if last.fetched_at > result.fetched_at => {
                // Keep fetched_at order if a late writer lands behind a newer result
                let index = entries.partition_point(|r| r.fetched_at <= result.fetched_at);
                entries.insert(index, result);
            }
            _ => entries.push_back(result),
        }

        while entries.len() > self.max_history_per_key {
            if let Some(evicted) = entries.pop_front() {
                tracing::trace!("Evicted result for {} fetched at {}", key, evicted.fetched_at);
            }
        }
    }

    fn get_latest(&self, key: &TaskKey) -> Option<ScrapeResult> {
        let history = self.history(key)?;
        let latest = history.read().back().cloned();
        latest
    }

    fn get_all(&self, key: &TaskKey) -> Vec<ScrapeResult> {
        match self.history(key) {
            Some(history) => {
                let entries = history.read();
                entries.iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    fn get_at(&self, key: &TaskKey, at: DateTime<Utc>) -> Option<ScrapeResult> {
        let history = self.history(key)?;
        let entries = history.read();
        let index = entries.partition_point(|r| r.fetched_at < at);
        entries
            .get(index)
            .filter(|r| r.fetched_at == at)
            .cloned()
    }

    fn snapshot(&self) -> BTreeMap<TaskKey, Vec<ScrapeResult>> {
        let handles: Vec<(TaskKey, History)> = self
            .histories
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        handles
            .into_iter()
            .map(|(key, history)| {
                let entries: Vec<ScrapeResult> = history.read().iter().cloned().collect();
                (key, entries)
            })
            .collect()
    }

    fn keys(&self) -> Vec<TaskKey> {
        let mut keys: Vec<TaskKey> = self
            .histories
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    fn len(&self, key: &TaskKey) -> usize {
        match self.history(key) {
            Some(history) => {
                let len = history.read().len();
                len
            }
            None => 0,
        }
    }
}
