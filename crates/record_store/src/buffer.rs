//! Bounded two-partition record buffer.
//!
//! Uses index-based separation for better performance:
//! - VecDeque indices keep partition order (pending / delivered)
//! - Slab stores the actual Arc<LogRecord> handles
//!
//! This avoids shifting record handles when entries move between
//! partitions; promotion only moves small keys.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use contracts::{Level, LogRecord};
use slab::Slab;

/// Key of a stored record, stable for the record's lifetime in the buffer.
pub type RecordKey = usize;

/// Bounded record buffer with a `pending` and a `delivered` partition.
///
/// Invariant: `pending.len() + delivered.len() <= capacity` after every
/// append. On overflow the oldest `delivered` record is evicted first;
/// only when `delivered` is empty does eviction reach into `pending`.
pub struct RecordBuffer {
    /// Actual record storage
    storage: Slab<Arc<LogRecord>>,
    /// Keys not yet fanned out to local sinks, oldest first
    pending: VecDeque<RecordKey>,
    /// Keys already fanned out, oldest first
    delivered: VecDeque<RecordKey>,
    capacity: usize,
    evicted_count: u64,
}

impl fmt::Debug for RecordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuffer")
            .field("pending", &self.pending.len())
            .field("delivered", &self.delivered.len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted_count)
            .finish()
    }
}

impl RecordBuffer {
    /// Create a buffer holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: Slab::with_capacity(capacity.min(1024)),
            pending: VecDeque::new(),
            delivered: VecDeque::new(),
            capacity,
            evicted_count: 0,
        }
    }

    /// Append a record at the tail of `pending`, evicting one record first
    /// if the buffer is at capacity.
    pub fn append(&mut self, record: Arc<LogRecord>) {
        if self.len() >= self.capacity {
            self.evict_one();
        }
        let key = self.storage.insert(record);
        self.pending.push_back(key);
    }

    fn evict_one(&mut self) {
        let key = match self.delivered.pop_front() {
            Some(key) => key,
            None => match self.pending.pop_front() {
                Some(key) => key,
                None => return,
            },
        };
        self.storage.remove(key);
        self.evicted_count += 1;
    }

    /// Keys of all pending records, oldest first.
    pub fn pending_keys(&self) -> Vec<RecordKey> {
        self.pending.iter().copied().collect()
    }

    /// Look up a stored record by key.
    pub fn get(&self, key: RecordKey) -> Option<&Arc<LogRecord>> {
        self.storage.get(key)
    }

    /// Move the given `pending` keys into `delivered`, preserving their
    /// relative order, then trim `delivered` to `capacity - pending.len()`
    /// records from the oldest end.
    ///
    /// Keys not currently pending are ignored.
    pub fn promote(&mut self, keys: &[RecordKey]) {
        for &key in keys {
            if let Some(pos) = self.pending.iter().position(|&k| k == key) {
                self.pending.remove(pos);
                self.delivered.push_back(key);
            }
        }

        let max_delivered = self.capacity.saturating_sub(self.pending.len());
        while self.delivered.len() > max_delivered {
            if let Some(old) = self.delivered.pop_front() {
                self.storage.remove(old);
                self.evicted_count += 1;
            }
        }
    }

    /// All stored records, oldest to newest (`delivered` then `pending`).
    pub fn dump(&self) -> Vec<Arc<LogRecord>> {
        self.delivered
            .iter()
            .chain(self.pending.iter())
            .filter_map(|&k| self.storage.get(k).cloned())
            .collect()
    }

    /// Stored records with `level >= min_level` whose origin tag is unset,
    /// or equal to `origin` when a filter is given. Insertion order.
    pub fn records_at_least(
        &self,
        min_level: Level,
        origin: Option<&str>,
    ) -> Vec<Arc<LogRecord>> {
        self.dump()
            .into_iter()
            .filter(|rec| rec.level >= min_level)
            .filter(|rec| match (origin, rec.origin.as_ref()) {
                (None, _) | (_, None) => true,
                (Some(filter), Some(tag)) => tag.as_str() == filter,
            })
            .collect()
    }

    /// Number of records currently stored across both partitions.
    pub fn len(&self) -> usize {
        self.pending.len() + self.delivered.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.delivered.is_empty()
    }

    /// Number of pending records.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of delivered records.
    pub fn delivered_len(&self) -> usize {
        self.delivered.len()
    }

    /// Total records evicted since creation.
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }
}
