//! In-memory access log.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::logger::AccessLogger;
use crate::record::{AccessDecision, AccessRecord};

/// Bounded in-memory audit sink.
///
/// Keeps the most recent `capacity` records; older records are evicted
/// first. Mainly useful for tests and for exposing recent decisions to an
/// operator endpoint.
#[derive(Debug)]
pub struct MemoryAccessLog {
    records: Mutex<VecDeque<AccessRecord>>,
    capacity: usize,
}

impl MemoryAccessLog {
    /// Create a log holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<AccessRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the retained records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AccessRecord> {
        self.lock().iter().cloned().collect()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all retained records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of retained records with the given decision.
    #[must_use]
    pub fn count(&self, decision: AccessDecision) -> usize {
        self.lock()
            .iter()
            .filter(|record| record.decision == decision)
            .count()
    }

    /// Maximum number of retained records.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl AccessLogger for MemoryAccessLog {
    fn log(&self, record: AccessRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut records = self.lock();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }
}
