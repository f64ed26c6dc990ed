//! Bounded log of recent human-readable events.

use std::collections::VecDeque;

/// Default number of entries kept.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 5;

/// A fixed-capacity ring buffer of event descriptions.
///
/// When full, pushing evicts the oldest entry. A capacity of zero keeps
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEventLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for RecentEventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl RecentEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// Entries newest first, the order a feed usually displays them.
    pub fn newest_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
