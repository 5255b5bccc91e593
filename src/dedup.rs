//! Deduplication for wordlist processing
//!
//! The engine owns exactly one deduplicator per run:
//! - Memory: `ahash`-keyed HashSet of every kept word (O(unique) memory)
//! - NoOp: keeps nothing, used when deduplication is disabled

use ahash::RandomState;
use hashbrown::HashSet;

/// Trait for deduplication implementations
pub trait Deduplicator {
    /// Check if item is unique and add it if so
    /// Returns true if the item is unique (not seen before)
    fn insert(&mut self, item: &str) -> bool;

    /// Check if item exists without adding it
    fn contains(&self, item: &str) -> bool;

    /// Get the number of unique items
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get approximate memory usage in bytes
    fn memory_usage(&self) -> usize;
}

/// In-memory HashSet-based deduplicator
///
/// Requires enough RAM to hold all unique kept words.
pub struct MemoryDeduplicator {
    set: HashSet<String, RandomState>,
    bytes: usize,
}

impl MemoryDeduplicator {
    pub fn new() -> Self {
        Self {
            set: HashSet::with_hasher(RandomState::new()),
            bytes: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            set: HashSet::with_capacity_and_hasher(capacity, RandomState::new()),
            bytes: 0,
        }
    }
}

impl Default for MemoryDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Deduplicator for MemoryDeduplicator {
    fn insert(&mut self, item: &str) -> bool {
        // Look up by &str first so duplicates never allocate
        if self.set.contains(item) {
            return false;
        }
        self.bytes += item.len();
        self.set.insert(item.to_owned())
    }

    fn contains(&self, item: &str) -> bool {
        self.set.contains(item)
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    fn memory_usage(&self) -> usize {
        // String header + content, plus one slot per bucket
        self.set.len() * std::mem::size_of::<String>()
            + self.bytes
            + self.set.capacity() * 8
    }
}

/// No-op deduplicator for when deduplication is disabled
#[derive(Default)]
pub struct NoOpDeduplicator {
    count: usize,
}

impl NoOpDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deduplicator for NoOpDeduplicator {
    fn insert(&mut self, _item: &str) -> bool {
        self.count += 1;
        true // Always "unique" since we don't track
    }

    fn contains(&self, _item: &str) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.count
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<usize>()
    }
}

/// Pick the deduplicator for a run
pub fn create_deduplicator(dedupe: bool) -> Box<dyn Deduplicator> {
    if dedupe {
        Box::new(MemoryDeduplicator::new())
    } else {
        Box::new(NoOpDeduplicator::new())
    }
}
