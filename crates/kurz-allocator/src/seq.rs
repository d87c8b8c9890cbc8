use crate::IdAllocator;
use std::sync::atomic::{AtomicU64, Ordering};

/// A sequential allocator backed by an atomic counter.
///
/// Identifiers are contiguous within one instance but restart from the
/// configured offset after a process restart. Use [`MonotonicAllocator`]
/// when identifiers must stay unique across restarts.
///
/// [`MonotonicAllocator`]: crate::MonotonicAllocator
#[derive(Debug, Default)]
pub struct SeqAllocator {
    counter: AtomicU64,
}

impl SeqAllocator {
    /// Creates an allocator whose first identifier is 0.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates an allocator whose first identifier is `offset`.
    ///
    /// Useful for resuming from a known state or distributing
    /// counter ranges across nodes (e.g., node 1 starts at 0, node 2 at 1_000_000).
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl IdAllocator for SeqAllocator {
    fn next_id(&self) -> u64 {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        // fetch_add wraps; a wrapped counter would start reissuing identifiers.
        assert!(id != u64::MAX, "sequential allocator exhausted");
        id
    }
}
