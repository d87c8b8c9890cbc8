//! Identifier allocation for new short URLs.
//!
//! An [`IdAllocator`] hands out strictly increasing `u64` identifiers that the
//! encoder turns into short codes. Allocation is a pure in-memory atomic
//! operation and never blocks on I/O.

mod clock;
mod monotonic;
mod seq;

pub use clock::{Clock, SystemClock};
pub use monotonic::MonotonicAllocator;
pub use seq::SeqAllocator;

use std::sync::Arc;

/// Produces unique identifiers for new mappings.
pub trait IdAllocator: Send + Sync + 'static {
    /// Returns an identifier strictly greater than every identifier this
    /// allocator returned before, even under concurrent callers.
    fn next_id(&self) -> u64;
}

impl<T: IdAllocator + ?Sized> IdAllocator for Arc<T> {
    fn next_id(&self) -> u64 {
        (**self).next_id()
    }
}
