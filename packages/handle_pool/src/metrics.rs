//! Metrics for handle pools.
//!
//! The events are per-thread instances, matching the single-threaded usage model of a pool.

use nm::{Event, Magnitude};

/// Histogram buckets for the number of entries whose slot index changed during one removal.
///
/// Swap-removal relocates at most one entry. Ordered removal relocates everything after the
/// removed entry, so the upper buckets only fill up under that policy.
const RELOCATED_ENTRIES_BUCKETS: &[Magnitude] = &[0, 1, 2, 5, 10, 50, 100, 500, 1000, 10000];

thread_local! {
    pub(crate) static ENTRIES_CREATED: Event = Event::builder()
        .name("handle_pool_entries_created")
        .build();

    pub(crate) static ENTRIES_DESTROYED: Event = Event::builder()
        .name("handle_pool_entries_destroyed")
        .build();

    /// Observed whenever a handle or identifier fails to resolve to a live entry.
    pub(crate) static INVALID_HANDLES: Event = Event::builder()
        .name("handle_pool_invalid_handles")
        .build();

    /// The magnitude is the number of surviving entries that were moved to another slot.
    pub(crate) static DESTROY_RELOCATED_ENTRIES: Event = Event::builder()
        .name("handle_pool_destroy_relocated_entries")
        .histogram(RELOCATED_ENTRIES_BUCKETS)
        .build();
}
