use cfg_if::cfg_if;

/// Allocation statistics of array storage on the current thread.
///
/// Only maintained with the `memory_tracking` feature, otherwise every field reads as 0.
///
/// Events are attributed to the thread performing them: storage allocated on one thread and released on another
/// counts as an allocation on the first and a deallocation on the second.
/// `live_bytes` is clamped at 0 on a thread that releases more than it allocated.
/// Summed over all threads, `allocations` and `deallocations` still balance.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct MemoryStats {
    /// Number of storage allocations.
    pub allocations:   usize,
    /// Number of storage deallocations.
    pub deallocations: usize,
    /// Bytes currently allocated.
    pub live_bytes:    usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes:    usize,
}

cfg_if! {
    if #[cfg(feature = "memory_tracking")] {
        use core::cell::Cell;

        thread_local! {
            static STATS: Cell<MemoryStats> = const { Cell::new(MemoryStats { allocations: 0, deallocations: 0, live_bytes: 0, peak_bytes: 0 }) };
        }

        /// Get the allocation statistics of the current thread.
        pub fn memory_stats() -> MemoryStats {
            STATS.with(Cell::get)
        }

        pub(super) fn record_alloc(bytes: usize) {
            STATS.with(|stats| {
                let mut cur = stats.get();
                cur.allocations += 1;
                cur.live_bytes = cur.live_bytes.saturating_add(bytes);
                cur.peak_bytes = cur.peak_bytes.max(cur.live_bytes);
                stats.set(cur);
            });
        }

        pub(super) fn record_dealloc(bytes: usize) {
            STATS.with(|stats| {
                let mut cur = stats.get();
                cur.deallocations += 1;
                // The storage may have been allocated on another thread
                cur.live_bytes = cur.live_bytes.saturating_sub(bytes);
                stats.set(cur);
            });
        }
    } else {
        /// Get the allocation statistics of the current thread.
        pub fn memory_stats() -> MemoryStats {
            MemoryStats::default()
        }

        #[inline(always)]
        pub(super) fn record_alloc(_bytes: usize) {}

        #[inline(always)]
        pub(super) fn record_dealloc(_bytes: usize) {}
    }
}
