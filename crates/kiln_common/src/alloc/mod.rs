//! Raw storage for arrays of `T`.
//!
//! Memory is only ever requested in whole elements, and a request that would end up zero-sized
//! (zero elements, or a zero-sized `T`) never reaches the global allocator.

mod stats;

use std::{alloc::{self as rs_alloc, Layout}, ptr::NonNull};

use tracing::trace;

use crate::{collections::TryReserveError, log::LOG_CAT};

pub use stats::*;

/// Allocate uninitialized storage for `capacity` elements of `T`.
///
/// Returns a dangling, well-aligned pointer without allocating when the resulting size would be 0.
///
/// # Errors
///
/// Returns [`TryReserveError::CapacityOverflow`] when the size in bytes does not fit in `isize`,
/// and [`TryReserveError::AllocError`] when the global allocator fails.
pub fn allocate_array<T>(capacity: usize) -> Result<NonNull<T>, TryReserveError> {
    let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    #[cfg(test)]
    if fail_injection::should_fail() {
        return Err(TryReserveError::AllocError { layout });
    }

    // SAFETY: `layout` has a non-zero size
    let ptr = unsafe { rs_alloc::alloc(layout) };
    let Some(ptr) = NonNull::new(ptr) else {
        return Err(TryReserveError::AllocError { layout });
    };

    stats::record_alloc(layout.size());
    trace!(target: LOG_CAT, count = capacity, bytes = layout.size(), "allocated array storage");
    Ok(ptr.cast())
}

/// Release storage previously returned by [`allocate_array`].
///
/// # Safety
///
/// - `ptr` must have been returned by `allocate_array::<T>(capacity)` with the same `capacity`.
/// - `ptr` must not be used after this call.
/// - Any values still living in the storage are not dropped, this is the caller's responsibility.
pub unsafe fn deallocate_array<T>(ptr: NonNull<T>, capacity: usize) {
    // The layout was already validated when the storage was allocated
    let size = core::mem::size_of::<T>() * capacity;
    if size == 0 {
        return;
    }

    let layout = Layout::from_size_align_unchecked(size, core::mem::align_of::<T>());
    rs_alloc::dealloc(ptr.as_ptr().cast(), layout);

    stats::record_dealloc(size);
    trace!(target: LOG_CAT, count = capacity, bytes = size, "released array storage");
}

/// Central function for reserve error handling of infallible APIs.
///
/// A capacity overflow panics, an allocation failure is forwarded to [`std::alloc::handle_alloc_error`].
#[cold]
#[track_caller]
pub(crate) fn handle_error(err: TryReserveError) -> ! {
    match err {
        TryReserveError::CapacityOverflow => panic!("capacity overflow"),
        TryReserveError::AllocError { layout } => rs_alloc::handle_alloc_error(layout),
    }
}
