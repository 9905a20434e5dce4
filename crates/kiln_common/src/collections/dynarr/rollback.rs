use core::ptr;

use kiln_base::func_name;
use scopeguard::ScopeGuard;
use tracing::debug;

use crate::log::LOG_CAT;

/// Drop `count` initialized elements starting at `base`, from the last one to the first one.
///
/// # Safety
///
/// - `base..base + count` must hold initialized values of `T`, which are treated as uninitialized afterwards.
pub(super) unsafe fn drop_in_reverse<T>(base: *mut T, count: usize) {
    for idx in (0..count).rev() {
        // SAFETY: `idx < count`, so the slot holds an initialized value
        unsafe { ptr::drop_in_place(base.add(idx)) };
    }
}

/// Write a copy of every element of `src`, in order, into the uninitialized slots starting at `dst`.
///
/// Either all `src.len()` slots end up initialized, or none of them do:
/// when `copy` returns an error or unwinds, the copies that were already written are dropped in reverse order before the failure is passed on.
/// `src` itself is never modified.
///
/// # Safety
///
/// - `dst` must be valid for writes of `src.len()` elements and may not overlap `src`.
pub(super) unsafe fn write_copies<T, E, F>(dst: *mut T, src: &[T], mut copy: F) -> Result<(), E> where
    F: FnMut(&T) -> Result<T, E>
{
    let op = func_name!();
    let mut guard = scopeguard::guard(0usize, |constructed| {
        debug!(target: LOG_CAT, op, constructed, total = src.len(), "rolling back partially copied elements");
        // SAFETY: exactly the first `constructed` slots were written below
        unsafe { drop_in_reverse(dst, constructed) };
    });

    for (idx, elem) in src.iter().enumerate() {
        let value = copy(elem)?;
        // SAFETY: `idx < src.len()`, which the caller guarantees to be writable
        unsafe { dst.add(idx).write(value) };
        *guard += 1;
    }

    // All slots are initialized, disarm the rollback
    ScopeGuard::into_inner(guard);
    Ok(())
}
