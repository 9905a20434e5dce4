use core::{
    marker::PhantomData,
    mem::{self, size_of},
    ptr::{self, NonNull},
};

use tracing::trace;

use crate::{
    alloc::{allocate_array, deallocate_array, handle_error},
    collections::{ReserveStrategy, TryReserveError},
    log::LOG_CAT,
};


/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces a dangling pointer on zero-sized types.
/// - Produces a dangling pointer on zero-length allocations.
/// - Avoids freeing a dangling pointer.
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Only ever replaces its buffer once the new one has been successfully allocated,
///   so a failed reallocation leaves the old buffer and its contents untouched.
///
/// This type does not in anyway inspect the memory it manages.
/// When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`,
/// which is also why every method that moves memory around takes the number of live elements.
///
/// Note that the capacity of a zero-sized type is always infinite, so `capacity()` always return `usize::MAX`.
pub(crate) struct RawArray<T, R: ReserveStrategy> {
    ptr:      NonNull<T>,
    cap:      usize,
    _phantom: PhantomData<(T, fn() -> R)>,
}

impl<T, R: ReserveStrategy> RawArray<T, R> {
    const IS_ZST: bool = size_of::<T>() == 0;

    /// Creates a `RawArray` without allocating.
    pub(crate) const fn new() -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, _phantom: PhantomData }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new` when `capacity` is `0` or `T` is zero-sized.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        if Self::IS_ZST || capacity == 0 {
            return Ok(Self::new());
        }
        let ptr = allocate_array(capacity)?;
        Ok(Self { ptr, cap: capacity, _phantom: PhantomData })
    }

    /// Non-fallible version of `try_with_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceed `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Get the capacity of the allocation.
    ///
    /// This will always be `usize::MAX` if `T` is zero-sized.
    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.cap
        }
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    #[inline]
    pub(crate) const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Exchange the buffers of `self` and `other`.
    #[inline]
    pub(crate) fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }

    /// Grow a full buffer holding `len` live elements (`len == self.capacity()`) by at least one element, according to the reserve strategy.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub(crate) fn grow_one(&mut self, len: usize) {
        if let Err(err) = self.try_grow_amortized(len, 1) {
            handle_error(err);
        }
    }

    /// Make room for at least `additional` more elements after `len` live elements, with the amortized growth of the reserve strategy.
    ///
    /// Does nothing if there already is enough space.
    /// On failure, the buffer and its contents are unchanged.
    pub(crate) fn try_grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if !self.needs_to_grow(len, additional) {
            return Ok(());
        }
        if Self::IS_ZST {
            // Since we return a capacity of `usize::MAX` when `T` is zero-sized, getting to here necessarily means that `RawArray` is overfull.
            return Err(TryReserveError::CapacityOverflow);
        }

        let required_cap = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = R::calculate(self.cap, required_cap).ok_or(TryReserveError::CapacityOverflow)?;
        // Don't trust the strategy to respect the minimum
        let new_cap = new_cap.max(required_cap);

        // SAFETY: `len` live elements fit in both the old and the new buffer
        unsafe { self.try_relocate(len, new_cap) }
    }

    /// Reallocate the buffer holding `len` live elements to exactly `capacity` elements, if `capacity` is larger than the current capacity.
    ///
    /// On failure, the buffer and its contents are unchanged.
    pub(crate) fn try_reserve_exact(&mut self, len: usize, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        debug_assert!(len <= self.cap);

        // SAFETY: `len <= self.cap < capacity`
        unsafe { self.try_relocate(len, capacity) }
    }

    /// Shrink the buffer holding `len` live elements down to exactly `len` elements.
    /// A `len` of 0 completely deallocates the buffer.
    ///
    /// On failure, the buffer and its contents are unchanged.
    pub(crate) fn try_shrink_to_fit(&mut self, len: usize) -> Result<(), TryReserveError> {
        if Self::IS_ZST || len == self.cap {
            return Ok(());
        }
        assert!(len <= self.cap, "Tried to shrink to a larger capacity");

        if len == 0 {
            let old = mem::replace(self, Self::new());
            drop(old);
            return Ok(());
        }

        // SAFETY: `len` live elements fit in a buffer of exactly `len` elements
        unsafe { self.try_relocate(len, len) }
    }

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    #[inline]
    fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.capacity().wrapping_sub(len)
    }

    /// Move the `len` live elements into a fresh buffer of `new_cap` elements and release the old buffer.
    ///
    /// The new buffer is fully allocated before the old one is touched, and moving the elements is a bitwise copy that cannot fail.
    ///
    /// # Safety
    ///
    /// - `T` may not be zero-sized.
    /// - `len` must not exceed the current capacity, nor `new_cap`.
    /// - The first `len` elements of the buffer must be initialized.
    unsafe fn try_relocate(&mut self, len: usize, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(!Self::IS_ZST);
        debug_assert!(len <= self.cap && len <= new_cap);

        let mut new = Self::try_with_capacity(new_cap)?;
        ptr::copy_nonoverlapping(self.ptr(), new.ptr(), len);
        trace!(target: LOG_CAT, moved = len, old_capacity = self.cap, new_capacity = new_cap, "relocated array elements");

        // The old buffer now only holds moved-from memory, which is released when `new` is dropped
        self.swap(&mut new);
        Ok(())
    }
}

impl<T, R: ReserveStrategy> Drop for RawArray<T, R> {
    fn drop(&mut self) {
        if Self::IS_ZST || self.cap == 0 {
            return;
        }

        // SAFETY: `ptr` was allocated with `allocate_array::<T>(self.cap)`
        unsafe { deallocate_array(self.ptr, self.cap) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::DoubleOrMinReserveStrategy;

    type Array<T> = RawArray<T, DoubleOrMinReserveStrategy>;

    #[test]
    fn new_does_not_allocate() {
        let arr = Array::<u32>::new();
        assert_eq!(arr.capacity(), 0);

        let arr = Array::<u32>::with_capacity(0);
        assert_eq!(arr.capacity(), 0);
        assert_eq!(arr.ptr(), NonNull::dangling().as_ptr());
    }

    #[test]
    fn zst_capacity() {
        let arr = Array::<()>::with_capacity(10);
        assert_eq!(arr.capacity(), usize::MAX);

        let mut arr = Array::<()>::new();
        assert_eq!(arr.try_grow_amortized(usize::MAX, 1), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn grow_one_doubles() {
        let mut arr = Array::<u32>::new();
        let mut caps = Vec::new();
        let mut len = 0;
        for _ in 0..5 {
            arr.grow_one(len);
            len = arr.capacity();
            caps.push(len);
        }
        assert_eq!(caps, [1, 2, 4, 8, 16]);
    }

    #[test]
    fn relocate_keeps_contents() {
        let mut arr = Array::<u32>::with_capacity(3);
        unsafe {
            for i in 0..3 {
                arr.ptr().add(i).write(i as u32 * 10);
            }
        }

        arr.try_reserve_exact(3, 7).unwrap();
        assert_eq!(arr.capacity(), 7);
        unsafe {
            for i in 0..3 {
                assert_eq!(arr.ptr().add(i).read(), i as u32 * 10);
            }
        }

        arr.try_shrink_to_fit(3).unwrap();
        assert_eq!(arr.capacity(), 3);
        unsafe {
            assert_eq!(arr.ptr().add(2).read(), 20);
        }

        arr.try_shrink_to_fit(0).unwrap();
        assert_eq!(arr.capacity(), 0);
    }

    #[test]
    fn reserve_exact_overflow() {
        let mut arr = Array::<u64>::new();
        assert_eq!(arr.try_reserve_exact(0, usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(arr.capacity(), 0);
    }
}
