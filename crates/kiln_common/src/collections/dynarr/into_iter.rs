use core::{fmt, iter::FusedIterator, mem, ptr, slice};

use super::DynArr;
use crate::collections::{imp::array::RawArray, ReserveStrategy};

/// An iterator that moves out of a dynamic array.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`] (provided by the [`IntoIterator`] trait).
///
/// # Example
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = dynarr![0, 1, 2];
/// let iter: kiln_common::collections::IntoIter<_, _> = arr.into_iter();
/// assert_eq!(iter.as_slice(), [0, 1, 2]);
/// ```
pub struct IntoIter<T, R: ReserveStrategy> {
    arr:   RawArray<T, R>,
    /// Elements in `start..end` are still owned by the iterator
    start: usize,
    end:   usize,
}

// SAFETY: the iterator uniquely owns the remaining elements
unsafe impl<T: Send, R: ReserveStrategy> Send for IntoIter<T, R> {}
unsafe impl<T: Sync, R: ReserveStrategy> Sync for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> IntoIter<T, R> {
    pub(super) fn new(mut dynarr: DynArr<T, R>) -> Self {
        // Take over the storage, leaving an empty dynamic array behind that has nothing to drop
        let mut arr = RawArray::new();
        dynarr.arr.swap(&mut arr);
        let end = mem::replace(&mut dynarr.len, 0);
        Self { arr, start: 0, end }
    }

    /// Returns the remaining items of this iterator as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the elements in `start..end` are initialized
        unsafe { slice::from_raw_parts(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the elements in `start..end` are initialized
        unsafe { slice::from_raw_parts_mut(self.arr.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for IntoIter<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, R: ReserveStrategy> Iterator for IntoIter<T, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let idx = self.start;
        self.start += 1;
        // SAFETY: `idx` was in the owned range, and is no longer after the increment
        Some(unsafe { ptr::read(self.arr.ptr().add(idx)) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, R> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: `end` was in the owned range, and is no longer after the decrement
        Some(unsafe { ptr::read(self.arr.ptr().add(self.end)) })
    }
}

impl<T, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> FusedIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> Drop for IntoIter<T, R> {
    fn drop(&mut self) {
        // Drop whatever wasn't yielded, back to front, the storage itself is released by `RawArray`
        while self.end > self.start {
            self.end -= 1;
            // SAFETY: `end` was in the owned range, and is no longer after the decrement
            unsafe { ptr::drop_in_place(self.arr.ptr().add(self.end)) };
        }
    }
}
