use core::{
    cmp::Ordering,
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    ops::{Bound, Deref, DerefMut, Index, IndexMut, Range, RangeBounds},
    ptr,
    slice::{self, SliceIndex},
};

use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};
use thiserror::Error;

use crate::alloc::handle_error;
use super::{imp::array::RawArray, impl_slice_partial_eq_generic, DoubleOrMinReserveStrategy, ReserveStrategy, TryClone, TryReserveError};

mod into_iter;
mod rollback;

#[cfg(test)]
mod test_utils;

pub use into_iter::IntoIter;

/// Error returned by the fallible copy operations of a [`DynArr`].
///
/// In every case, the dynamic array the operation was called on is left exactly as it was before the call.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum DynArrError<E> {
    /// Storage for the result could not be obtained.
    #[error(transparent)]
    Reserve(#[from] TryReserveError),
    /// Copying one of the elements failed.
    #[error("failed to copy an element")]
    Clone(E),
}

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
///
/// # Examples
///
/// ```
/// use kiln_common::prelude::*;
///
/// let mut arr = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 2, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`](crate::dynarr) macro is provided for convenient initialization:
///
/// ```
/// use kiln_common::prelude::*;
///
/// let mut arr1 = dynarr![1, 2, 3];
/// arr1.push(4);
/// let arr2 = dynarr![1, 2, 3, 4];
/// assert_eq!(arr1, arr2);
/// assert_eq!(dynarr![0; 5], [0, 0, 0, 0, 0]);
/// ```
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto the dynamic array.
/// This is not to be confused with the *length* of the dynamic array, which specifies the number of actual elements within the dynamic array.
/// If a dynamic array's length exceeds its capacity, its capacity will automatically be increased according to its [`ReserveStrategy`],
/// which doubles the capacity by default, and its elements are moved into the new storage.
///
/// A dynamic array never shrinks on its own, use [`shrink_to_fit`](DynArr::shrink_to_fit) to release unused capacity.
///
/// # Guarantees
///
/// - An empty dynamic array that never reserved storage does not allocate, and neither does a dynamic array of zero-sized types.
///   In the latter case, the reported capacity is `usize::MAX`.
/// - Elements are destroyed from the last one to the first one, whether by [`clear`](DynArr::clear), [`truncate`](DynArr::truncate), or dropping the dynamic array.
/// - Operations that copy elements ([`Clone`], [`TryClone`], [`assign_from`](DynArr::assign_from), [`push_back`](DynArr::push_back), ...) are all-or-nothing:
///   when a copy fails, every copy that was already made is destroyed in reverse order, the destination is left unchanged, and the failure is passed on.
/// - Operations that move memory around ([`reserve`](DynArr::reserve), [`shrink_to_fit`](DynArr::shrink_to_fit), growing when full)
///   can only fail when the allocation fails, in which case the dynamic array is left unchanged.
/// - [`insert`](DynArr::insert), [`erase`](DynArr::erase), and [`erase_range`](DynArr::erase_range) shift elements by swapping them,
///   and a failure while doing so can leave the dynamic array in a valid, but unspecified order.
pub struct DynArr<T, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    arr: RawArray<T, R>,
    len: usize,
}

// SAFETY: `DynArr` uniquely owns its elements, so it can be sent or shared whenever they can
unsafe impl<T: Send, R: ReserveStrategy> Send for DynArr<T, R> {}
unsafe impl<T: Sync, R: ReserveStrategy> Sync for DynArr<T, R> {}

assert_impl_all!(DynArr<u32>: Send, Sync, Clone, Default, fmt::Debug);
assert_not_impl_any!(DynArr<std::rc::Rc<u32>>: Send, Sync);
assert_not_impl_any!(DynArr<core::cell::Cell<u32>>: Sync);
assert_eq_size!(DynArr<u64>, [usize; 3]);
assert_eq_size!(DynArr<u64>, Option<DynArr<u64>>);

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let arr: DynArr<i32> = DynArr::new();
    /// assert_eq!(arr.capacity(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_strategy()
    }

    /// Constructs a new, empty `DynArr<T>` with exactly the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity)
    }

    /// Constructs a new, empty `DynArr<T>` with exactly the specified capacity, returning an error if the storage cannot be obtained.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_and_strategy(capacity)
    }
}

impl<T: Clone> DynArr<T> {
    /// Create a dynamic array holding `n` copies of `elem`, used by [`dynarr!`](crate::dynarr)`[elem; n]`.
    ///
    /// `elem` itself is moved into the last slot, so only `n - 1` copies are made.
    pub fn from_elem(elem: T, n: usize) -> Self {
        let mut arr = Self::with_capacity(n);
        if n > 0 {
            for _ in 1..n {
                arr.push(elem.clone());
            }
            arr.push(elem);
        }
        arr
    }
}

impl<T, R: ReserveStrategy> DynArr<T, R> {
    /// Constructs a new, empty `DynArr<T, R>` using a custom reserve strategy.
    #[inline]
    #[must_use]
    pub const fn with_strategy() -> Self {
        Self { arr: RawArray::new(), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T, R>` with exactly the specified capacity, using a custom reserve strategy.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    #[must_use]
    pub fn with_capacity_and_strategy(capacity: usize) -> Self {
        Self { arr: RawArray::with_capacity(capacity), len: 0 }
    }

    /// Fallible version of [`with_capacity_and_strategy`](DynArr::with_capacity_and_strategy).
    pub fn try_with_capacity_and_strategy(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity(capacity)?, len: 0 })
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    ///
    /// This is `usize::MAX` for zero-sized types.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Returns the number of elements in the dynamic array, also referred to as the 'length'.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Makes sure the dynamic array can hold at least `capacity` elements in total.
    ///
    /// Unlike [`Vec::reserve`], `capacity` is the total capacity and not a number of additional elements.
    /// When a reallocation is needed, the new capacity is exactly `capacity`.
    /// Does nothing if the capacity is already sufficient, so the data pointer stays the same.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![1];
    /// arr.reserve(10);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.reserve(5);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            handle_error(err);
        }
    }

    /// Tries to make sure the dynamic array can hold at least `capacity` elements in total.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, an error is returned and the dynamic array is left unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve_exact(self.len, capacity)
    }

    /// Shrinks the capacity of the dynamic array to exactly its length.
    ///
    /// An empty dynamic array releases its storage completely.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = DynArr::with_capacity(8);
    /// arr.extend([1, 2, 3]);
    /// arr.shrink_to_fit();
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if let Err(err) = self.try_shrink_to_fit() {
            handle_error(err);
        }
    }

    /// Tries to shrink the capacity of the dynamic array to exactly its length.
    ///
    /// # Errors
    ///
    /// If the allocator reports a failure, an error is returned and the dynamic array is left unchanged.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), TryReserveError> {
        if self.capacity() > self.len {
            self.arr.try_shrink_to_fit(self.len)?;
        }
        Ok(())
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest, starting at the back.
    ///
    /// If `len` is greater or equal to the current length, this has no effect.
    /// The capacity is left unchanged.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            // The length is updated before the drop, so a panicking drop can't lead to a double drop
            self.len -= 1;
            // SAFETY: the element at `self.len` was initialized and is no longer part of the dynamic array
            unsafe { ptr::drop_in_place(self.as_mut_ptr().add(self.len)) };
        }
    }

    /// Removes all elements, from the last one to the first one.
    ///
    /// The capacity is left unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Extracts a slice containing the entire dynamic array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice containing the entire dynamic array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the dynamic array's buffer.
    ///
    /// When the dynamic array has no storage (capacity 0, or a zero-sized `T`), this is a dangling pointer that is only valid for zero-sized reads.
    /// Any operation that reallocates the dynamic array invalidates the pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Returns a raw mutable pointer to the dynamic array's buffer.
    ///
    /// See [`as_ptr`](DynArr::as_ptr).
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`](DynArr::capacity).
    /// - The elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Exchanges the contents of two dynamic arrays.
    ///
    /// Only the storage and lengths are exchanged, no element is copied, moved or dropped.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.arr.swap(&mut other.arr);
        core::mem::swap(&mut self.len, &mut other.len);
    }

    /// Returns a reference to the first element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Returns a mutable reference to the first element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns a reference to the last element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns a mutable reference to the last element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Returns a reference to the first element, without checking if there is one.
    ///
    /// # Safety
    ///
    /// The dynamic array may not be empty.
    #[inline]
    pub unsafe fn front_unchecked(&self) -> &T {
        debug_assert!(!self.is_empty());
        // SAFETY: the caller guarantees there is at least one element
        unsafe { self.get_unchecked(0) }
    }

    /// Returns a reference to the last element, without checking if there is one.
    ///
    /// # Safety
    ///
    /// The dynamic array may not be empty.
    #[inline]
    pub unsafe fn back_unchecked(&self) -> &T {
        debug_assert!(!self.is_empty());
        // SAFETY: the caller guarantees there is at least one element
        unsafe { self.get_unchecked(self.len - 1) }
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// When the dynamic array is full, it first grows according to its reserve strategy.
    /// Growing moves the existing elements, which can't fail, so either the element is appended or the dynamic array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len;
        if len == self.arr.capacity() {
            self.arr.grow_one(len);
        }
        // SAFETY: `len < capacity`, so the slot is allocated and uninitialized
        unsafe { ptr::write(self.as_mut_ptr().add(len), value) };
        self.len = len + 1;
    }

    /// Fallible version of [`push`](DynArr::push), which returns an error instead of panicking or aborting when the dynamic array can't grow.
    ///
    /// On failure, the dynamic array is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        self.arr.try_grow_amortized(self.len, 1)?;
        // SAFETY: there is at least one free slot after the grow
        unsafe { ptr::write(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Appends an element if there is sufficient spare capacity, otherwise the element is returned.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.arr.capacity() {
            return Err(value);
        }
        // SAFETY: `len < capacity`
        unsafe { ptr::write(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it, or `None` if the dynamic array is empty.
    ///
    /// The capacity is left unchanged.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: the element at `self.len` was initialized and is no longer part of the dynamic array
            Some(unsafe { ptr::read(self.as_ptr().add(self.len)) })
        }
    }

    /// Destroys the last element, without checking if there is one.
    ///
    /// # Safety
    ///
    /// The dynamic array may not be empty.
    pub unsafe fn pop_unchecked(&mut self) {
        debug_assert!(!self.is_empty());
        self.len -= 1;
        // SAFETY: the caller guarantees the element existed, and it's no longer part of the dynamic array
        unsafe { ptr::drop_in_place(self.as_mut_ptr().add(self.len)) };
    }

    /// Inserts an element at position `index`, shifting all elements after it to the right, and returns `index`.
    ///
    /// The element is appended first, and then swapped into place.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or when growing fails as with [`push`](DynArr::push).
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.insert(1, 4), 1);
    /// assert_eq!(arr, [1, 4, 2, 3]);
    /// arr.insert(4, 5);
    /// assert_eq!(arr, [1, 4, 2, 3, 5]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes *O*([`DynArr::len`]) time.
    #[track_caller]
    pub fn insert(&mut self, index: usize, element: T) -> usize {
        self.assert_insert_index(index);
        self.push(element);
        self.rotate_last_into(index);
        index
    }

    #[track_caller]
    fn assert_insert_index(&self, index: usize) {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        if index > self.len {
            assert_failed(index, self.len);
        }
    }

    /// Move the last element to `index`, shifting the elements in between one slot to the right.
    fn rotate_last_into(&mut self, index: usize) {
        let elems = self.as_mut_slice();
        for idx in (index + 1..elems.len()).rev() {
            elems.swap(idx, idx - 1);
        }
    }

    /// Removes the element at `index`, shifting all elements after it to the left, and returns the index of the element that now follows the removed one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.erase(0), 0);
    /// assert_eq!(arr, [2, 3]);
    /// ```
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> usize {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        if index >= self.len {
            assert_failed(index, self.len);
        }
        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range`, shifting all elements after it to the left, and returns the start of the range,
    /// which is now the index of the element following the removed ones.
    ///
    /// The removed elements are swapped to the back and then dropped from the last one to the first one.
    /// An empty range does nothing.
    ///
    /// # Panics
    ///
    /// Panics if the start or the end of the range is larger than the length of the dynamic array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// assert_eq!(arr.erase_range(1..3), 1);
    /// assert_eq!(arr, [1, 4, 5]);
    /// assert_eq!(arr.erase_range(..), 0);
    /// assert!(arr.is_empty());
    /// ```
    #[track_caller]
    pub fn erase_range<RA: RangeBounds<usize>>(&mut self, range: RA) -> usize {
        let Range { start, end } = resolve_range(range, self.len);
        if end <= start {
            return start;
        }

        let len = self.len;
        let delta = end - start;
        let elems = self.as_mut_slice();
        for idx in start..len - delta {
            elems.swap(idx, idx + delta);
        }
        self.truncate(len - delta);
        start
    }

    /// Removes and returns the element at position `index`, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        // SAFETY: `index < len`, the read value is no longer considered part of the dynamic array once the tail is shifted over it
        unsafe {
            let ptr = self.as_mut_ptr().add(index);
            let ret = ptr::read(ptr);
            ptr::copy(ptr.add(1), ptr, len - index - 1);
            self.len = len - 1;
            ret
        }
    }

    /// Build a dynamic array with exactly `src.len()` capacity, holding a copy of every element of `src`.
    ///
    /// When a copy fails, the copies already made are dropped in reverse order and the storage is released.
    fn try_from_slice_with<E, F>(src: &[T], copy: F) -> Result<Self, DynArrError<E>> where
        F: FnMut(&T) -> Result<T, E>
    {
        let mut arr = Self::try_with_capacity_and_strategy(src.len())?;
        // SAFETY: the storage of `arr` was just allocated for `src.len()` elements, so it can't overlap `src`
        unsafe { rollback::write_copies(arr.as_mut_ptr(), src, copy) }.map_err(DynArrError::Clone)?;
        // SAFETY: the capacity is exactly `src.len()` and every slot now holds a copy
        unsafe { arr.set_len(src.len()) };
        Ok(arr)
    }
}

impl<T: Clone, R: ReserveStrategy> DynArr<T, R> {
    /// Appends a copy of `value` to the back of the dynamic array.
    ///
    /// The copy is made before the dynamic array grows, so if copying panics, the dynamic array is unchanged.
    pub fn push_back(&mut self, value: &T) {
        self.push(value.clone());
    }

    /// Inserts a copy of `value` at position `index`, and returns `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert_cloned(&mut self, index: usize, value: &T) -> usize {
        self.insert(index, value.clone())
    }

    /// Replaces the contents of the dynamic array with copies of the elements in `source`.
    ///
    /// The copy is built on the side and then swapped in, after which the previous elements are dropped,
    /// so if a copy fails, the dynamic array is unchanged.
    /// The resulting capacity is exactly `source.len()`.
    pub fn assign_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap_with(&mut copy);
    }

    /// Clones and appends all elements in a slice to the dynamic array.
    ///
    /// If a copy panics, the elements that were already appended stay in the dynamic array.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        if let Err(err) = self.arr.try_grow_amortized(self.len, other.len()) {
            handle_error(err);
        }
        for elem in other {
            // SAFETY: there is room for all of `other`, so this can't grow
            unsafe { ptr::write(self.as_mut_ptr().add(self.len), elem.clone()) };
            self.len += 1;
        }
    }
}

impl<T: TryClone, R: ReserveStrategy> DynArr<T, R> {
    /// Appends a copy of `value` to the back of the dynamic array.
    ///
    /// # Errors
    ///
    /// If copying `value` fails or the dynamic array can't grow, an error is returned and the dynamic array is unchanged.
    pub fn try_push_back(&mut self, value: &T) -> Result<(), DynArrError<T::Error>> {
        let value = value.try_clone().map_err(DynArrError::Clone)?;
        Ok(self.try_push(value)?)
    }

    /// Inserts a copy of `value` at position `index`, and returns `index`.
    ///
    /// # Errors
    ///
    /// If copying `value` fails or the dynamic array can't grow, an error is returned and the dynamic array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn try_insert_cloned(&mut self, index: usize, value: &T) -> Result<usize, DynArrError<T::Error>> {
        self.assert_insert_index(index);
        let value = value.try_clone().map_err(DynArrError::Clone)?;
        self.try_push(value)?;
        self.rotate_last_into(index);
        Ok(index)
    }

    /// Replaces the contents of the dynamic array with copies of the elements in `source`.
    ///
    /// # Errors
    ///
    /// If a copy fails or storage can't be obtained, an error is returned and the dynamic array is unchanged.
    pub fn try_assign_from(&mut self, source: &Self) -> Result<(), DynArrError<T::Error>> {
        let mut copy = source.try_clone()?;
        self.swap_with(&mut copy);
        Ok(())
    }
}

#[track_caller]
fn resolve_range<RA: RangeBounds<usize>>(range: RA, len: usize) -> Range<usize> {
    #[cold]
    #[track_caller]
    fn assert_failed(bound: &str, idx: usize, len: usize) -> ! {
        panic!("range {bound} (is {idx}) should be <= len (is {len})");
    }

    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > len {
        assert_failed("start", start, len);
    }
    if end > len {
        assert_failed("end", end, len);
    }
    start..end
}

impl<T, R: ReserveStrategy> Drop for DynArr<T, R> {
    fn drop(&mut self) {
        // The storage itself is released by `RawArray`
        self.truncate(0);
    }
}

impl<T, R: ReserveStrategy> Deref for DynArr<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        // SAFETY: the pointer is non-null and aligned, and the first `len` elements are initialized
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T, R: ReserveStrategy> DerefMut for DynArr<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: see `deref`
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone, R: ReserveStrategy> Clone for DynArr<T, R> {
    /// Creates a copy with a capacity equal to the length of `self`.
    ///
    /// If an element's `clone` panics, the copies already made are dropped in reverse order before the panic continues.
    fn clone(&self) -> Self {
        match Self::try_from_slice_with(self, |elem| Ok::<T, Infallible>(elem.clone())) {
            Ok(arr) => arr,
            Err(DynArrError::Reserve(err)) => handle_error(err),
            Err(DynArrError::Clone(never)) => match never {},
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<T: TryClone, R: ReserveStrategy> TryClone for DynArr<T, R> {
    type Error = DynArrError<T::Error>;

    /// Creates a copy with a capacity equal to the length of `self`, or returns the first error.
    fn try_clone(&self) -> Result<Self, Self::Error> {
        Self::try_from_slice_with(self, T::try_clone)
    }
}

impl<T: Hash, R: ReserveStrategy> Hash for DynArr<T, R> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> Index<I> for DynArr<T, R> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> IndexMut<I> for DynArr<T, R> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, R: ReserveStrategy> FromIterator<T> for DynArr<T, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::with_strategy();
        arr.extend(iter);
        arr
    }
}

impl<T, R: ReserveStrategy> IntoIterator for DynArr<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T, R>;

    /// Creates a consuming iterator, that moves each element out of the dynamic array, from start to end.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a DynArr<T, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R: ReserveStrategy> Extend<T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut iter = iter.into_iter();
        while let Some(elem) = iter.next() {
            let len = self.len;
            if len == self.capacity() {
                let (lower, _) = iter.size_hint();
                if let Err(err) = self.arr.try_grow_amortized(len, lower.saturating_add(1)) {
                    handle_error(err);
                }
            }
            // SAFETY: there is at least one free slot
            unsafe { ptr::write(self.as_mut_ptr().add(len), elem) };
            self.len = len + 1;
        }
    }
}

impl<'a, T: Copy + 'a, R: ReserveStrategy> Extend<&'a T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, R0>, DynArr<U, R1>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &[U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &mut [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &[T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &mut [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] DynArr<T, R>, [U; N]);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] DynArr<T, R>, &[U; N]);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] [T; N], DynArr<U, R>);

impl<T: PartialOrd, R0: ReserveStrategy, R1: ReserveStrategy> PartialOrd<DynArr<T, R1>> for DynArr<T, R0> {
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, R1>) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, R: ReserveStrategy> Eq for DynArr<T, R> {}

impl<T: Ord, R: ReserveStrategy> Ord for DynArr<T, R> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, R: ReserveStrategy> Default for DynArr<T, R> {
    /// Creates an empty `DynArr<T, R>`, which does not allocate.
    fn default() -> Self {
        Self::with_strategy()
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for DynArr<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for DynArr<T, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, R: ReserveStrategy> AsMut<[T]> for DynArr<T, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone, R: ReserveStrategy> From<&[T]> for DynArr<T, R> {
    /// Allocates a `DynArr<T>` with exactly the length of the slice and fills it by cloning its items.
    fn from(value: &[T]) -> Self {
        match Self::try_from_slice_with(value, |elem| Ok::<T, Infallible>(elem.clone())) {
            Ok(arr) => arr,
            Err(DynArrError::Reserve(err)) => handle_error(err),
            Err(DynArrError::Clone(never)) => match never {},
        }
    }
}

impl<T: Clone, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, R> {
    fn from(value: &[T; N]) -> Self {
        Self::from(value.as_slice())
    }
}

impl<T, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, R> {
    /// Allocates a `DynArr<T>` with exactly `N` elements and moves the array's items into it.
    fn from(value: [T; N]) -> Self {
        let mut arr = Self::with_capacity_and_strategy(N);
        for elem in value {
            let len = arr.len;
            // SAFETY: the capacity is `N`, which is never exceeded, and slot `len` is written before it is counted
            unsafe {
                ptr::write(arr.as_mut_ptr().add(len), elem);
                arr.set_len(len + 1);
            }
        }
        arr
    }
}

impl<R: ReserveStrategy> From<&str> for DynArr<u8, R> {
    fn from(value: &str) -> Self {
        From::from(value.as_bytes())
    }
}

impl<T, R: ReserveStrategy, const N: usize> TryFrom<DynArr<T, R>> for [T; N] {
    type Error = DynArr<T, R>;

    /// Gets the entire contents of the `DynArr<T>` as an array, if its size exactly matches that of the requested array.
    /// If it doesn't, the dynamic array is returned unchanged.
    fn try_from(mut arr: DynArr<T, R>) -> Result<Self, Self::Error> {
        if arr.len() != N {
            return Err(arr);
        }

        // The elements are moved out below, after which only the storage is left to release
        // SAFETY: shrinking the length never exposes uninitialized elements
        unsafe { arr.set_len(0) };
        // SAFETY: the buffer holds `N` initialized elements, which are now owned by the array
        Ok(unsafe { ptr::read(arr.as_ptr().cast::<[T; N]>()) })
    }
}

/// Creates a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a `DynArr` containing a given list of elements, with a capacity equal to the number of elements:
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a `DynArr` from a given element and size, the element must implement [`Clone`]:
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {{
        let mut arr = $crate::collections::DynArr::with_capacity($crate::count_exprs!($($x),+));
        $(arr.push($x);)+
        arr
    }};
}
