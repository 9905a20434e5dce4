mod imp;
mod try_clone;

mod dynarr;

use std::alloc::Layout;

use thiserror::Error;

pub use dynarr::*;
pub use try_clone::TryClone;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            #[allow(clippy::partialeq_ne_impl)]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Error returned when a collection could not obtain the storage it needs.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum TryReserveError {
    /// The requested capacity exceeds the maximum size of an allocation (`isize::MAX` bytes),
    /// or the reserve strategy could not produce a capacity.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator failed to provide memory for the given layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// Layout of the failed allocation
        layout: Layout,
    },
}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// Returns `None` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize>;
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
///
/// Growing a full container by a single element therefore goes to `max(1, 2 * capacity)`.
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        let double_cap = cur_capacity.checked_mul(2)?;
        let new_cap = double_cap.max(min_capacity);
        (new_cap <= isize::MAX as usize).then_some(new_cap)
    }
}

/// A reserve strategy that will return a power of 2 capacity
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        min_capacity.checked_next_power_of_two()
    }
}

/// A reserve stategy that grows the capacity by 1.5
pub struct ThreeHalvesReserveStrategy;

impl ReserveStrategy for ThreeHalvesReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        // Growing from 0 or 1 by 1.5 would get stuck
        let mut cap = cur_capacity.max(2);
        while cap < min_capacity {
            cap = cap.checked_add(cap >> 1)?;
            if cap > isize::MAX as usize {
                return None;
            }
        }
        Some(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_or_min() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 1), Some(1));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(1, 2), Some(2));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 5), Some(8));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 21), Some(21));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(usize::MAX / 2 + 1, usize::MAX), None);
    }

    #[test]
    fn pow2() {
        assert_eq!(Pow2ReserveStrategy::calculate(0, 1), Some(1));
        assert_eq!(Pow2ReserveStrategy::calculate(4, 5), Some(8));
        assert_eq!(Pow2ReserveStrategy::calculate(8, 17), Some(32));
        assert_eq!(Pow2ReserveStrategy::calculate(0, usize::MAX), None);
    }

    #[test]
    fn three_halves() {
        assert_eq!(ThreeHalvesReserveStrategy::calculate(0, 1), Some(2));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(2, 3), Some(3));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(8, 9), Some(12));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(8, 13), Some(18));
    }

    #[test]
    fn reserve_error_display() {
        assert_eq!(TryReserveError::CapacityOverflow.to_string(), "capacity overflow");
        let layout = Layout::array::<u32>(4).unwrap();
        assert_eq!(TryReserveError::AllocError { layout }.to_string(), "memory allocation of 16 bytes failed");
    }
}
