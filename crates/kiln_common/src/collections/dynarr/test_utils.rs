//! Instrumented element type used to observe how the dynamic array constructs, copies and destroys its elements.

use core::{
    cell::{Cell, RefCell},
    fmt,
};
use std::rc::Rc;

use crate::collections::TryClone;

#[derive(Default)]
struct Counters {
    copies:        Cell<usize>,
    drops:         Cell<usize>,
    drop_order:    RefCell<Vec<i32>>,
    // Number of copy attempts that still succeed before one fails
    copies_before_fail: Cell<Option<usize>>,
}

/// Shared counters of a family of [`Tracked`] values.
#[derive(Clone, Default)]
pub(crate) struct TrackedStats(Rc<Counters>);

impl TrackedStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of successful copies.
    pub(crate) fn copies(&self) -> usize {
        self.0.copies.get()
    }

    /// Number of dropped values.
    pub(crate) fn drops(&self) -> usize {
        self.0.drops.get()
    }

    /// Values of the dropped elements, in the order they were dropped.
    pub(crate) fn drop_order(&self) -> Vec<i32> {
        self.0.drop_order.borrow().clone()
    }

    /// Make the `nth` (1-based) copy attempt from now on fail, either by panicking ([`Clone`]) or by returning an error ([`TryClone`]).
    pub(crate) fn fail_on_copy(&self, nth: usize) {
        assert!(nth > 0);
        self.0.copies_before_fail.set(Some(nth - 1));
    }

    pub(crate) fn reset(&self) {
        self.0.copies.set(0);
        self.0.drops.set(0);
        self.0.drop_order.borrow_mut().clear();
        self.0.copies_before_fail.set(None);
    }

    fn try_copy(&self) -> Result<(), CopyFailed> {
        match self.0.copies_before_fail.get() {
            Some(0) => {
                self.0.copies_before_fail.set(None);
                Err(CopyFailed { after: self.copies() })
            },
            Some(n) => {
                self.0.copies_before_fail.set(Some(n - 1));
                self.0.copies.set(self.copies() + 1);
                Ok(())
            },
            None => {
                self.0.copies.set(self.copies() + 1);
                Ok(())
            },
        }
    }
}

/// Error returned by [`Tracked::try_clone`] when a failure was requested.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct CopyFailed {
    /// Number of successful copies before the failure
    pub(crate) after: usize,
}

/// An element that records its copies and drops in a [`TrackedStats`].
pub(crate) struct Tracked {
    pub(crate) value: i32,
    stats:            TrackedStats,
}

impl Tracked {
    pub(crate) fn new(value: i32, stats: &TrackedStats) -> Self {
        Self { value, stats: stats.clone() }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if let Err(err) = self.stats.try_copy() {
            panic!("copy of {} failed after {} copies", self.value, err.after);
        }
        Self { value: self.value, stats: self.stats.clone() }
    }
}

impl TryClone for Tracked {
    type Error = CopyFailed;

    fn try_clone(&self) -> Result<Self, CopyFailed> {
        self.stats.try_copy()?;
        Ok(Self { value: self.value, stats: self.stats.clone() })
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let counters = &self.stats.0;
        counters.drops.set(counters.drops.get() + 1);
        counters.drop_order.borrow_mut().push(self.value);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<i32> for Tracked {
    fn eq(&self, other: &i32) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}
