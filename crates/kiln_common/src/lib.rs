//! Common building blocks for kiln: raw array allocation and the collections built on top of it.

mod log;

pub mod alloc;
pub mod collections;
pub mod prelude;

pub use kiln_base::*;
