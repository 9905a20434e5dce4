//! kiln: a growable array whose copy operations either fully succeed or leave everything untouched.
//!
//! ```
//! use kiln::prelude::*;
//!
//! let mut arr = dynarr![1, 2, 3];
//! arr.insert(1, 99);
//! arr.erase(0);
//! assert_eq!(arr.pop(), Some(3));
//! assert_eq!(arr, [99, 2]);
//! ```

pub use kiln_base as base;
pub use kiln_common as common;

pub use kiln_common::{collections, alloc, dynarr};

pub mod prelude {
    pub use kiln_common::prelude::*;
}
