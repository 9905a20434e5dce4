pub use crate::collections::{DynArr, DynArrError, TryClone, TryReserveError};
pub use crate::dynarr;
