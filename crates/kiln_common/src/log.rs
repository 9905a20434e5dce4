/// Tracing target used by the allocation and collection code of this crate.
pub(crate) const LOG_CAT: &str = "kiln::dynarr";
