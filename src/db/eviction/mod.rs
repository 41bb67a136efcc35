mod lru;

// reexport. This allows the recency list to be used directly from eviction.
// example use crate::db::eviction::RecencyList;
pub use lru::*;
