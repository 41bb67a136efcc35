use std::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The cache was asked to hold zero entries.
    NoCapacity,
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CacheError::NoCapacity => {
                write!(f, "no capacity allocated to the cache: capacity must be at least 1")
            }
        }
    }
}

// Allow the error to be used with ?
impl std::error::Error for CacheError {}
