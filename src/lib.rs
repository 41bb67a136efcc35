pub mod error;

pub mod db;

pub use db::{Cache, CacheBuilder, LruCache};
pub use error::CacheError;
