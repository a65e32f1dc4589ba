//! Generic caching layer for data persistence and offline tolerance.
//!
//! This module provides a domain-agnostic caching mechanism that:
//! - Stores query results as `{ data, cached_at }` envelopes per key
//! - Short-circuits the network while an envelope is within its TTL
//! - Preserves previously cached data when a fetch fails, serving it
//!   together with the error for that key only

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{AnyStorage, NoopStorage, SqliteStorage};
pub use traits::{CacheResult, Cacheable, QueryKey};
