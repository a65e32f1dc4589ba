//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this entity (e.g., order id, period label)
  fn cache_key(&self) -> String;

  /// Entity type name for storage organization (e.g., "order", "product")
  fn entity_type() -> &'static str;
}

/// Trait for cache lookup keys.
///
/// A key identifies one logical request variant (e.g., one revenue time
/// bucket, one admin's order list). Sibling keys are fully independent in
/// storage.
pub trait QueryKey {
  /// Stable, fixed-length hash used as the storage key.
  fn cache_hash(&self) -> String;

  /// Human-readable description for logging.
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from fresh cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      cached_at: Some(cached_at),
    }
  }

  /// Create a cache result serving stale data after a failed fetch.
  pub fn stale(data: T, cached_at: DateTime<Utc>, error: String) -> Self {
    Self {
      data,
      source: CacheSource::Stale { error },
      cached_at: Some(cached_at),
    }
  }

  /// Whether the fetch behind this result failed and stale data is served.
  pub fn is_stale(&self) -> bool {
    matches!(self.source, CacheSource::Stale { .. })
  }

  /// The fetch error when stale data is being served.
  pub fn stale_error(&self) -> Option<&str> {
    match &self.source {
      CacheSource::Stale { error } => Some(error),
      _ => None,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the network
  Network,
  /// Data from cache, within the TTL
  CacheFresh,
  /// Data from cache after the network fetch failed; the error is kept so
  /// views can surface it next to the preserved data
  Stale { error: String },
}
