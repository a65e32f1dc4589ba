//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{Duration, Utc};
use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the application and the network client. Per key, a fresh
/// envelope short-circuits the network entirely; a failed fetch against a
/// populated envelope serves the preserved data together with the error.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend and the
  /// default 5-minute TTL.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_stale(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately without a network call
  /// 2. If stale/missing, fetch from network (exactly one call, no retry)
  /// 3. On network failure, return the stale cache with the error attached
  /// 4. On success, replace data and timestamp atomically
  pub async fn fetch_list<T, K, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<Vec<T>>>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, crate::api::error::ApiError>>,
  {
    let hash = key.cache_hash();

    // Check cache first
    if let Some(cached) = self.storage.get_query_result::<T>(&hash)? {
      if !self.is_stale(cached.cached_at) {
        debug!(key = %key.description(), "cache fresh, skipping network");
        return Ok(CacheResult::from_cache(cached.entities, cached.cached_at));
      }

      // Cache is stale, try to fetch from network
      match fetcher().await {
        Ok(data) => {
          self.storage.store_query_result(&hash, &data)?;
          Ok(CacheResult::from_network(data))
        }
        Err(e) => {
          // Network failed: previously cached data is preserved untouched
          // and served alongside the error.
          warn!(key = %key.description(), error = %e, "fetch failed, serving stale cache");
          Ok(CacheResult::stale(
            cached.entities,
            cached.cached_at,
            e.to_string(),
          ))
        }
      }
    } else {
      // No cache, must fetch from network
      let data = fetcher().await.map_err(color_eyre::eyre::Report::from)?;
      self.storage.store_query_result(&hash, &data)?;
      Ok(CacheResult::from_network(data))
    }
  }

  /// Drop all cached envelopes.
  pub fn clear(&self) -> Result<()> {
    self.storage.clear()
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::error::ApiError;
  use crate::cache::storage::SqliteStorage;
  use crate::cache::traits::CacheSource;
  use serde::{Deserialize, Serialize};
  use std::sync::atomic::{AtomicU32, Ordering};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Widget {
    id: String,
  }

  impl Cacheable for Widget {
    fn cache_key(&self) -> String {
      self.id.clone()
    }

    fn entity_type() -> &'static str {
      "widget"
    }
  }

  struct TestKey(&'static str);

  impl QueryKey for TestKey {
    fn cache_hash(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      self.0.to_string()
    }
  }

  fn layer() -> CacheLayer<SqliteStorage> {
    CacheLayer::new(SqliteStorage::open_in_memory().unwrap())
  }

  fn widget(id: &str) -> Widget {
    Widget { id: id.to_string() }
  }

  #[tokio::test]
  async fn test_fresh_cache_short_circuits_network() {
    let layer = layer();
    let calls = AtomicU32::new(0);

    let first = layer
      .fetch_list(&TestKey("k"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![widget("a")])
      })
      .await
      .unwrap();
    assert_eq!(first.source, CacheSource::Network);

    // Within the TTL the fetcher must not run and the data comes back
    // unchanged.
    let second = layer
      .fetch_list(&TestKey("k"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![widget("b")])
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.source, CacheSource::CacheFresh);
    assert_eq!(second.data, vec![widget("a")]);
  }

  #[tokio::test]
  async fn test_failed_fetch_preserves_cached_data() {
    let layer = layer().with_stale_time(Duration::zero());

    layer
      .fetch_list(&TestKey("k"), || async { Ok(vec![widget("a")]) })
      .await
      .unwrap();

    // Zero TTL means the next fetch goes to the network; make it fail.
    let result = layer
      .fetch_list(&TestKey("k"), || async {
        Err::<Vec<Widget>, _>(ApiError::Transport("connection refused".to_string()))
      })
      .await
      .unwrap();

    assert_eq!(result.data, vec![widget("a")]);
    assert!(result.is_stale());
    assert!(result.stale_error().unwrap().contains("connection refused"));
  }

  #[tokio::test]
  async fn test_failed_fetch_without_cache_is_an_error() {
    let layer = layer();

    let result = layer
      .fetch_list::<Widget, _, _, _>(&TestKey("k"), || async {
        Err(ApiError::Transport("connection refused".to_string()))
      })
      .await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_failure_on_one_key_leaves_sibling_untouched() {
    let layer = layer().with_stale_time(Duration::zero());

    layer
      .fetch_list(&TestKey("daily"), || async { Ok(vec![widget("d")]) })
      .await
      .unwrap();
    layer
      .fetch_list(&TestKey("weekly"), || async { Ok(vec![widget("w")]) })
      .await
      .unwrap();

    layer
      .fetch_list(&TestKey("daily"), || async {
        Err::<Vec<Widget>, _>(ApiError::Transport("down".to_string()))
      })
      .await
      .unwrap();

    let weekly = layer
      .fetch_list(&TestKey("weekly"), || async { Ok(vec![widget("w2")]) })
      .await
      .unwrap();
    assert_eq!(weekly.data, vec![widget("w2")]);
    assert!(!weekly.is_stale());
  }

  #[tokio::test]
  async fn test_stale_cache_is_refreshed_on_success() {
    let layer = layer().with_stale_time(Duration::zero());

    layer
      .fetch_list(&TestKey("k"), || async { Ok(vec![widget("old")]) })
      .await
      .unwrap();

    let refreshed = layer
      .fetch_list(&TestKey("k"), || async { Ok(vec![widget("new")]) })
      .await
      .unwrap();

    assert_eq!(refreshed.source, CacheSource::Network);
    assert_eq!(refreshed.data, vec![widget("new")]);
  }

  #[tokio::test]
  async fn test_clear_forces_network_on_next_fetch() {
    let layer = layer();

    layer
      .fetch_list(&TestKey("k"), || async { Ok(vec![widget("a")]) })
      .await
      .unwrap();
    layer.clear().unwrap();

    let result = layer
      .fetch_list(&TestKey("k"), || async { Ok(vec![widget("b")]) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, vec![widget("b")]);
  }
}
