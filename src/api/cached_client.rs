//! Cached storefront client that wraps StoreClient with transparent caching.

use color_eyre::Result;

use crate::cache::{AnyStorage, CacheLayer, CacheResult, NoopStorage, SqliteStorage};
use crate::config::Config;
use crate::session::Session;

use super::cache::StoreQueryKey;
use super::client::StoreClient;
use super::types::{
  Order, OrderStats, Period, Product, ProductStats, RevenuePeriod, User, UserStats,
};

/// Storefront client with transparent caching support.
///
/// Wraps the underlying StoreClient and provides the same API, but list
/// fetches go through the cache layer: a fresh envelope skips the network,
/// and a failed refresh serves the preserved data with the error attached.
/// Stats endpoints are not cached - they are small and back the always-live
/// counters in view headers.
#[derive(Clone)]
pub struct CachedStoreClient {
  inner: StoreClient,
  cache: CacheLayer<AnyStorage>,
}

impl CachedStoreClient {
  /// Create a new cached client. `no_cache` selects the no-op storage, so
  /// every fetch goes to the network.
  pub fn new(config: &Config, session: Session, no_cache: bool) -> Result<Self> {
    let inner = StoreClient::new(config, session)?;
    let storage = if no_cache {
      AnyStorage::Noop(NoopStorage)
    } else {
      AnyStorage::Sqlite(SqliteStorage::open()?)
    };
    let cache = CacheLayer::new(storage);

    Ok(Self { inner, cache })
  }

  /// Aggregated revenue buckets for one time period, cached per period.
  pub async fn revenue_by_time(&self, period: Period) -> Result<CacheResult<Vec<RevenuePeriod>>> {
    let key = StoreQueryKey::Revenue { period };
    self
      .cache
      .fetch_list(&key, || {
        let inner = self.inner.clone();
        async move { inner.revenue_by_time(period).await }
      })
      .await
  }

  /// Orders, cached per admin scope.
  pub async fn orders(&self, admin: Option<&str>) -> Result<CacheResult<Vec<Order>>> {
    let key = StoreQueryKey::Orders {
      admin: admin.map(String::from),
    };
    self
      .cache
      .fetch_list(&key, || {
        let inner = self.inner.clone();
        let admin = admin.map(String::from);
        async move { inner.orders(admin.as_deref()).await }
      })
      .await
  }

  /// Products, cached per admin scope.
  pub async fn products(&self, admin: Option<&str>) -> Result<CacheResult<Vec<Product>>> {
    let key = StoreQueryKey::Products {
      admin: admin.map(String::from),
    };
    self
      .cache
      .fetch_list(&key, || {
        let inner = self.inner.clone();
        let admin = admin.map(String::from);
        async move { inner.products(admin.as_deref()).await }
      })
      .await
  }

  /// User accounts, cached.
  pub async fn users(&self) -> Result<CacheResult<Vec<User>>> {
    self
      .cache
      .fetch_list(&StoreQueryKey::Users, || {
        let inner = self.inner.clone();
        async move { inner.users().await }
      })
      .await
  }

  /// Order counters (not cached).
  pub async fn order_stats(&self) -> Result<OrderStats, super::error::ApiError> {
    self.inner.order_stats().await
  }

  /// Product counters (not cached).
  pub async fn product_stats(&self) -> Result<ProductStats, super::error::ApiError> {
    self.inner.product_stats().await
  }

  /// User counters (not cached).
  pub async fn user_stats(&self) -> Result<UserStats, super::error::ApiError> {
    self.inner.user_stats().await
  }

  /// Drop all cached envelopes. Used by the `cache clear` command and on
  /// session teardown.
  pub fn clear_cache(&self) -> Result<()> {
    self.cache.clear()
  }
}
