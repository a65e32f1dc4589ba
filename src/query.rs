//! Async query abstraction for data fetching with loading-state tracking.
//!
//! A `Query<T>` encapsulates one logical request: the fetching closure, the
//! loading/success/error state, and the channel the spawned fetch reports
//! back on. Loading and error are mutually exclusive by construction (the
//! state is a single enum), and starting a new fetch replaces any prior
//! error with `Loading`.
//!
//! There are no automatic retries; `refetch()` is wired to explicit user
//! actions. A wall-clock timeout degrades a long-running fetch to
//! `TimedOut` so the UI stops showing a spinner, but the underlying request
//! is not cancelled - if its response eventually arrives it still commits.
//!
//! # Example
//!
//! ```ignore
//! let client = client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.orders(None).await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
  /// Query exceeded the wall-clock timeout; the request is still pending
  /// and may yet complete
  TimedOut,
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query for data fetching with state management.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  started_at: Option<Instant>,
  fetched_at: Option<Instant>,
  stale_time: Duration,
  timeout: Duration,
}

/// How long a fetch may stay in `Loading` before the UI degrades it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It is called each
  /// time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      started_at: None,
      fetched_at: None,
      stale_time: Duration::from_secs(5 * 60),
      timeout: DEFAULT_TIMEOUT,
    }
  }

  /// Set the stale time for this query.
  pub fn with_stale_time(mut self, duration: Duration) -> Self {
    self.stale_time = duration;
    self
  }

  /// Set the wall-clock timeout after which `Loading` degrades to
  /// `TimedOut`.
  pub fn with_timeout(mut self, duration: Duration) -> Self {
    self.timeout = duration;
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the query succeeded.
  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Check if the query hit the UI timeout.
  pub fn is_timed_out(&self) -> bool {
    matches!(self.state, QueryState::TimedOut)
  }

  /// Get the error message if the query failed.
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Check if the data is stale (older than stale_time).
  pub fn is_stale(&self) -> bool {
    match &self.state {
      QueryState::Success(_) => self
        .fetched_at
        .map(|t| t.elapsed() > self.stale_time)
        .unwrap_or(true),
      _ => false,
    }
  }

  /// Start fetching data if not already loading.
  ///
  /// This is a no-op while a fetch is in flight, which coalesces
  /// duplicate triggers for the same query.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  pub fn refetch(&mut self) {
    // Drop the pending receiver so a superseded fetch can't commit
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed. Call this from the event-loop
  /// tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        // A response commits even after a timeout was surfaced;
        // last-write-wins on the fetch timestamp.
        self.state = QueryState::Success(data);
        self.fetched_at = Some(Instant::now());
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => {
        // Still pending: degrade to TimedOut once the wall clock expires,
        // but keep the receiver so a late response can still land.
        if self.state.is_loading()
          && self
            .started_at
            .map(|t| t.elapsed() > self.timeout)
            .unwrap_or(false)
        {
          self.state = QueryState::TimedOut;
          return true;
        }
        false
      }
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;
    self.started_at = Some(Instant::now());

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetched_at", &self.fetched_at)
      .field("stale_time", &self.stale_time)
      .finish_non_exhaustive()
  }
}

/// A set of queries keyed by request variant (e.g. one per revenue time
/// bucket).
///
/// The overall loading flag is the OR across all per-key loading flags, so
/// the UI reports "ready" only once every key has settled (succeeded,
/// failed, or timed out). Keys are fully independent otherwise.
pub struct QueryMap<K, T> {
  queries: HashMap<K, Query<T>>,
}

impl<K: Eq + Hash + Copy, T: Send + 'static> QueryMap<K, T> {
  pub fn new() -> Self {
    Self {
      queries: HashMap::new(),
    }
  }

  /// Register a query under a key, replacing any existing one.
  pub fn insert(&mut self, key: K, query: Query<T>) {
    self.queries.insert(key, query);
  }

  pub fn get(&self, key: &K) -> Option<&Query<T>> {
    self.queries.get(key)
  }

  pub fn get_mut(&mut self, key: &K) -> Option<&mut Query<T>> {
    self.queries.get_mut(key)
  }

  /// Start fetching every registered query (no-op for those already
  /// loading).
  pub fn fetch_all(&mut self) {
    for query in self.queries.values_mut() {
      query.fetch();
    }
  }

  /// Force-refetch every registered query.
  pub fn refetch_all(&mut self) {
    for query in self.queries.values_mut() {
      query.refetch();
    }
  }

  /// Poll every query; returns true if any state changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    for query in self.queries.values_mut() {
      changed |= query.poll();
    }
    changed
  }

  /// Overall loading flag: OR of all per-key loading flags.
  pub fn any_loading(&self) -> bool {
    self.queries.values().any(|q| q.is_loading())
  }

  /// True once every key's request has settled (or never started).
  pub fn all_settled(&self) -> bool {
    !self.any_loading()
  }
}

impl<K: Eq + Hash + Copy, T: Send + 'static> Default for QueryMap<K, T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Something went wrong".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert_eq!(query.error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_new_fetch_clears_prior_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("boom".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();
    assert!(query.is_error());

    // Loading and error are mutually exclusive: starting a new request
    // replaces the error state.
    query.refetch();
    assert!(query.is_loading());
    assert!(query.error().is_none());
  }

  #[tokio::test]
  async fn test_query_stale() {
    let mut query = Query::new(|| async { Ok::<_, String>(42) }).with_stale_time(Duration::ZERO);

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    // With zero stale time, should immediately be stale
    assert!(query.is_stale());
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(42)
    });

    query.fetch();
    assert!(query.is_loading());

    // Second fetch should be no-op
    query.fetch();
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn test_refetch_cancels_pending() {
    let counter = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch should drop the first receiver and start a new fetch
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    query.poll();
    // Only the second fetch should have completed and been received
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_timeout_degrades_loading_then_late_response_commits() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok::<_, String>(7)
    })
    .with_timeout(Duration::from_millis(10));

    query.fetch();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Past the timeout: loading degrades but the request is not cancelled.
    assert!(query.poll());
    assert!(query.is_timed_out());
    assert!(!query.is_loading());

    // The late response still commits (observed stale-write behavior).
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(query.poll());
    assert_eq!(query.data(), Some(&7));
  }

  #[tokio::test]
  async fn test_query_map_overall_loading_is_or_of_keys() {
    let mut map: QueryMap<&str, i32> = QueryMap::new();
    map.insert(
      "daily",
      Query::new(|| async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<_, String>(1)
      }),
    );
    map.insert("weekly", Query::new(|| async { Ok::<_, String>(2) }));

    // {daily: loading, weekly: idle} -> overall loading is true
    map.get_mut(&"daily").unwrap().fetch();
    assert!(map.any_loading());
    assert!(!map.all_settled());

    // Once daily settles and weekly is still idle, overall loading is false
    tokio::time::sleep(Duration::from_millis(50)).await;
    map.poll();
    assert!(!map.any_loading());
    assert!(map.all_settled());
  }

  #[tokio::test]
  async fn test_query_map_failure_is_scoped_to_its_key() {
    let mut map: QueryMap<&str, i32> = QueryMap::new();
    map.insert("daily", Query::new(|| async { Err("boom".to_string()) }));
    map.insert("weekly", Query::new(|| async { Ok::<_, String>(2) }));

    map.fetch_all();
    tokio::time::sleep(Duration::from_millis(10)).await;
    map.poll();

    assert!(map.get(&"daily").unwrap().is_error());
    assert!(map.get(&"weekly").unwrap().is_success());
    assert_eq!(map.get(&"weekly").unwrap().data(), Some(&2));
  }
}
