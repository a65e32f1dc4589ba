//! Cache storage backends: SQLite, in-memory SQLite, and a no-op.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::sync::Mutex;

use super::traits::Cacheable;

/// Result of a cached query lookup.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  /// The cached entities in order
  pub entities: Vec<T>,
  /// When the query result was cached
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Store entities from a query result, replacing any prior result for
  /// the same key in one transaction.
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()>;

  /// Get cached entities for a query.
  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>>;

  /// Drop everything. Used on explicit cache-clear and session teardown.
  fn clear(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn store_query_result<T: Cacheable>(&self, _key: &str, _entities: &[T]) -> Result<()> {
    Ok(()) // Discard
  }

  fn get_query_result<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedQueryResult<T>>> {
    Ok(None) // Always miss
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Create an in-memory SQLite storage. Used by tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("s9s").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Generic entity cache (stores serialized JSON)
CREATE TABLE IF NOT EXISTS entity_cache (
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (entity_type, entity_key)
);

-- Query result tracking
CREATE TABLE IF NOT EXISTS query_cache (
    query_hash TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    result_count INTEGER NOT NULL
);

-- Query to entity mapping (preserves order)
CREATE TABLE IF NOT EXISTS query_results (
    query_hash TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (query_hash, entity_key),
    FOREIGN KEY (query_hash) REFERENCES query_cache(query_hash) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_query_results_hash ON query_results(query_hash);
"#;

impl CacheStorage for SqliteStorage {
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()> {
    let mut conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let entity_type = T::entity_type();

    // Scoped transaction: rolls back on drop if any step below fails, so
    // the connection never stays inside an open transaction.
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    // Delete existing query results
    tx.execute(
      "DELETE FROM query_results WHERE query_hash = ?",
      params![key],
    )
    .map_err(|e| eyre!("Failed to delete old query results: {}", e))?;

    // Insert/update query cache
    tx.execute(
      "INSERT OR REPLACE INTO query_cache (query_hash, entity_type, cached_at, result_count)
       VALUES (?, ?, datetime('now'), ?)",
      params![key, entity_type, entities.len()],
    )
    .map_err(|e| eyre!("Failed to update query cache: {}", e))?;

    // Store entities and query results
    for (position, entity) in entities.iter().enumerate() {
      let entity_key = entity.cache_key();
      let data =
        serde_json::to_vec(entity).map_err(|e| eyre!("Failed to serialize entity: {}", e))?;

      // Store entity
      tx.execute(
        "INSERT OR REPLACE INTO entity_cache (entity_type, entity_key, data, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![entity_type, entity_key, data],
      )
      .map_err(|e| eyre!("Failed to store entity: {}", e))?;

      // Store query result mapping
      tx.execute(
        "INSERT OR REPLACE INTO query_results (query_hash, entity_key, position)
         VALUES (?, ?, ?)",
        params![key, entity_key, position],
      )
      .map_err(|e| eyre!("Failed to store query result: {}", e))?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }

  fn get_query_result<T: Cacheable>(
    &self,
    query_hash: &str,
  ) -> Result<Option<CachedQueryResult<T>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let entity_type = T::entity_type();

    // Get query metadata
    let mut stmt = conn
      .prepare(
        "SELECT cached_at FROM query_cache
         WHERE query_hash = ? AND entity_type = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let cached_at_str: Option<String> = stmt
      .query_row(params![query_hash, entity_type], |row| row.get(0))
      .ok();

    let cached_at_str = match cached_at_str {
      Some(s) => s,
      None => return Ok(None),
    };

    let cached_at = parse_datetime(&cached_at_str)?;

    // Get entities in order
    let mut stmt = conn
      .prepare(
        "SELECT ec.data FROM entity_cache ec
         INNER JOIN query_results qr ON ec.entity_type = ? AND ec.entity_key = qr.entity_key
         WHERE qr.query_hash = ?
         ORDER BY qr.position",
      )
      .map_err(|e| eyre!("Failed to prepare entity query: {}", e))?;

    let entities: Vec<T> = stmt
      .query_map(params![entity_type, query_hash], |row| {
        let data: Vec<u8> = row.get(0)?;
        Ok(data)
      })
      .map_err(|e| eyre!("Failed to query entities: {}", e))?
      .filter_map(|r| r.ok())
      .filter_map(|data| serde_json::from_slice(&data).ok())
      .collect();

    Ok(Some(CachedQueryResult {
      entities,
      cached_at,
    }))
  }

  fn clear(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(
        "DELETE FROM query_results;
         DELETE FROM query_cache;
         DELETE FROM entity_cache;",
      )
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;

    Ok(())
  }
}

/// Storage selected at startup. Lets the app keep one concrete
/// `CacheLayer` type whether caching is enabled or not.
pub enum AnyStorage {
  Sqlite(SqliteStorage),
  Noop(NoopStorage),
}

impl CacheStorage for AnyStorage {
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()> {
    match self {
      AnyStorage::Sqlite(s) => s.store_query_result(key, entities),
      AnyStorage::Noop(s) => s.store_query_result(key, entities),
    }
  }

  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>> {
    match self {
      AnyStorage::Sqlite(s) => s.get_query_result(key),
      AnyStorage::Noop(s) => s.get_query_result(key),
    }
  }

  fn clear(&self) -> Result<()> {
    match self {
      AnyStorage::Sqlite(s) => s.clear(),
      AnyStorage::Noop(s) => s.clear(),
    }
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Widget {
    id: String,
    value: u32,
  }

  impl Cacheable for Widget {
    fn cache_key(&self) -> String {
      self.id.clone()
    }

    fn entity_type() -> &'static str {
      "widget"
    }
  }

  fn widgets() -> Vec<Widget> {
    vec![
      Widget {
        id: "a".to_string(),
        value: 1,
      },
      Widget {
        id: "b".to_string(),
        value: 2,
      },
    ]
  }

  #[test]
  fn test_store_and_get_query_result() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store_query_result("q1", &widgets()).unwrap();

    let cached = storage.get_query_result::<Widget>("q1").unwrap().unwrap();
    assert_eq!(cached.entities, widgets());
  }

  #[test]
  fn test_miss_returns_none() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    assert!(storage.get_query_result::<Widget>("nope").unwrap().is_none());
  }

  #[test]
  fn test_store_replaces_prior_result() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store_query_result("q1", &widgets()).unwrap();

    let shorter = vec![Widget {
      id: "c".to_string(),
      value: 3,
    }];
    storage.store_query_result("q1", &shorter).unwrap();

    let cached = storage.get_query_result::<Widget>("q1").unwrap().unwrap();
    assert_eq!(cached.entities, shorter);
  }

  #[test]
  fn test_sibling_keys_are_independent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store_query_result("q1", &widgets()).unwrap();
    storage.store_query_result("q2", &widgets()[..1].to_vec()).unwrap();

    assert_eq!(
      storage
        .get_query_result::<Widget>("q1")
        .unwrap()
        .unwrap()
        .entities
        .len(),
      2
    );
    assert_eq!(
      storage
        .get_query_result::<Widget>("q2")
        .unwrap()
        .unwrap()
        .entities
        .len(),
      1
    );
  }

  #[test]
  fn test_clear_drops_everything() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.store_query_result("q1", &widgets()).unwrap();
    storage.clear().unwrap();

    assert!(storage.get_query_result::<Widget>("q1").unwrap().is_none());
  }

  #[derive(Debug, Clone, Deserialize)]
  struct Unstorable;

  impl serde::Serialize for Unstorable {
    fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
      Err(serde::ser::Error::custom("not serializable"))
    }
  }

  impl Cacheable for Unstorable {
    fn cache_key(&self) -> String {
      "u".to_string()
    }

    fn entity_type() -> &'static str {
      "unstorable"
    }
  }

  #[test]
  fn test_failed_store_rolls_back_and_frees_the_connection() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    // Fails mid-transaction at the serialization step
    let err = storage.store_query_result("q1", &[Unstorable]).unwrap_err();
    assert!(err.to_string().contains("serialize"));
    assert!(storage.get_query_result::<Unstorable>("q1").unwrap().is_none());

    // The connection must not be stuck inside the aborted transaction
    storage.store_query_result("q1", &widgets()).unwrap();
    let cached = storage.get_query_result::<Widget>("q1").unwrap().unwrap();
    assert_eq!(cached.entities, widgets());
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.store_query_result("q1", &widgets()).unwrap();
    assert!(storage.get_query_result::<Widget>("q1").unwrap().is_none());
  }
}
