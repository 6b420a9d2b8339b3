//! Cache store backends: in-memory, SQLite and no-op.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use super::traits::{CacheEntry, CacheStore, Headers};

/// In-process store whose lifetime is the running session.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.read().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl CacheStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let entries = self
      .entries
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
    let mut entries = self
      .entries
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(key.to_string(), entry.clone());
    Ok(())
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStore for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _entry: &CacheEntry) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-backed store, partitioned by session name.
///
/// Separate invocations that use the same session name share entries, the
/// way tabs of one browser session share session storage.
pub struct SqliteStore {
  conn: Mutex<Connection>,
  session: String,
}

impl SqliteStore {
  /// Open (or create) the store at `path`.
  pub fn open(path: &Path, session: &str) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn, session)
  }

  /// Store living only as long as this value.
  pub fn open_in_memory(session: &str) -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn, session)
  }

  fn with_connection(conn: Connection, session: &str) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
      session: session.to_string(),
    })
  }

  /// Default database location under the user's cache directory.
  pub fn default_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
      .ok_or_else(|| eyre!("Could not determine cache directory"))?;

    Ok(cache_dir.join("jarokilo").join("session-cache.db"))
  }

  /// Drop every entry of this session.
  pub fn clear_session(&self) -> Result<usize> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    conn
      .execute(
        "DELETE FROM http_cache WHERE session = ?",
        params![self.session],
      )
      .map_err(|e| eyre!("Failed to clear session {}: {}", self.session, e))
  }
}

/// Schema for the cache table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS http_cache (
    session TEXT NOT NULL,
    url_hash TEXT NOT NULL,
    url TEXT NOT NULL,
    body BLOB NOT NULL,
    headers TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (session, url_hash)
);
"#;

/// SHA256 of the URL for a stable, fixed-length primary key.
fn url_hash(url: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(url.as_bytes());
  hex::encode(hasher.finalize())
}

impl CacheStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT body, headers FROM http_cache WHERE session = ? AND url_hash = ?",
        params![self.session, url_hash(key)],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    match row {
      Some((body, headers)) => {
        let body = serde_json::from_slice(&body)
          .map_err(|e| eyre!("Failed to deserialize cached body: {}", e))?;
        let headers: Headers = serde_json::from_str(&headers)
          .map_err(|e| eyre!("Failed to deserialize cached headers: {}", e))?;
        Ok(Some(CacheEntry { body, headers }))
      }
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
    let body =
      serde_json::to_vec(&entry.body).map_err(|e| eyre!("Failed to serialize body: {}", e))?;
    let headers = serde_json::to_string(&entry.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO http_cache (session, url_hash, url, body, headers, cached_at)
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
        params![self.session, url_hash(key), key, body, headers],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn entry(title: &str) -> CacheEntry {
    CacheEntry::new(
      json!([{ "id": 1, "title": { "rendered": title } }]),
      [("ETag", "\"v1\""), ("X-WP-TotalPages", "2")]
        .into_iter()
        .collect(),
    )
  }

  #[test]
  fn test_memory_store_roundtrip_and_overwrite() {
    let store = MemoryStore::new();
    assert!(store.get("https://x/books").unwrap().is_none());

    store.set("https://x/books", &entry("One")).unwrap();
    store.set("https://x/books", &entry("Two")).unwrap();

    let cached = store.get("https://x/books").unwrap().unwrap();
    assert_eq!(cached.body[0]["title"]["rendered"], "Two");
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn test_noop_always_misses() {
    let store = NoopStorage;
    store.set("k", &entry("One")).unwrap();
    assert!(store.get("k").unwrap().is_none());
  }

  #[test]
  fn test_sqlite_store_keeps_headers() {
    let store = SqliteStore::open_in_memory("tab").unwrap();
    store.set("https://x/books?page=1", &entry("One")).unwrap();

    let cached = store.get("https://x/books?page=1").unwrap().unwrap();
    assert_eq!(cached.headers.get("etag"), Some("\"v1\""));
    assert_eq!(cached.headers.total_pages(), 2);
    assert!(store.get("https://x/books?page=2").unwrap().is_none());
  }

  #[test]
  fn test_sqlite_sessions_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let first = SqliteStore::open(&path, "first").unwrap();
    first.set("https://x/press", &entry("Press")).unwrap();

    let same = SqliteStore::open(&path, "first").unwrap();
    assert!(same.get("https://x/press").unwrap().is_some());

    let other = SqliteStore::open(&path, "second").unwrap();
    assert!(other.get("https://x/press").unwrap().is_none());

    assert_eq!(first.clear_session().unwrap(), 1);
    assert!(same.get("https://x/press").unwrap().is_none());
  }
}
