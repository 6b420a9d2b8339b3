//! Cache layer that orchestrates conditional revalidation with network fetching.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::traits::{CacheEntry, CacheResult, CacheStore, Validators};
use crate::error::FetchError;

/// What the network side of a fetch produced.
#[derive(Debug, Clone)]
pub enum Fetched {
  /// 2xx with a parsed body
  Modified(CacheEntry),
  /// 304: the cached copy is still current
  NotModified,
}

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the content API and the HTTP client. There is no
/// local expiry: every call goes to the network, carrying validators when a
/// cached copy exists, and falls back to that copy if the network fails.
pub struct CacheLayer {
  storage: Arc<dyn CacheStore>,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStore + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  pub fn from_shared(storage: Arc<dyn CacheStore>) -> Self {
    Self { storage }
  }

  /// Read an entry, treating storage faults as a miss.
  fn lookup(&self, key: &str) -> Option<CacheEntry> {
    match self.storage.get(key) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(key, error = %e, "Could not read from session cache");
        None
      }
    }
  }

  fn persist(&self, key: &str, entry: &CacheEntry) {
    if let Err(e) = self.storage.set(key, entry) {
      warn!(key, error = %e, "Could not write to session cache");
    }
  }

  /// Fetch `key` through the cache.
  ///
  /// 1. Look up a cached copy and derive validators from its headers
  /// 2. Run the fetcher with those validators
  /// 3. 304 -> cached copy; 2xx -> store and return; failure -> cached copy
  ///    if there is one, otherwise the error
  pub async fn fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult, FetchError>
  where
    F: FnOnce(Option<Validators>) -> Fut,
    Fut: Future<Output = Result<Fetched, FetchError>>,
  {
    let cached = self.lookup(key);
    let validators = cached
      .as_ref()
      .map(CacheEntry::validators)
      .filter(|v| !v.is_empty());

    match (fetcher(validators).await, cached) {
      (Ok(Fetched::Modified(entry)), _) => {
        self.persist(key, &entry);
        Ok(CacheResult::from_network(entry))
      }
      (Ok(Fetched::NotModified), Some(entry)) => {
        debug!(key, "Not modified, serving cached copy");
        Ok(CacheResult::revalidated(entry))
      }
      (Ok(Fetched::NotModified), None) => Err(FetchError::Status(304)),
      (Err(e), Some(entry)) => {
        warn!(key, error = %e, "Request failed, serving stale cached copy");
        Ok(CacheResult::offline(entry))
      }
      (Err(e), None) => Err(e),
    }
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStore;
  use crate::cache::traits::{CacheSource, Headers};
  use color_eyre::eyre::eyre;
  use serde_json::json;
  use std::sync::Mutex;

  fn fresh(body: serde_json::Value, etag: &str) -> Fetched {
    Fetched::Modified(CacheEntry::new(
      body,
      [("ETag", etag)].into_iter().collect(),
    ))
  }

  /// Store whose every operation fails, like a full or disabled storage.
  struct BrokenStore;

  impl CacheStore for BrokenStore {
    fn get(&self, _key: &str) -> color_eyre::Result<Option<CacheEntry>> {
      Err(eyre!("storage disabled"))
    }

    fn set(&self, _key: &str, _entry: &CacheEntry) -> color_eyre::Result<()> {
      Err(eyre!("quota exceeded"))
    }
  }

  #[tokio::test]
  async fn test_miss_fetches_without_validators_and_stores() {
    let layer = CacheLayer::new(MemoryStore::new());

    let result = layer
      .fetch("u", |validators| async move {
        assert!(validators.is_none());
        Ok(fresh(json!([1]), "\"a\""))
      })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.body, json!([1]));
  }

  #[tokio::test]
  async fn test_not_modified_returns_cached_body() {
    let layer = CacheLayer::new(MemoryStore::new());
    layer
      .fetch("u", |_| async { Ok(fresh(json!([1, 2]), "\"a\"")) })
      .await
      .unwrap();

    let seen = Mutex::new(None);
    let result = layer
      .fetch("u", |validators| {
        *seen.lock().unwrap() = validators;
        async { Ok(Fetched::NotModified) }
      })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Revalidated);
    assert_eq!(result.body, json!([1, 2]));
    let validators = seen.lock().unwrap().clone().unwrap();
    assert_eq!(validators.etag.as_deref(), Some("\"a\""));
    assert_eq!(validators.last_modified, None);
  }

  #[tokio::test]
  async fn test_network_failure_serves_stale_copy() {
    let layer = CacheLayer::new(MemoryStore::new());
    layer
      .fetch("u", |_| async { Ok(fresh(json!({"v": 1}), "\"a\"")) })
      .await
      .unwrap();

    let result = layer
      .fetch("u", |_| async {
        Err(FetchError::Transport("offline".to_string()))
      })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Offline);
    assert_eq!(result.body, json!({"v": 1}));
  }

  #[tokio::test]
  async fn test_http_error_without_cache_is_error() {
    let layer = CacheLayer::new(MemoryStore::new());
    let err = layer
      .fetch("u", |_| async { Err(FetchError::Status(503)) })
      .await
      .unwrap_err();
    assert_eq!(err, FetchError::Status(503));
  }

  #[tokio::test]
  async fn test_not_modified_without_cache_is_error() {
    let layer = CacheLayer::new(MemoryStore::new());
    let err = layer
      .fetch("u", |_| async { Ok(Fetched::NotModified) })
      .await
      .unwrap_err();
    assert_eq!(err.status(), Some(304));
  }

  #[tokio::test]
  async fn test_entry_without_validators_sends_none() {
    let store = MemoryStore::new();
    store
      .set("u", &CacheEntry::new(json!([]), Headers::new()))
      .unwrap();
    let layer = CacheLayer::new(store);

    layer
      .fetch("u", |validators| async move {
        assert!(validators.is_none());
        Ok(fresh(json!([]), "\"b\""))
      })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_storage_faults_do_not_abort_request() {
    let layer = CacheLayer::new(BrokenStore);
    let result = layer
      .fetch("u", |_| async { Ok(fresh(json!(["ok"]), "\"a\"")) })
      .await
      .unwrap();
    assert_eq!(result.body, json!(["ok"]));
  }
}
