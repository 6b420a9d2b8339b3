//! Cached WordPress client that wraps WpClient with transparent caching.

use color_eyre::Result;
use std::sync::Arc;
use tracing::error;

use crate::cache::{CacheLayer, CacheResult, CacheStore, MemoryStore, NoopStorage, SqliteStore};
use crate::config::{CacheBackend, Config};
use crate::error::FetchError;

use super::client::WpClient;

/// WordPress client with transparent caching support.
///
/// Every GET goes through the cache layer, so a cached copy is revalidated
/// rather than trusted and serves as fallback when the request fails.
#[derive(Clone)]
pub struct CachedWpClient {
  inner: WpClient,
  cache: CacheLayer,
}

impl CachedWpClient {
  /// Create a client with the backend chosen in the configuration.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = WpClient::new(&config.api)?;
    let storage: Arc<dyn CacheStore> = match config.cache.backend {
      CacheBackend::Memory => Arc::new(MemoryStore::new()),
      CacheBackend::Sqlite => {
        let path = match &config.cache.path {
          Some(p) => p.clone(),
          None => SqliteStore::default_path()?,
        };
        Arc::new(SqliteStore::open(&path, &config.cache.session)?)
      }
      CacheBackend::None => Arc::new(NoopStorage),
    };

    Ok(Self {
      inner,
      cache: CacheLayer::from_shared(storage),
    })
  }

  /// Build from parts, e.g. with an in-memory store in tests.
  pub fn with_storage(inner: WpClient, storage: impl CacheStore + 'static) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(storage),
    }
  }

  /// Fetch `url` through the cache. Failures are logged and returned.
  pub async fn fetch_resource(&self, url: &str) -> Result<CacheResult, FetchError> {
    let result = self
      .cache
      .fetch(url, |validators| {
        let inner = self.inner.clone();
        let url = url.to_string();
        async move { inner.get(&url, validators.as_ref()).await }
      })
      .await;

    if let Err(e) = &result {
      error!(url, error = %e, "API request failed");
    }
    result
  }

  /// Underlying client, for uncached writes.
  pub fn http(&self) -> &WpClient {
    &self.inner
  }
}
