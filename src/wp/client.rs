use crate::cache::{CacheEntry, Fetched, Headers, Validators};
use crate::config::ApiConfig;
use crate::error::FetchError;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// WordPress REST client wrapper
#[derive(Clone)]
pub struct WpClient {
  client: reqwest::Client,
}

impl WpClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs.max(1)))
      .user_agent(concat!("jarokilo/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }

  /// GET `url`, attaching conditional headers when validators are known.
  pub async fn get(&self, url: &str, validators: Option<&Validators>) -> Result<Fetched, FetchError> {
    let mut request = self.client.get(url);
    if let Some(v) = validators {
      if let Some(etag) = &v.etag {
        request = request.header(IF_NONE_MATCH, etag);
      }
      if let Some(last_modified) = &v.last_modified {
        request = request.header(IF_MODIFIED_SINCE, last_modified);
      }
    }

    let response = request.send().await?;
    let status = response.status();
    debug!(url, status = status.as_u16(), "Content API response");

    if status == StatusCode::NOT_MODIFIED {
      return Ok(Fetched::NotModified);
    }
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }

    let headers = capture_headers(response.headers());
    let bytes = response.bytes().await?;
    let body: Value =
      serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(Fetched::Modified(CacheEntry::new(body, headers)))
  }

  /// POST a JSON body; any non-2xx status is an error.
  pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), FetchError> {
    let response = self.client.post(url).json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }
    Ok(())
  }
}

/// Copy response headers into a plain mapping. Non-UTF-8 values are skipped.
fn capture_headers(map: &HeaderMap) -> Headers {
  map
    .iter()
    .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
    .collect()
}
