//! Core traits and types for the HTTP cache.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response headers as a plain name -> value mapping.
///
/// Names are stored lower-cased; lookups are case-insensitive because not
/// every transport preserves header casing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: &str, value: impl Into<String>) {
    self.0.insert(name.to_ascii_lowercase(), value.into());
  }

  /// Case-insensitive header lookup.
  pub fn get(&self, name: &str) -> Option<&str> {
    let lower = name.to_ascii_lowercase();
    if let Some(v) = self.0.get(&lower) {
      return Some(v.as_str());
    }
    // Entries written by older snapshots may carry original casing
    self
      .0
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Total page count reported by WordPress (`X-WP-TotalPages`).
  ///
  /// Absent, unparseable or zero values yield 1.
  pub fn total_pages(&self) -> u32 {
    self
      .get("x-wp-totalpages")
      .and_then(|v| v.trim().parse::<u32>().ok())
      .filter(|n| *n >= 1)
      .unwrap_or(1)
  }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut headers = Headers::new();
    for (k, v) in iter {
      headers.insert(k.as_ref(), v);
    }
    headers
  }
}

/// Last successful response for one request URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
  pub body: Value,
  pub headers: Headers,
}

impl CacheEntry {
  pub fn new(body: Value, headers: Headers) -> Self {
    Self { body, headers }
  }

  /// Conditional request validators derived from the cached headers.
  pub fn validators(&self) -> Validators {
    Validators {
      etag: self.headers.get("etag").map(String::from),
      last_modified: self.headers.get("last-modified").map(String::from),
    }
  }
}

/// Values echoed back as `If-None-Match` / `If-Modified-Since`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
  pub etag: Option<String>,
  pub last_modified: Option<String>,
}

impl Validators {
  pub fn is_empty(&self) -> bool {
    self.etag.is_none() && self.last_modified.is_none()
  }
}

/// Key/value store backing the HTTP cache.
///
/// Keys are canonical request URLs. Implementations report faults through
/// `Result`; the cache layer decides to log and continue.
pub trait CacheStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

  fn set(&self, key: &str, entry: &CacheEntry) -> Result<()>;
}

/// Result from a cache-aware fetch, including metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult {
  pub body: Value,
  pub headers: Headers,
  /// Where the data came from
  pub source: CacheSource,
}

impl CacheResult {
  pub fn from_network(entry: CacheEntry) -> Self {
    Self::with_source(entry, CacheSource::Network)
  }

  pub fn revalidated(entry: CacheEntry) -> Self {
    Self::with_source(entry, CacheSource::Revalidated)
  }

  pub fn offline(entry: CacheEntry) -> Self {
    Self::with_source(entry, CacheSource::Offline)
  }

  fn with_source(entry: CacheEntry, source: CacheSource) -> Self {
    Self {
      body: entry.body,
      headers: entry.headers,
      source,
    }
  }
}

/// Indicates where a response body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Server answered 304, cached body reused
  Revalidated,
  /// Network or server failed, serving the stale cached body
  Offline,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_lookup_is_case_insensitive() {
    let headers: Headers = [("X-WP-TotalPages", "4"), ("ETag", "\"abc\"")]
      .into_iter()
      .collect();
    assert_eq!(headers.get("x-wp-totalpages"), Some("4"));
    assert_eq!(headers.get("X-WP-TOTALPAGES"), Some("4"));
    assert_eq!(headers.get("etag"), Some("\"abc\""));
  }

  #[test]
  fn test_total_pages_defaults_to_one() {
    assert_eq!(Headers::new().total_pages(), 1);

    let garbage: Headers = [("x-wp-totalpages", "lots")].into_iter().collect();
    assert_eq!(garbage.total_pages(), 1);

    let zero: Headers = [("x-wp-totalpages", "0")].into_iter().collect();
    assert_eq!(zero.total_pages(), 1);

    let three: Headers = [("X-WP-TotalPages", " 3 ")].into_iter().collect();
    assert_eq!(three.total_pages(), 3);
  }

  #[test]
  fn test_validators_only_from_present_headers() {
    let entry = CacheEntry::new(
      Value::Null,
      [("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT")]
        .into_iter()
        .collect(),
    );
    let v = entry.validators();
    assert_eq!(v.etag, None);
    assert_eq!(
      v.last_modified.as_deref(),
      Some("Wed, 21 Oct 2015 07:28:00 GMT")
    );

    let bare = CacheEntry::new(Value::Null, Headers::new());
    assert!(bare.validators().is_empty());
  }

  #[test]
  fn test_headers_serialize_as_plain_map() {
    let headers: Headers = [("ETag", "v1")].into_iter().collect();
    let json = serde_json::to_string(&headers).unwrap();
    assert_eq!(json, r#"{"etag":"v1"}"#);
  }
}
