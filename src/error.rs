//! Errors surfaced by the fetch path.

use thiserror::Error;

/// Why a request against the content API did not yield data.
///
/// Storage faults are not represented here: the cache layer logs them and
/// carries on without caching.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  /// The request could not complete (DNS, connection refused, TLS, ...)
  #[error("request failed: {0}")]
  Transport(String),

  /// The request did not complete within the configured timeout
  #[error("request timed out")]
  Timeout,

  /// The server answered with a status outside 2xx (and not a usable 304)
  #[error("HTTP error! status: {0}")]
  Status(u16),

  /// The body was not the JSON we expected
  #[error("invalid response body: {0}")]
  Decode(String),
}

impl FetchError {
  /// HTTP status code, when the failure came from the server.
  pub fn status(&self) -> Option<u16> {
    match self {
      FetchError::Status(code) => Some(*code),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      FetchError::Timeout
    } else if let Some(status) = e.status() {
      FetchError::Status(status.as_u16())
    } else if e.is_decode() {
      FetchError::Decode(e.to_string())
    } else {
      FetchError::Transport(e.to_string())
    }
  }
}
