//! Session-scoped HTTP cache with conditional revalidation.
//!
//! This module provides the caching mechanism behind every content fetch:
//! - Keys entries by the canonical request URL
//! - Stores the last successful body together with its response headers
//! - Revalidates with `If-None-Match` / `If-Modified-Since` instead of expiring
//! - Serves the stale copy when the network or server fails

mod layer;
mod storage;
mod traits;

pub use layer::{CacheLayer, Fetched};
pub use storage::{MemoryStore, NoopStorage, SqliteStore};
pub use traits::{CacheEntry, CacheResult, CacheSource, CacheStore, Headers, Validators};
