//! Resource normalizers: fetch a content type and project it into records.
//!
//! Every fetch returns an [`Outcome`]; failures are logged and reported, never
//! raised, and every record field is defaulted so a degenerate upstream
//! payload still renders.

mod books;
pub mod fields;
mod gallery;
mod news;
mod press;
mod programs;
pub mod util;

pub use books::normalize_book;
pub use gallery::{gallery_images, normalize_media};
pub use news::{merge_news, normalize_news};
pub use press::normalize_press;
pub use programs::normalize_program;

use color_eyre::{eyre::eyre, Result};
use tracing::{debug, error};
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::wp::api_types::{parse_items, ApiItem};
use crate::wp::endpoint::{build_url, Endpoint, ListParams, QueryParams};
use crate::wp::types::{Outcome, Page};
use crate::wp::CachedWpClient;

/// Entry point for every content read.
#[derive(Clone)]
pub struct ContentApi {
  client: CachedWpClient,
  base_url: Url,
  default_per_page: u32,
  locale: String,
}

impl ContentApi {
  pub fn new(config: &Config) -> Result<Self> {
    let client = CachedWpClient::new(config)?;
    Self::with_client(
      client,
      &config.api.base_url,
      config.api.per_page,
      &config.locale,
    )
  }

  pub fn with_client(
    client: CachedWpClient,
    base_url: &str,
    default_per_page: u32,
    locale: &str,
  ) -> Result<Self> {
    let base_url =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))?;

    Ok(Self {
      client,
      base_url,
      default_per_page: default_per_page.max(1),
      locale: locale.to_string(),
    })
  }

  pub fn locale(&self) -> &str {
    &self.locale
  }

  pub fn client(&self) -> &CachedWpClient {
    &self.client
  }

  /// Canonical URL for a request; also the cache key.
  pub fn url(&self, endpoint: Endpoint, params: &QueryParams) -> Url {
    build_url(&self.base_url, endpoint, self.default_per_page, params)
  }

  /// Raw items of one page plus the reported total page count.
  async fn fetch_items(
    &self,
    endpoint: Endpoint,
    params: &QueryParams,
  ) -> Result<(Vec<ApiItem>, u32), FetchError> {
    let url = self.url(endpoint, params);
    let response = self.client.fetch_resource(url.as_str()).await?;
    debug!(%endpoint, source = ?response.source, "Fetched content page");

    Ok((parse_items(&response.body), response.headers.total_pages()))
  }

  /// Fetch and normalize one page of `endpoint`.
  async fn fetch_page<T, F>(
    &self,
    endpoint: Endpoint,
    params: &QueryParams,
    normalize: F,
  ) -> Outcome<Page<T>>
  where
    F: Fn(&ApiItem) -> Vec<T>,
  {
    match self.fetch_items(endpoint, params).await {
      Ok((items, total_pages)) => {
        let records = items.iter().flat_map(&normalize).collect();
        Outcome::Loaded(Page::new(records, total_pages))
      }
      Err(e) => {
        error!(%endpoint, error = %e, "Error fetching {}", endpoint);
        Outcome::Failed(e)
      }
    }
  }

  /// First item matching `slug`; zero matches is `NotFound`.
  async fn fetch_by_slug<T, F>(&self, endpoint: Endpoint, slug: &str, normalize: F) -> Outcome<T>
  where
    F: Fn(&ApiItem) -> T,
  {
    let params = ListParams::slug(slug).into_query();
    match self.fetch_items(endpoint, &params).await {
      Ok((items, _)) => match items.first() {
        Some(item) => Outcome::Loaded(normalize(item)),
        None => Outcome::NotFound,
      },
      Err(e) => {
        error!(%endpoint, slug, error = %e, "Error fetching {} by slug", endpoint);
        Outcome::Failed(e)
      }
    }
  }
}

/// Page/page-size parameters overlaid with caller extras.
fn listing_params(list: ListParams, extra: &QueryParams) -> QueryParams {
  extra.merged_over(&list.into_query())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extras_override_listing_params() {
    let extra = QueryParams::new().set("order", "asc").set("search", "poetry");
    let params = listing_params(ListParams::page(2, 9).by_date_desc(), &extra);

    assert_eq!(params.get("page"), Some("2"));
    assert_eq!(params.get("order"), Some("asc"));
    assert_eq!(params.get("search"), Some("poetry"));
  }
}
