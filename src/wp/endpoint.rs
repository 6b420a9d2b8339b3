//! Endpoint descriptors and canonical query URLs.

use std::fmt;
use url::Url;

/// Fields projected from content endpoints.
pub const CONTENT_FIELDS: &str = "id,slug,title,link,date,excerpt,content,acf,_embedded";

/// Fields projected from the media library.
pub const MEDIA_FIELDS: &str = "id,slug,title,link,date,source_url,alt_text,caption";

/// The fixed set of WordPress endpoints this site reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Books,
  Programs,
  PressReleases,
  /// Generic posts, the news source of older site versions
  News,
  /// Media library
  Gallery,
}

impl Endpoint {
  pub fn name(&self) -> &'static str {
    match self {
      Endpoint::Books => "books",
      Endpoint::Programs => "programs",
      Endpoint::PressReleases => "press",
      Endpoint::News => "news",
      Endpoint::Gallery => "gallery",
    }
  }

  pub fn path(&self) -> &'static str {
    match self {
      Endpoint::Books => "/books",
      Endpoint::Programs => "/programs",
      Endpoint::PressReleases => "/press-releases",
      Endpoint::News => "/posts",
      Endpoint::Gallery => "/media",
    }
  }

  /// Parameters sent with every request to this endpoint.
  pub fn default_params(&self, per_page: u32) -> QueryParams {
    let fields = match self {
      Endpoint::Gallery => MEDIA_FIELDS,
      _ => CONTENT_FIELDS,
    };
    let params = QueryParams::new();
    let params = match self {
      Endpoint::Gallery => params,
      _ => params.set("_embed", true),
    };
    params.set("per_page", per_page).set("_fields", fields)
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Insertion-ordered query parameters.
///
/// A `None` value marks a parameter as explicitly absent: it is never
/// serialized, and when merged over a default it removes that default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key`, replacing an existing value in place.
  pub fn set(mut self, key: &str, value: impl ToString) -> Self {
    self.insert(key, Some(value.to_string()));
    self
  }

  /// Set `key` only when `value` is present; `None` marks it absent.
  pub fn set_opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
    self.insert(key, value.map(|v| v.to_string()));
    self
  }

  pub fn insert(&mut self, key: &str, value: Option<String>) {
    match self.pairs.iter_mut().find(|(k, _)| k == key) {
      Some((_, existing)) => *existing = value,
      None => self.pairs.push((key.to_string(), value)),
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .pairs
      .iter()
      .find(|(k, _)| k == key)
      .and_then(|(_, v)| v.as_deref())
  }

  /// Overlay `self` on `defaults`: caller values win, colliding keys keep
  /// the default's position, new keys follow in caller order.
  pub fn merged_over(&self, defaults: &QueryParams) -> QueryParams {
    let mut merged = defaults.clone();
    for (key, value) in &self.pairs {
      merged.insert(key, value.clone());
    }
    merged
  }

  /// Present parameters in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .pairs
      .iter()
      .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
  }

  pub fn is_empty(&self) -> bool {
    self.iter().next().is_none()
  }
}

/// Listing parameters shared by every paginated fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
  pub page: Option<u32>,
  pub per_page: Option<u32>,
  pub orderby: Option<String>,
  pub order: Option<String>,
  pub search: Option<String>,
  pub slug: Option<String>,
}

impl ListParams {
  pub fn page(page: u32, per_page: u32) -> Self {
    Self {
      page: Some(page),
      per_page: Some(per_page),
      ..Default::default()
    }
  }

  /// Newest first.
  pub fn by_date_desc(mut self) -> Self {
    self.orderby = Some("date".to_string());
    self.order = Some("desc".to_string());
    self
  }

  /// Single-item lookup by slug.
  pub fn slug(slug: &str) -> Self {
    Self {
      slug: Some(slug.to_string()),
      per_page: Some(1),
      ..Default::default()
    }
  }

  pub fn into_query(self) -> QueryParams {
    QueryParams::new()
      .set_opt("per_page", self.per_page)
      .set_opt("page", self.page)
      .set_opt("orderby", self.orderby)
      .set_opt("order", self.order)
      .set_opt("search", self.search.filter(|s| !s.trim().is_empty()))
      .set_opt("slug", self.slug)
  }
}

/// Build the canonical absolute URL for `endpoint`.
///
/// Identical input always produces an identical URL, which is what makes
/// it usable as a cache key.
pub fn build_url(
  base: &Url,
  endpoint: Endpoint,
  default_per_page: u32,
  params: &QueryParams,
) -> Url {
  let mut url = base.clone();
  {
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}{}", base_path, endpoint.path()));
  }
  url.set_query(None);

  let merged = params.merged_over(&endpoint.default_params(default_per_page));
  if !merged.is_empty() {
    let mut pairs = url.query_pairs_mut();
    for (key, value) in merged.iter() {
      pairs.append_pair(key, value);
    }
  }
  url
}
