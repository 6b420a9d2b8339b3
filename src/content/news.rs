use std::collections::HashSet;
use tracing::warn;

use super::fields::{POST_FIELDS, PRESS_FIELDS, PROGRAM_FIELDS};
use super::press::external_link;
use super::util::parse_datetime;
use super::{listing_params, ContentApi};
use crate::error::FetchError;
use crate::wp::api_types::ApiItem;
use crate::wp::endpoint::{Endpoint, ListParams, QueryParams};
use crate::wp::types::{NewsItem, NewsKind, Outcome, Page};

pub fn normalize_news(item: &ApiItem, kind: NewsKind, locale: &str) -> NewsItem {
  let fields = match kind {
    NewsKind::Program => PROGRAM_FIELDS,
    NewsKind::Press => PRESS_FIELDS,
    NewsKind::Post => POST_FIELDS,
  };
  let f = fields.resolve(item, locale);

  NewsItem {
    key: format!("{}-{}", kind, f.id),
    id: f.id,
    kind,
    slug: f.slug,
    title: f.title,
    author: f.author,
    excerpt: f.excerpt,
    content: f.content,
    image_url: f.image_url,
    date: f.date,
    date_display: f.date_display,
    category: f.category,
    link: f.link,
    external_link: external_link(item),
  }
}

/// Concatenate, drop repeated `(kind, id)` pairs, then order newest first.
///
/// The sort is stable: equal dates keep their concatenation order, and
/// undated entries sink to the end.
pub fn merge_news(programs: Vec<NewsItem>, press: Vec<NewsItem>) -> Vec<NewsItem> {
  let mut seen = HashSet::new();
  let mut merged: Vec<NewsItem> = programs
    .into_iter()
    .chain(press)
    .filter(|item| seen.insert((item.kind, item.id)))
    .collect();

  merged.sort_by(|a, b| parse_datetime(&b.date).cmp(&parse_datetime(&a.date)));
  merged
}

fn page_or_empty<T>(outcome: Outcome<Page<T>>) -> Result<Page<T>, FetchError> {
  match outcome {
    Outcome::Loaded(page) => Ok(page),
    Outcome::NotFound => Ok(Page::empty()),
    Outcome::Failed(e) => Err(e),
  }
}

impl ContentApi {
  /// Programs and press releases merged into one newest-first feed.
  ///
  /// Both sources are requested concurrently for the same page. If only one
  /// of them fails the other is still shown.
  pub async fn fetch_news(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<NewsItem>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();

    let (programs, press) = futures::join!(
      self.fetch_page(Endpoint::Programs, &params, |item| {
        vec![normalize_news(item, NewsKind::Program, locale)]
      }),
      self.fetch_page(Endpoint::PressReleases, &params, |item| {
        vec![normalize_news(item, NewsKind::Press, locale)]
      }),
    );

    let (programs, press) = match (page_or_empty(programs), page_or_empty(press)) {
      (Ok(a), Ok(b)) => (a, b),
      (Ok(a), Err(e)) => {
        warn!(error = %e, "Press releases unavailable, news shows programs only");
        (a, Page::empty())
      }
      (Err(e), Ok(b)) => {
        warn!(error = %e, "Programs unavailable, news shows press releases only");
        (Page::empty(), b)
      }
      (Err(e), Err(_)) => return Outcome::Failed(e),
    };

    let total_pages = programs.total_pages.max(press.total_pages);
    Outcome::Loaded(Page::new(
      merge_news(programs.items, press.items),
      total_pages,
    ))
  }

  /// Generic WordPress posts as news entries.
  pub async fn fetch_posts(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<NewsItem>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::News, &params, |item| {
        vec![normalize_news(item, NewsKind::Post, locale)]
      })
      .await
  }

  /// News entry by slug; a program wins over a press release with the same slug.
  pub async fn fetch_news_by_slug(&self, slug: &str) -> Outcome<NewsItem> {
    let locale = self.locale();
    let (program, press) = futures::join!(
      self.fetch_by_slug(Endpoint::Programs, slug, |item| {
        normalize_news(item, NewsKind::Program, locale)
      }),
      self.fetch_by_slug(Endpoint::PressReleases, slug, |item| {
        normalize_news(item, NewsKind::Press, locale)
      }),
    );

    match (program, press) {
      (Outcome::Loaded(item), _) | (_, Outcome::Loaded(item)) => Outcome::Loaded(item),
      (Outcome::Failed(e), _) | (_, Outcome::Failed(e)) => Outcome::Failed(e),
      (Outcome::NotFound, Outcome::NotFound) => Outcome::NotFound,
    }
  }
}
