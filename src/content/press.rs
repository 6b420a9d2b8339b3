use super::fields::PRESS_FIELDS;
use super::{listing_params, ContentApi};
use crate::wp::api_types::ApiItem;
use crate::wp::endpoint::{Endpoint, ListParams, QueryParams};
use crate::wp::types::{Outcome, Page, PressRelease};

pub fn normalize_press(item: &ApiItem, locale: &str) -> PressRelease {
  let f = PRESS_FIELDS.resolve(item, locale);
  PressRelease {
    id: f.id,
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

/// The field was renamed from `external_links` at some point; accept both.
pub(crate) fn external_link(item: &ApiItem) -> String {
  item
    .acf_text("external_links")
    .or_else(|| item.acf_text("external_link"))
    .unwrap_or_default()
}

impl ContentApi {
  /// One page of press releases, newest first.
  pub async fn fetch_press(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<PressRelease>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::PressReleases, &params, |item| {
        vec![normalize_press(item, locale)]
      })
      .await
  }

  pub async fn fetch_press_by_slug(&self, slug: &str) -> Outcome<PressRelease> {
    let locale = self.locale();
    self
      .fetch_by_slug(Endpoint::PressReleases, slug, |item| {
        normalize_press(item, locale)
      })
      .await
  }
}
