use super::fields::BOOK_FIELDS;
use super::{listing_params, ContentApi};
use crate::wp::api_types::ApiItem;
use crate::wp::endpoint::{Endpoint, ListParams, QueryParams};
use crate::wp::types::{Book, Outcome, Page};

pub fn normalize_book(item: &ApiItem, locale: &str) -> Book {
  let f = BOOK_FIELDS.resolve(item, locale);
  Book {
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
    external_link: item.acf_text("external_link").unwrap_or_default(),
  }
}

impl ContentApi {
  /// One page of books, in server order.
  pub async fn fetch_books(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<Book>> {
    let params = listing_params(ListParams::page(page, per_page), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::Books, &params, |item| {
        vec![normalize_book(item, locale)]
      })
      .await
  }

  pub async fn fetch_book_by_slug(&self, slug: &str) -> Outcome<Book> {
    let locale = self.locale();
    self
      .fetch_by_slug(Endpoint::Books, slug, |item| normalize_book(item, locale))
      .await
  }
}
