use super::fields::PROGRAM_FIELDS;
use super::util::format_date;
use super::{listing_params, ContentApi};
use crate::wp::api_types::ApiItem;
use crate::wp::endpoint::{Endpoint, ListParams, QueryParams};
use crate::wp::types::{Outcome, Page, Program};

pub fn normalize_program(item: &ApiItem, locale: &str) -> Program {
  let f = PROGRAM_FIELDS.resolve(item, locale);

  // text_contents is a plain textarea; keep its line breaks when it is the body
  let content = if item.acf_text("full_content").is_none() {
    f.content.replace("\r\n", "<br/>")
  } else {
    f.content
  };

  Program {
    id: f.id,
    slug: f.slug,
    heading: item
      .acf_text("program_heading")
      .map(|h| h.trim().to_string())
      .unwrap_or_else(|| f.title.clone()),
    title: f.title,
    author: f.author,
    excerpt: f.excerpt,
    content,
    image_url: f.image_url,
    date: f.date,
    date_display: f.date_display,
    start_date: format_date(item.acf_text("start_date").as_deref(), locale),
    end_date: format_date(item.acf_text("end_date").as_deref(), locale),
    category: f.category,
    link: f.link,
  }
}

impl ContentApi {
  /// One page of programs, newest first.
  pub async fn fetch_programs(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<Program>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::Programs, &params, |item| {
        vec![normalize_program(item, locale)]
      })
      .await
  }

  pub async fn fetch_program_by_slug(&self, slug: &str) -> Outcome<Program> {
    let locale = self.locale();
    self
      .fetch_by_slug(Endpoint::Programs, slug, |item| {
        normalize_program(item, locale)
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_normalize_program() {
    let item: ApiItem = serde_json::from_value(json!({
      "id": 5,
      "slug": "reading-camp",
      "date": "2024-01-02T08:00:00",
      "title": { "rendered": "Reading Camp" },
      "acf": {
        "program_heading": "Summer reading for children",
        "start_date": "20240110",
        "end_date": "20240112",
        "description": "Three days of stories",
        "text_contents": "Day one\r\nDay two",
        "picture": { "url": "https://cdn/camp.jpg" }
      }
    }))
    .unwrap();

    let program = normalize_program(&item, "en-US");
    assert_eq!(program.title, "Reading Camp");
    assert_eq!(program.heading, "Summer reading for children");
    assert_eq!(program.excerpt, "Three days of stories");
    assert_eq!(program.content, "Day one<br/>Day two");
    assert_eq!(program.start_date, "January 10, 2024");
    assert_eq!(program.end_date, "January 12, 2024");
    assert_eq!(program.image_url.as_deref(), Some("https://cdn/camp.jpg"));
    assert_eq!(program.author, "Unknown Author");
  }

  #[test]
  fn test_heading_defaults_to_title() {
    let item: ApiItem =
      serde_json::from_value(json!({ "id": 6, "title": { "rendered": "Workshop" } })).unwrap();
    let program = normalize_program(&item, "en-US");
    assert_eq!(program.heading, "Workshop");
    assert_eq!(program.start_date, "");
  }
}
