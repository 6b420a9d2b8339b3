use serde::Serialize;
use std::fmt;

use crate::error::FetchError;

/// Records that can be deduplicated in an accumulated listing.
pub trait Record {
  /// Unique identity within one listing
  fn record_key(&self) -> String;
}

/// One page of normalized records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// Always at least 1
  pub total_pages: u32,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total_pages: u32) -> Self {
    Self {
      items,
      total_pages: total_pages.max(1),
    }
  }

  pub fn empty() -> Self {
    Self::new(Vec::new(), 1)
  }
}

impl<T: Record> Page<T> {
  /// Drop later occurrences of an already seen record key.
  pub fn dedup(mut self) -> Self {
    let mut seen = std::collections::HashSet::new();
    self.items.retain(|item| seen.insert(item.record_key()));
    self
  }
}

/// Result of a content fetch, distinguishing "not found" from "failed".
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
  Loaded(T),
  NotFound,
  Failed(FetchError),
}

impl<T> Outcome<T> {
  pub fn loaded(self) -> Option<T> {
    match self {
      Outcome::Loaded(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&FetchError> {
    match self {
      Outcome::Failed(e) => Some(e),
      _ => None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
    match self {
      Outcome::Loaded(data) => Outcome::Loaded(f(data)),
      Outcome::NotFound => Outcome::NotFound,
      Outcome::Failed(e) => Outcome::Failed(e),
    }
  }
}

impl<T> Outcome<Page<T>> {
  /// Collapse to a page: anything but `Loaded` becomes an empty first page.
  pub fn into_page_or_empty(self) -> Page<T> {
    self.loaded().unwrap_or_else(Page::empty)
  }
}

impl<T> From<Result<T, FetchError>> for Outcome<T> {
  fn from(result: Result<T, FetchError>) -> Self {
    match result {
      Ok(data) => Outcome::Loaded(data),
      Err(e) => Outcome::Failed(e),
    }
  }
}

// ============================================================================
// Normalized records
// ============================================================================

/// Book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
  pub id: u64,
  pub slug: String,
  pub title: String,
  pub author: String,
  /// Plain-text preview
  pub excerpt: String,
  /// HTML body
  pub content: String,
  pub image_url: Option<String>,
  pub date: String,
  pub date_display: String,
  pub category: String,
  pub link: String,
  pub external_link: String,
}

/// Program (event, workshop, campaign)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
  pub id: u64,
  pub slug: String,
  pub title: String,
  pub heading: String,
  pub author: String,
  pub excerpt: String,
  pub content: String,
  pub image_url: Option<String>,
  pub date: String,
  pub date_display: String,
  pub start_date: String,
  pub end_date: String,
  pub category: String,
  pub link: String,
}

/// Press release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressRelease {
  pub id: u64,
  pub slug: String,
  pub title: String,
  pub author: String,
  pub excerpt: String,
  pub content: String,
  pub image_url: Option<String>,
  pub date: String,
  pub date_display: String,
  pub category: String,
  pub link: String,
  pub external_link: String,
}

/// Source content type of a news entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsKind {
  Program,
  Press,
  Post,
}

impl NewsKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NewsKind::Program => "program",
      NewsKind::Press => "press",
      NewsKind::Post => "post",
    }
  }
}

impl fmt::Display for NewsKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// News entry merged from several content types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
  /// `{kind}-{id}`, unique across kinds
  pub key: String,
  pub id: u64,
  pub kind: NewsKind,
  pub slug: String,
  pub title: String,
  pub author: String,
  pub excerpt: String,
  pub content: String,
  pub image_url: Option<String>,
  pub date: String,
  pub date_display: String,
  pub category: String,
  pub link: String,
  pub external_link: String,
}

/// Gallery image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
  /// Source item id, or `{itemId}-{imageId}` for gallery fan-out
  pub id: String,
  pub source_id: u64,
  pub title: String,
  pub author: String,
  pub caption: String,
  pub image_url: String,
  pub date: String,
  pub date_display: String,
  pub category: String,
}

impl Record for Book {
  fn record_key(&self) -> String {
    self.id.to_string()
  }
}

impl Record for Program {
  fn record_key(&self) -> String {
    self.id.to_string()
  }
}

impl Record for PressRelease {
  fn record_key(&self) -> String {
    self.id.to_string()
  }
}

impl Record for NewsItem {
  fn record_key(&self) -> String {
    self.key.clone()
  }
}

impl Record for GalleryImage {
  fn record_key(&self) -> String {
    self.id.clone()
  }
}

// Single-line summaries for listings

impl fmt::Display for Book {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} | {} | {}", self.title, self.author, self.date_display)
  }
}

impl fmt::Display for Program {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} | {}", self.title, self.date_display)?;
    if !self.start_date.is_empty() {
      write!(f, " | {} - {}", self.start_date, self.end_date)?;
    }
    Ok(())
  }
}

impl fmt::Display for PressRelease {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} | {} | {}", self.title, self.date_display, self.author)
  }
}

impl fmt::Display for NewsItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} | {} | {}",
      self.kind.as_str().to_uppercase(),
      self.date_display,
      self.title
    )
  }
}

impl fmt::Display for GalleryImage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} | {}", self.title, self.image_url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn image(id: &str) -> GalleryImage {
    GalleryImage {
      id: id.to_string(),
      source_id: 1,
      title: "t".to_string(),
      author: "Unknown Author".to_string(),
      caption: String::new(),
      image_url: "https://cdn/x.jpg".to_string(),
      date: String::new(),
      date_display: String::new(),
      category: "General".to_string(),
    }
  }

  #[test]
  fn test_page_never_reports_zero_pages() {
    let page: Page<Book> = Page::new(Vec::new(), 0);
    assert_eq!(page.total_pages, 1);
  }

  #[test]
  fn test_page_dedup_keeps_first() {
    let page = Page::new(vec![image("1-1"), image("1-2"), image("1-1")], 2).dedup();
    let ids: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["1-1", "1-2"]);
  }

  #[test]
  fn test_failed_outcome_collapses_to_empty_page() {
    let outcome: Outcome<Page<Book>> = Outcome::Failed(FetchError::Status(500));
    assert_eq!(outcome.error(), Some(&FetchError::Status(500)));
    let page = outcome.into_page_or_empty();
    assert!(page.items.is_empty());
    assert_eq!(page.total_pages, 1);
  }

  #[test]
  fn test_news_kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&NewsKind::Press).unwrap(), "\"press\"");
  }
}
