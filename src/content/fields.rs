//! Declarative field resolution for every content type.
//!
//! Each field of a normalized record is resolved from an ordered list of
//! accessors; the first non-blank value wins, otherwise the field default
//! applies. The tables below are the only place that knows which ACF keys a
//! content type uses.

use super::util::{clean_html_content, format_date};
use crate::wp::api_types::ApiItem;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const GENERAL: &str = "General";

/// One way of reading a value out of a raw item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  /// ACF text field
  Acf(&'static str),
  /// ACF image field (object with `url`, or a bare URL)
  AcfImage(&'static str),
  Title,
  Excerpt,
  Content,
  /// `_embedded["wp:featuredmedia"][0].source_url`
  FeaturedMedia,
  /// Media library `source_url`
  MediaUrl,
  /// Media library `alt_text`
  AltText,
  Caption,
}

impl Source {
  pub fn resolve(&self, item: &ApiItem) -> Option<String> {
    let value = match self {
      Source::Acf(key) => item.acf_text(key)?,
      Source::AcfImage(key) => item.acf_image(key)?,
      Source::Title => item.title.clone(),
      Source::Excerpt => item.excerpt.clone(),
      Source::Content => item.content.clone(),
      Source::FeaturedMedia => item.featured_media_url()?.to_string(),
      Source::MediaUrl => item.source_url.clone(),
      Source::AltText => item.alt_text.clone(),
      Source::Caption => item.caption.clone(),
    };
    Some(value).filter(|v| !v.trim().is_empty())
  }
}

/// First non-blank value along `chain`.
pub fn first_non_empty(item: &ApiItem, chain: &[Source]) -> Option<String> {
  chain.iter().find_map(|source| source.resolve(item))
}

/// Image precedence shared by all content types.
pub const IMAGE_CHAIN: &[Source] = &[
  Source::AcfImage("picture"),
  Source::AcfImage("opt_picture"),
  Source::AcfImage("cover_image"),
  Source::AcfImage("image_proof"),
  Source::FeaturedMedia,
];

/// Accessor lists for the fields every record carries.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
  pub title: &'static [Source],
  pub author: &'static [Source],
  pub excerpt: &'static [Source],
  pub content: &'static [Source],
  pub image: &'static [Source],
  pub category: &'static [Source],
}

pub const BOOK_FIELDS: FieldMap = FieldMap {
  title: &[Source::Title],
  author: &[Source::Acf("author")],
  excerpt: &[Source::Acf("about_book"), Source::Excerpt],
  content: &[Source::Acf("full_content"), Source::Acf("about_book"), Source::Content],
  image: IMAGE_CHAIN,
  category: &[Source::Acf("category")],
};

pub const PROGRAM_FIELDS: FieldMap = FieldMap {
  title: &[Source::Title],
  author: &[Source::Acf("author")],
  excerpt: &[
    Source::Acf("description"),
    Source::Acf("text_contents"),
    Source::Excerpt,
  ],
  content: &[
    Source::Acf("full_content"),
    Source::Acf("text_contents"),
    Source::Content,
  ],
  image: IMAGE_CHAIN,
  category: &[Source::Acf("category")],
};

pub const PRESS_FIELDS: FieldMap = FieldMap {
  title: &[Source::Acf("subject"), Source::Title],
  author: &[Source::Acf("author")],
  excerpt: &[Source::Acf("description"), Source::Excerpt],
  content: &[Source::Acf("full_content"), Source::Content],
  image: IMAGE_CHAIN,
  category: &[Source::Acf("category")],
};

pub const POST_FIELDS: FieldMap = FieldMap {
  title: &[Source::Title],
  author: &[Source::Acf("author")],
  excerpt: &[Source::Excerpt],
  content: &[Source::Content],
  image: IMAGE_CHAIN,
  category: &[Source::Acf("category")],
};

pub const MEDIA_FIELDS: FieldMap = FieldMap {
  title: &[Source::Title, Source::AltText],
  author: &[Source::Acf("author")],
  excerpt: &[Source::Caption, Source::AltText],
  content: &[Source::Caption],
  image: &[Source::MediaUrl],
  category: &[Source::Acf("category")],
};

/// Fields common to every normalized record, already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFields {
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
}

impl FieldMap {
  pub fn resolve(&self, item: &ApiItem, locale: &str) -> CommonFields {
    let title = first_non_empty(item, self.title)
      .map(|t| clean_html_content(&t))
      .filter(|t| !t.is_empty())
      .unwrap_or_else(|| UNTITLED.to_string());

    CommonFields {
      id: item.id,
      slug: item.slug.clone(),
      title,
      author: first_non_empty(item, self.author)
        .map(|a| a.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
      excerpt: first_non_empty(item, self.excerpt)
        .map(|e| clean_html_content(&e))
        .unwrap_or_default(),
      content: first_non_empty(item, self.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default(),
      image_url: first_non_empty(item, self.image),
      date: item.date.clone(),
      date_display: format_date(Some(item.date.as_str()), locale),
      category: first_non_empty(item, self.category)
        .map(|c| c.trim().to_string())
        .unwrap_or_else(|| GENERAL.to_string()),
      link: item.link.clone(),
    }
  }
}
