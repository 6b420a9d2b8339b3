use serde_json::Value;

use super::fields::{CommonFields, MEDIA_FIELDS, PROGRAM_FIELDS};
use super::util::clean_html_content;
use super::{listing_params, ContentApi};
use crate::wp::api_types::{image_value_url, ApiItem};
use crate::wp::endpoint::{Endpoint, ListParams, QueryParams};
use crate::wp::types::{GalleryImage, Outcome, Page};

/// ACF keys that hold a program's photo gallery.
const GALLERY_KEYS: [&str; 2] = ["photo_gallery", "gallery"];

/// Gallery records for one program.
///
/// A photo gallery fans out into one record per resolvable image, with ids
/// `{itemId}-{imageId}`. Without one, the item's best single image is used.
/// Items with no image at all produce nothing.
pub fn gallery_images(item: &ApiItem, locale: &str) -> Vec<GalleryImage> {
  let base = PROGRAM_FIELDS.resolve(item, locale);

  let gallery = GALLERY_KEYS
    .iter()
    .find_map(|key| item.acf_list(key))
    .map(Vec::as_slice)
    .unwrap_or_default();

  let fanned: Vec<GalleryImage> = gallery
    .iter()
    .enumerate()
    .filter_map(|(index, value)| gallery_entry(&base, index, value))
    .collect();

  if !fanned.is_empty() {
    return fanned;
  }

  match &base.image_url {
    Some(url) => vec![record(&base, base.id.to_string(), url.clone(), String::new())],
    None => Vec::new(),
  }
}

fn gallery_entry(base: &CommonFields, index: usize, value: &Value) -> Option<GalleryImage> {
  let url = image_value_url(value)?;

  let image_id = ["id", "ID"]
    .iter()
    .find_map(|k| match value.get(*k)? {
      Value::Number(n) => Some(n.to_string()),
      Value::String(s) if !s.is_empty() => Some(s.clone()),
      _ => None,
    })
    .unwrap_or_else(|| (index + 1).to_string());

  let text = |key: &str| {
    value
      .get(key)
      .and_then(Value::as_str)
      .map(clean_html_content)
      .filter(|s| !s.is_empty())
  };

  let mut image = record(
    base,
    format!("{}-{}", base.id, image_id),
    url,
    text("caption").or_else(|| text("alt")).unwrap_or_default(),
  );
  if let Some(title) = text("title") {
    image.title = title;
  }
  Some(image)
}

fn record(base: &CommonFields, id: String, image_url: String, caption: String) -> GalleryImage {
  GalleryImage {
    id,
    source_id: base.id,
    title: base.title.clone(),
    author: base.author.clone(),
    caption,
    image_url,
    date: base.date.clone(),
    date_display: base.date_display.clone(),
    category: base.category.clone(),
  }
}

/// Media library attachment as a gallery record; attachments without a
/// source URL are dropped.
pub fn normalize_media(item: &ApiItem, locale: &str) -> Option<GalleryImage> {
  let f = MEDIA_FIELDS.resolve(item, locale);
  let url = f.image_url.clone()?;
  let caption = f.excerpt.clone();
  Some(record(&f, f.id.to_string(), url, caption))
}

impl ContentApi {
  /// Gallery built from program images, newest programs first.
  pub async fn fetch_gallery(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<GalleryImage>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::Programs, &params, |item| {
        gallery_images(item, locale)
      })
      .await
      .map(Page::dedup)
  }

  /// Images straight from the media library.
  pub async fn fetch_media(
    &self,
    page: u32,
    per_page: u32,
    extra: &QueryParams,
  ) -> Outcome<Page<GalleryImage>> {
    let params = listing_params(ListParams::page(page, per_page).by_date_desc(), extra);
    let locale = self.locale();
    self
      .fetch_page(Endpoint::Gallery, &params, |item| {
        normalize_media(item, locale).into_iter().collect()
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn item(value: serde_json::Value) -> ApiItem {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_gallery_fans_out() {
    let raw = item(json!({
      "id": 9,
      "title": { "rendered": "Book Fair" },
      "acf": {
        "picture": { "url": "https://cdn/cover.jpg" },
        "photo_gallery": [
          { "id": 101, "url": "https://cdn/1.jpg", "caption": "Opening" },
          { "id": 102, "url": "https://cdn/2.jpg", "title": "Crowd" },
          { "id": 103, "url": "https://cdn/3.jpg" }
        ]
      }
    }));

    let images = gallery_images(&raw, "en-US");
    assert_eq!(images.len(), 3);
    let ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["9-101", "9-102", "9-103"]);
    assert!(images.iter().all(|i| i.id.starts_with("9-") && i.source_id == 9));
    assert_eq!(images[0].caption, "Opening");
    assert_eq!(images[1].title, "Crowd");
    assert_eq!(images[2].title, "Book Fair");
  }

  #[test]
  fn test_single_image_fallback() {
    let raw = item(json!({
      "id": 10,
      "_embedded": { "wp:featuredmedia": [{ "source_url": "https://cdn/feat.jpg" }] }
    }));
    let images = gallery_images(&raw, "en-US");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, "10");
    assert_eq!(images[0].image_url, "https://cdn/feat.jpg");
  }

  #[test]
  fn test_no_image_emits_nothing() {
    let raw = item(json!({ "id": 11, "acf": { "photo_gallery": false } }));
    assert!(gallery_images(&raw, "en-US").is_empty());
  }

  #[test]
  fn test_unresolvable_gallery_falls_back() {
    let raw = item(json!({
      "id": 12,
      "acf": {
        "gallery": [55, 56],
        "opt_picture": { "url": "https://cdn/opt.jpg" }
      }
    }));
    let images = gallery_images(&raw, "en-US");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_url, "https://cdn/opt.jpg");
  }

  #[test]
  fn test_gallery_entry_without_id_uses_position() {
    let raw = item(json!({
      "id": 13,
      "acf": { "photo_gallery": ["https://cdn/a.jpg", "https://cdn/b.jpg"] }
    }));
    let ids: Vec<String> = gallery_images(&raw, "en-US").into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["13-1", "13-2"]);
  }

  #[test]
  fn test_normalize_media() {
    let raw = item(json!({
      "id": 300,
      "title": { "rendered": "Library opening" },
      "source_url": "https://cdn/media.jpg",
      "caption": { "rendered": "<p>Ribbon cutting</p>" }
    }));
    let image = normalize_media(&raw, "en-US").unwrap();
    assert_eq!(image.id, "300");
    assert_eq!(image.caption, "Ribbon cutting");

    assert!(normalize_media(&item(json!({ "id": 301 })), "en-US").is_none());
  }
}
