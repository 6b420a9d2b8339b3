//! Serde-deserializable types matching WordPress REST responses.
//!
//! These mirror the upstream payload loosely: every field is optional and
//! defaulted, and the ACF bag stays an untyped map. Nothing here leaves the
//! normalizers; views only ever see the types in `wp::types`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

// ============================================================================
// Item
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiItem {
  #[serde(default, deserialize_with = "lenient_id")]
  pub id: u64,
  #[serde(default, deserialize_with = "lenient_string")]
  pub slug: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub date: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub link: String,
  #[serde(default, deserialize_with = "rendered")]
  pub title: String,
  #[serde(default, deserialize_with = "rendered")]
  pub excerpt: String,
  #[serde(default, deserialize_with = "rendered")]
  pub content: String,
  /// Advanced Custom Fields bag; schema varies per content type
  #[serde(default, deserialize_with = "acf_bag")]
  pub acf: Map<String, Value>,
  #[serde(default, rename = "_embedded")]
  pub embedded: Option<ApiEmbedded>,

  // Media library only
  #[serde(default, deserialize_with = "lenient_string")]
  pub source_url: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub alt_text: String,
  #[serde(default, deserialize_with = "rendered")]
  pub caption: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEmbedded {
  #[serde(default, rename = "wp:featuredmedia")]
  pub featured_media: Vec<ApiMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMedia {
  #[serde(default, deserialize_with = "lenient_string")]
  pub source_url: String,
}

impl ApiItem {
  /// First embedded featured media URL, if any.
  pub fn featured_media_url(&self) -> Option<&str> {
    self
      .embedded
      .as_ref()?
      .featured_media
      .first()
      .map(|m| m.source_url.as_str())
      .filter(|s| !s.trim().is_empty())
  }

  /// Non-blank ACF text value. Numbers are rendered as text.
  pub fn acf_text(&self, key: &str) -> Option<String> {
    match self.acf.get(key)? {
      Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  /// URL of an ACF image field.
  ///
  /// Image fields arrive as an object with `url`, a bare URL string, or an
  /// attachment id depending on the field's return format; ids cannot be
  /// resolved without another request and yield `None`.
  pub fn acf_image(&self, key: &str) -> Option<String> {
    image_value_url(self.acf.get(key)?)
  }

  /// ACF array field (galleries, repeaters).
  pub fn acf_list(&self, key: &str) -> Option<&Vec<Value>> {
    self.acf.get(key)?.as_array()
  }
}

/// URL carried by an ACF image value.
pub fn image_value_url(value: &Value) -> Option<String> {
  let url = match value {
    Value::String(s) => s.as_str(),
    Value::Object(obj) => obj
      .get("url")
      .or_else(|| obj.get("source_url"))
      .and_then(Value::as_str)?,
    _ => return None,
  };
  let url = url.trim();
  if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/') {
    Some(url.to_string())
  } else {
    None
  }
}

/// Decode a list response, skipping elements that are not usable items.
pub fn parse_items(body: &Value) -> Vec<ApiItem> {
  let Some(array) = body.as_array() else {
    warn!("Expected a JSON array from the content API");
    return Vec::new();
  };

  array
    .iter()
    .filter_map(|value| match ApiItem::deserialize(value) {
      Ok(item) => Some(item),
      Err(e) => {
        warn!(error = %e, "Skipping malformed content item");
        None
      }
    })
    .collect()
}

// ============================================================================
// Lenient field decoders
// ============================================================================

/// `{"rendered": "..."}`, a bare string, or null.
fn rendered<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(match value {
    Value::String(s) => s,
    Value::Object(obj) => obj
      .get("rendered")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string(),
    _ => String::new(),
  })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(match value {
    Value::String(s) => s,
    Value::Number(n) => n.to_string(),
    _ => String::new(),
  })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  match &value {
    Value::Number(n) => n
      .as_u64()
      .ok_or_else(|| serde::de::Error::custom(format!("invalid id {}", n))),
    Value::String(s) => s
      .trim()
      .parse()
      .map_err(|_| serde::de::Error::custom(format!("invalid id {:?}", s))),
    Value::Null => Ok(0),
    other => Err(serde::de::Error::custom(format!("invalid id {}", other))),
  }
}

/// WordPress sends `[]` or `false` instead of `{}` for an empty ACF bag.
fn acf_bag<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(match value {
    Value::Object(map) => map,
    _ => Map::new(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_full_item() {
    let item: ApiItem = serde_json::from_value(json!({
      "id": 12,
      "slug": "first-book",
      "date": "2024-03-15T10:00:00",
      "link": "https://example.org/books/first-book",
      "title": { "rendered": "First &amp; Best" },
      "excerpt": { "rendered": "<p>Short</p>" },
      "content": { "rendered": "<p>Long</p>", "protected": false },
      "acf": { "author": "Sita", "cover_image": { "url": "https://cdn/x.jpg", "id": 4 } },
      "_embedded": { "wp:featuredmedia": [{ "source_url": "https://cdn/f.jpg" }] }
    }))
    .unwrap();

    assert_eq!(item.id, 12);
    assert_eq!(item.title, "First &amp; Best");
    assert_eq!(item.acf_text("author").as_deref(), Some("Sita"));
    assert_eq!(item.acf_image("cover_image").as_deref(), Some("https://cdn/x.jpg"));
    assert_eq!(item.featured_media_url(), Some("https://cdn/f.jpg"));
  }

  #[test]
  fn test_empty_acf_shapes() {
    for acf in [json!([]), json!(false), json!(null)] {
      let item: ApiItem = serde_json::from_value(json!({ "id": 1, "acf": acf })).unwrap();
      assert!(item.acf.is_empty());
    }
  }

  #[test]
  fn test_lenient_scalars() {
    let item: ApiItem = serde_json::from_value(json!({
      "id": "7",
      "title": "Plain title",
      "excerpt": null,
      "acf": { "author": "", "year": 2080, "picture": 55 }
    }))
    .unwrap();

    assert_eq!(item.id, 7);
    assert_eq!(item.title, "Plain title");
    assert_eq!(item.excerpt, "");
    assert_eq!(item.acf_text("author"), None);
    assert_eq!(item.acf_text("year").as_deref(), Some("2080"));
    assert_eq!(item.acf_image("picture"), None);
  }

  #[test]
  fn test_parse_items_skips_garbage() {
    let items = parse_items(&json!([{ "id": 1 }, "nope", { "id": { "x": 1 } }, { "id": 2 }]));
    let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2]);

    assert!(parse_items(&json!({ "code": "rest_no_route" })).is_empty());
  }

  #[test]
  fn test_image_value_url_rejects_non_urls() {
    assert_eq!(image_value_url(&json!("")), None);
    assert_eq!(image_value_url(&json!("not a url")), None);
    assert_eq!(
      image_value_url(&json!({ "source_url": "https://cdn/a.png" })).as_deref(),
      Some("https://cdn/a.png")
    );
  }
}
