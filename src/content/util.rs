//! Shared helpers: image resolution, HTML cleaning, date display.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::Html;

use super::fields::{first_non_empty, IMAGE_CHAIN};
use crate::wp::api_types::ApiItem;

/// Best image for an item: ACF picture, optional picture, cover image,
/// proof image, then the embedded featured media.
pub fn extract_image_url(item: &ApiItem) -> Option<String> {
  first_non_empty(item, IMAGE_CHAIN)
}

/// Strip markup and decode entities, keeping the text content.
///
/// Whitespace runs collapse to a single space and the result is trimmed.
/// No truncation happens here.
pub fn clean_html_content(html: &str) -> String {
  if html.trim().is_empty() {
    return String::new();
  }

  let fragment = Html::parse_fragment(html);
  let text: String = fragment.root_element().text().collect();
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display locale for dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
  #[default]
  EnUs,
  EnGb,
  NeNp,
}

impl Locale {
  /// Parse a BCP 47 tag; unknown tags fall back to en-US.
  pub fn from_tag(tag: &str) -> Self {
    let tag = tag.trim().to_ascii_lowercase().replace('_', "-");
    match tag.as_str() {
      "ne" | "ne-np" => Locale::NeNp,
      "en-gb" | "en-in" | "en-np" => Locale::EnGb,
      _ => Locale::EnUs,
    }
  }

  pub fn tag(&self) -> &'static str {
    match self {
      Locale::EnUs => "en-US",
      Locale::EnGb => "en-GB",
      Locale::NeNp => "ne-NP",
    }
  }
}

const NEPALI_MONTHS: [&str; 12] = [
  "जनवरी",
  "फेब्रुअरी",
  "मार्च",
  "अप्रिल",
  "मे",
  "जुन",
  "जुलाई",
  "अगस्ट",
  "सेप्टेम्बर",
  "अक्टोबर",
  "नोभेम्बर",
  "डिसेम्बर",
];

/// Long display date ("March 15, 2024"); missing or invalid input yields "".
pub fn format_date(date: Option<&str>, locale: &str) -> String {
  let Some(date) = date.and_then(parse_date) else {
    return String::new();
  };
  format_naive_date(date, Locale::from_tag(locale))
}

pub fn format_naive_date(date: NaiveDate, locale: Locale) -> String {
  use chrono::Datelike;

  match locale {
    Locale::EnUs => date.format("%B %-d, %Y").to_string(),
    Locale::EnGb => date.format("%-d %B %Y").to_string(),
    Locale::NeNp => {
      let month = NEPALI_MONTHS[date.month0() as usize];
      to_devanagari_digits(&format!("{} {}, {}", date.day(), month, date.year()))
    }
  }
}

/// Replace ASCII digits with Devanagari digits.
pub fn to_devanagari_digits(text: &str) -> String {
  text
    .chars()
    .map(|c| match c.to_digit(10) {
      Some(d) if c.is_ascii_digit() => char::from_u32(0x0966 + d).unwrap_or(c),
      _ => c,
    })
    .collect()
}

/// Parse the date shapes WordPress and ACF produce.
///
/// RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`,
/// ACF's `YYYYMMDD` and `DD/MM/YYYY`. Offsets are kept as local wall time.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
  let s = input.trim();
  if s.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.naive_local());
  }
  for fmt in [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
  ] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(dt);
    }
  }

  let date = if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
  } else {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
      .ok()
  }?;
  date.and_hms_opt(0, 0, 0)
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
  parse_datetime(input).map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn item(value: serde_json::Value) -> ApiItem {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_clean_html_strips_tags() {
    assert_eq!(clean_html_content("<p>Hello <b>World</b></p>"), "Hello World");
  }

  #[test]
  fn test_clean_html_decodes_entities() {
    assert_eq!(
      clean_html_content("<p>Tom &amp; Jerry&#8217;s&nbsp;show</p>"),
      "Tom & Jerry\u{2019}s show"
    );
  }

  #[test]
  fn test_clean_html_empty_and_malformed() {
    assert_eq!(clean_html_content(""), "");
    assert_eq!(clean_html_content("   "), "");
    assert_eq!(clean_html_content("<div><p>open <i>tags"), "open tags");
    assert_eq!(clean_html_content("plain\n\n text"), "plain text");
  }

  #[test]
  fn test_clean_html_is_stable() {
    let html = "<p>One</p>\n<p>  Two  </p>";
    assert_eq!(clean_html_content(html), clean_html_content(html));
    assert_eq!(clean_html_content(html), "One Two");
  }

  #[test]
  fn test_format_date_missing() {
    assert_eq!(format_date(None, "en-US"), "");
    assert_eq!(format_date(Some(""), "en-US"), "");
    assert_eq!(format_date(Some("not a date"), "en-US"), "");
  }

  #[test]
  fn test_format_date_en_us() {
    let s = format_date(Some("2024-03-15"), "en-US");
    assert_eq!(s, "March 15, 2024");
    assert!(s.contains("March") && s.contains("15") && s.contains("2024"));
  }

  #[test]
  fn test_format_date_other_shapes() {
    assert_eq!(format_date(Some("2024-03-15T10:30:00"), "en-US"), "March 15, 2024");
    assert_eq!(format_date(Some("20240315"), "en-US"), "March 15, 2024");
    assert_eq!(format_date(Some("15/03/2024"), "en-US"), "March 15, 2024");
    assert_eq!(
      format_date(Some("2024-03-15T23:30:00+05:45"), "en-US"),
      "March 15, 2024"
    );
  }

  #[test]
  fn test_format_date_locales() {
    assert_eq!(format_date(Some("2024-03-05"), "en-GB"), "5 March 2024");
    assert_eq!(format_date(Some("2024-03-15"), "ne-NP"), "१५ मार्च, २०२४");
    assert_eq!(format_date(Some("2024-03-15"), "xx"), "March 15, 2024");
  }

  #[test]
  fn test_devanagari_digits() {
    assert_eq!(to_devanagari_digits("2081/01/05"), "२०८१/०१/०५");
    assert_eq!(to_devanagari_digits("abc"), "abc");
  }

  #[test]
  fn test_extract_image_precedence() {
    let all = item(json!({
      "acf": {
        "opt_picture": { "url": "https://cdn/opt.jpg" },
        "cover_image": { "url": "https://cdn/cover.jpg" },
        "picture": { "url": "https://cdn/pic.jpg" }
      },
      "_embedded": { "wp:featuredmedia": [{ "source_url": "https://cdn/feat.jpg" }] }
    }));
    assert_eq!(extract_image_url(&all).as_deref(), Some("https://cdn/pic.jpg"));

    let proof = item(json!({ "acf": { "image_proof": { "url": "https://cdn/proof.jpg" } } }));
    assert_eq!(extract_image_url(&proof).as_deref(), Some("https://cdn/proof.jpg"));

    let featured = item(json!({
      "acf": { "picture": false },
      "_embedded": { "wp:featuredmedia": [{ "source_url": "https://cdn/feat.jpg" }] }
    }));
    assert_eq!(extract_image_url(&featured).as_deref(), Some("https://cdn/feat.jpg"));

    assert_eq!(extract_image_url(&item(json!({}))), None);
  }
}
