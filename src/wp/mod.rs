pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod endpoint;
pub mod types;

pub use cached_client::CachedWpClient;
pub use client::WpClient;
pub use endpoint::{build_url, Endpoint, ListParams, QueryParams};
pub use types::{
  Book, GalleryImage, NewsItem, NewsKind, Outcome, Page, PressRelease, Program, Record,
};
