//! Content data layer for the Jarokilo Foundation website.
//!
//! Reads the foundation's WordPress REST API, normalizes books, programs,
//! press releases, news and gallery images into flat records, and caches
//! responses for the session with ETag / Last-Modified revalidation.

pub mod cache;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod listing;
pub mod wp;

pub use content::ContentApi;
pub use error::FetchError;
pub use listing::{Listing, ListingState};
pub use wp::{Outcome, Page, QueryParams, Record};
