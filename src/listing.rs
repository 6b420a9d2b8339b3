//! Accumulated "load more" listings.
//!
//! A `Listing<T>` owns the records a view has loaded so far and grows them
//! one page at a time. Fetches run on spawned tasks; results are applied only
//! once they settle, and every record key appears at most once.
//!
//! # Example
//!
//! ```ignore
//! let api = content_api.clone();
//! let mut listing = Listing::new(9, move |page, per_page| {
//!     let api = api.clone();
//!     async move { api.fetch_books(page, per_page, &QueryParams::new()).await }
//! });
//!
//! listing.load_more();
//! listing.next().await;
//!
//! // On navigation away
//! listing.cancel();
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::wp::types::{Outcome, Page, Record};

/// Load state of a listing
#[derive(Debug, Clone, PartialEq)]
pub enum ListingState {
  /// Nothing requested yet
  Idle,
  /// A page fetch is in flight
  Loading,
  /// The last fetch applied; more pages may exist
  Ready,
  /// Every page has been loaded
  Exhausted,
  /// The last fetch failed; accumulated items are kept
  Failed(String),
}

/// Produces the future for `(page, per_page)`.
type PageFetcher<T> = Box<dyn Fn(u32, u32) -> BoxFuture<'static, Outcome<Page<T>>> + Send + Sync>;

struct Pending<T> {
  page: u32,
  receiver: mpsc::UnboundedReceiver<Outcome<Page<T>>>,
  handle: JoinHandle<()>,
}

pub struct Listing<T> {
  items: Vec<T>,
  seen: HashSet<String>,
  per_page: u32,
  /// Next page number to request (1-based)
  next_page: u32,
  total_pages: Option<u32>,
  state: ListingState,
  fetcher: PageFetcher<T>,
  pending: Option<Pending<T>>,
}

impl<T: Record + Send + 'static> Listing<T> {
  pub fn new<F, Fut>(per_page: u32, fetcher: F) -> Self
  where
    F: Fn(u32, u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<Page<T>>> + Send + 'static,
  {
    Self {
      items: Vec::new(),
      seen: HashSet::new(),
      per_page: per_page.max(1),
      next_page: 1,
      total_pages: None,
      state: ListingState::Idle,
      fetcher: Box::new(move |page, per_page| fetcher(page, per_page).boxed()),
      pending: None,
    }
  }

  /// Begin at `page` instead of the first page.
  pub fn starting_at(mut self, page: u32) -> Self {
    self.next_page = page.max(1);
    self
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn state(&self) -> &ListingState {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.pending.is_some()
  }

  /// True until a page reports that it was the last one.
  pub fn has_more(&self) -> bool {
    match self.total_pages {
      Some(total) => self.next_page <= total,
      None => true,
    }
  }

  pub fn total_pages(&self) -> Option<u32> {
    self.total_pages
  }

  /// Start fetching the next page.
  ///
  /// No-op while a fetch is in flight or once every page is loaded.
  /// Returns whether a fetch was started.
  pub fn load_more(&mut self) -> bool {
    if self.pending.is_some() || !self.has_more() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let page = self.next_page;
    let future = (self.fetcher)(page, self.per_page);
    let handle = tokio::spawn(async move {
      // Ignore send errors - the listing may have been cancelled
      let _ = tx.send(future.await);
    });

    self.pending = Some(Pending {
      page,
      receiver: rx,
      handle,
    });
    self.state = ListingState::Loading;
    true
  }

  /// Apply a settled fetch without blocking.
  ///
  /// Returns `true` if the listing changed state.
  pub fn poll(&mut self) -> bool {
    let Some(pending) = &mut self.pending else {
      return false;
    };

    match pending.receiver.try_recv() {
      Ok(outcome) => {
        self.settle(Some(outcome));
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.settle(None);
        true
      }
    }
  }

  /// Wait for the in-flight fetch and apply it.
  ///
  /// Returns `false` if nothing was in flight.
  pub async fn next(&mut self) -> bool {
    let Some(pending) = &mut self.pending else {
      return false;
    };
    let outcome = pending.receiver.recv().await;
    self.settle(outcome);
    true
  }

  /// Abort the in-flight fetch. Its result is never applied.
  pub fn cancel(&mut self) {
    if let Some(pending) = self.pending.take() {
      pending.handle.abort();
      self.state = if self.items.is_empty() && self.total_pages.is_none() {
        ListingState::Idle
      } else {
        ListingState::Ready
      };
    }
  }

  /// Cancel and forget everything loaded so far.
  pub fn reset(&mut self) {
    self.cancel();
    self.items.clear();
    self.seen.clear();
    self.next_page = 1;
    self.total_pages = None;
    self.state = ListingState::Idle;
  }

  /// Append `page`, skipping records whose key is already present.
  ///
  /// Returns how many records were added.
  pub fn extend(&mut self, page: Page<T>) -> usize {
    let before = self.items.len();
    for item in page.items {
      if self.seen.insert(item.record_key()) {
        self.items.push(item);
      }
    }
    self.items.len() - before
  }

  fn settle(&mut self, outcome: Option<Outcome<Page<T>>>) {
    let Some(pending) = self.pending.take() else {
      return;
    };

    match outcome {
      Some(Outcome::Loaded(page)) => {
        let total = page.total_pages;
        self.extend(page);
        self.total_pages = Some(total);
        self.next_page = pending.page + 1;
        self.state = if self.has_more() {
          ListingState::Ready
        } else {
          ListingState::Exhausted
        };
      }
      Some(Outcome::NotFound) => {
        self.total_pages = Some(pending.page.saturating_sub(1));
        self.state = ListingState::Exhausted;
      }
      Some(Outcome::Failed(e)) => {
        self.state = ListingState::Failed(e.to_string());
      }
      None => {
        // Task dropped without sending
        self.state = ListingState::Failed("Fetch was cancelled".to_string());
      }
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Listing<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Listing")
      .field("items", &self.items)
      .field("next_page", &self.next_page)
      .field("total_pages", &self.total_pages)
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
