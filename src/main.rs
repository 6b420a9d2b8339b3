use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use jarokilo::cache::SqliteStore;
use jarokilo::config::{CacheBackend, Config};
use jarokilo::contact::{self, ContactForm};
use jarokilo::{ContentApi, Listing, ListingState, Outcome, Page, QueryParams, Record};

#[derive(Parser, Debug)]
#[command(name = "jarokilo")]
#[command(about = "Browse Jarokilo Foundation content from the WordPress API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jarokilo/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Display locale for dates (en-US, en-GB, ne-NP)
  #[arg(short, long, global = true)]
  locale: Option<String>,

  /// Print records as JSON
  #[arg(long, global = true)]
  json: bool,

  /// Write logs to this file instead of stderr
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Books from the catalogue
  Books(SearchArgs),
  /// Programs, newest first
  Programs(SearchArgs),
  /// Press releases, newest first
  Press(SearchArgs),
  /// Generic posts, newest first
  Posts(SearchArgs),
  /// Programs and press releases merged into one feed
  News(SearchArgs),
  /// Gallery built from program images
  Gallery(SearchArgs),
  /// Images from the media library
  Media(SearchArgs),
  /// Show a single entry by slug
  Show {
    #[arg(value_enum)]
    kind: Kind,
    slug: String,
  },
  /// Manage the session cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
  /// Send a message through the contact form
  Contact {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Drop every cached response of the configured session
  Clear,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct PageArgs {
  /// First page to load
  #[arg(short, long, default_value_t = 1)]
  page: u32,

  /// Records per page
  #[arg(long, default_value_t = 9)]
  per_page: u32,

  /// How many pages to load, following "load more"
  #[arg(long, default_value_t = 1)]
  pages: u32,
}

#[derive(ClapArgs, Debug, Clone)]
struct SearchArgs {
  #[command(flatten)]
  paging: PageArgs,

  /// Full-text search term
  #[arg(short, long)]
  search: Option<String>,
}

impl SearchArgs {
  fn extra(&self) -> QueryParams {
    let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    QueryParams::new().set_opt("search", search)
  }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Kind {
  Book,
  Program,
  Press,
  News,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_tracing(args.log_file.as_deref())?;

  let mut config = Config::load(args.config.as_deref())?;
  if let Some(locale) = args.locale {
    config.locale = locale;
  }

  let api = ContentApi::new(&config)?;
  let json = args.json;

  match args.command {
    Command::Books(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_books(page, per_page, &extra).await }
      })
      .await
    }
    Command::Programs(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_programs(page, per_page, &extra).await }
      })
      .await
    }
    Command::Press(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_press(page, per_page, &extra).await }
      })
      .await
    }
    Command::Posts(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_posts(page, per_page, &extra).await }
      })
      .await
    }
    Command::News(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_news(page, per_page, &extra).await }
      })
      .await
    }
    Command::Gallery(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_gallery(page, per_page, &extra).await }
      })
      .await
    }
    Command::Media(search) => {
      let extra = search.extra();
      run_listing(&api, search.paging, json, move |api, page, per_page| {
        let extra = extra.clone();
        async move { api.fetch_media(page, per_page, &extra).await }
      })
      .await
    }
    Command::Show { kind, slug } => match kind {
      Kind::Book => show(api.fetch_book_by_slug(&slug).await, "book", &slug, json),
      Kind::Program => show(api.fetch_program_by_slug(&slug).await, "program", &slug, json),
      Kind::Press => show(api.fetch_press_by_slug(&slug).await, "press release", &slug, json),
      Kind::News => show(api.fetch_news_by_slug(&slug).await, "news entry", &slug, json),
    },
    Command::Cache {
      action: CacheAction::Clear,
    } => clear_cache(&config),
    Command::Contact {
      name,
      email,
      subject,
      message,
    } => {
      let form = ContactForm {
        name,
        email,
        subject,
        message,
      };
      contact::submit(api.client().http(), config.contact_url.as_deref(), &form)
        .await
        .map_err(|e| eyre!("Failed to send message: {}", e))?;
      println!("Message sent. Thank you for contacting us.");
      Ok(())
    }
  }
}

fn clear_cache(config: &Config) -> Result<()> {
  if config.cache.backend != CacheBackend::Sqlite {
    println!("Only the sqlite cache backend keeps entries between runs; nothing to clear.");
    return Ok(());
  }

  let path = match &config.cache.path {
    Some(p) => p.clone(),
    None => SqliteStore::default_path()?,
  };
  let store = SqliteStore::open(&path, &config.cache.session)?;
  let removed = store.clear_session()?;
  println!(
    "Removed {} cached response(s) from session '{}'",
    removed, config.cache.session
  );
  Ok(())
}

/// Route logs to stderr, or to `log_file` when given.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_env("JAROKILO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

  let Some(path) = log_file else {
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .init();
    return Ok(None);
  };

  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));

  let appender = tracing_appender::rolling::never(dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(Some(guard))
}

/// Load `paging.pages` pages through a listing and print what accumulated.
async fn run_listing<T, F, Fut>(
  api: &ContentApi,
  paging: PageArgs,
  json: bool,
  fetch: F,
) -> Result<()>
where
  T: Record + Serialize + Display + Clone + Send + 'static,
  F: Fn(ContentApi, u32, u32) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Outcome<Page<T>>> + Send + 'static,
{
  let api = api.clone();
  let mut listing = Listing::new(paging.per_page, move |page, per_page| {
    fetch(api.clone(), page, per_page)
  })
  .starting_at(paging.page);

  for _ in 0..paging.pages.max(1) {
    if !listing.load_more() {
      break;
    }
    listing.next().await;
    if matches!(listing.state(), ListingState::Failed(_)) {
      break;
    }
  }

  if let ListingState::Failed(message) = listing.state() {
    if listing.items().is_empty() {
      return Err(eyre!("Could not load content: {}", message));
    }
    eprintln!("Stopped early: {}", message);
  }

  if json {
    let page = Page::new(listing.items().to_vec(), listing.total_pages().unwrap_or(1));
    println!("{}", serde_json::to_string_pretty(&page)?);
    return Ok(());
  }

  if listing.items().is_empty() {
    println!("Nothing to show.");
    return Ok(());
  }
  for item in listing.items() {
    println!("{}", item);
  }
  if let Some(total) = listing.total_pages() {
    println!();
    println!(
      "{} records, {} page(s) available{}",
      listing.items().len(),
      total,
      if listing.has_more() { ", more with --pages" } else { "" }
    );
  }
  Ok(())
}

fn show<T: Serialize + Display>(outcome: Outcome<T>, what: &str, slug: &str, json: bool) -> Result<()> {
  match outcome {
    Outcome::Loaded(record) => {
      if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
      } else {
        println!("{}", record);
      }
      Ok(())
    }
    Outcome::NotFound => Err(eyre!("No {} found with slug '{}'", what, slug)),
    Outcome::Failed(e) => Err(eyre!("Could not load {} '{}': {}", what, slug, e)),
  }
}
