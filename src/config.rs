use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upstream WordPress REST root used when nothing overrides it.
pub const DEFAULT_API_URL: &str = "https://jarokilo.org.np/wp/wp-json/wp/v2";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Locale for display dates (en-US, en-GB, ne-NP)
  #[serde(default = "default_locale")]
  pub locale: String,
  /// Endpoint accepting contact form submissions
  pub contact_url: Option<String>,
}

fn default_locale() -> String {
  "en-US".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      cache: CacheConfig::default(),
      locale: default_locale(),
      contact_url: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Page size sent with every listing unless the caller overrides it
  #[serde(default = "default_per_page")]
  pub per_page: u32,
}

fn default_base_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  15
}

fn default_per_page() -> u32 {
  20
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
      per_page: default_per_page(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  /// Process-lifetime map
  #[default]
  Memory,
  /// SQLite file shared by invocations using the same session name
  Sqlite,
  /// No caching at all
  None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default)]
  pub backend: CacheBackend,
  /// Session name partitioning the SQLite cache
  #[serde(default = "default_session")]
  pub session: String,
  /// SQLite database path (defaults to the user cache directory)
  pub path: Option<PathBuf>,
}

fn default_session() -> String {
  "default".to_string()
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      backend: CacheBackend::default(),
      session: default_session(),
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./jarokilo.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jarokilo/config.yaml
  ///
  /// Without any file the built-in defaults apply. `JAROKILO_API_URL`
  /// overrides the API base URL in every case.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("jarokilo.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jarokilo").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  pub fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  fn with_env_overrides(mut self) -> Self {
    if let Ok(url) = std::env::var("JAROKILO_API_URL") {
      if !url.trim().is_empty() {
        self.api.base_url = url;
      }
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert_eq!(config.api.per_page, 20);
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.locale, "en-US");
  }

  #[test]
  fn test_partial_file_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "api:\n  timeout_secs: 5\ncache:\n  backend: sqlite\n  session: tab-1\nlocale: ne-NP"
    )
    .unwrap();

    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert_eq!(config.api.per_page, 20);
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(config.cache.session, "tab-1");
    assert_eq!(config.locale, "ne-NP");
    assert!(config.contact_url.is_none());
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/jarokilo.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_invalid_backend_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache:\n  backend: redis").unwrap();
    assert!(Config::load_from_path(file.path()).is_err());
  }
}
