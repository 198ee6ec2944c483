//! Runtime configuration: an optional TOML file layered with `FIT_`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use fit_store_sqlite::StoreConfig;
use serde::Deserialize;

/// Everything the binary needs, deserialised from `fit.toml`.
///
/// Environment variables override the file; nested keys use a double
/// underscore, e.g. `FIT_STORE__DB_DIR=~/lifts`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
  pub store:        StoreConfig,
  /// Lifter assigned to rows that arrive without a `User`.
  pub default_user: String,
  pub host:         String,
  pub port:         u16,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store:        StoreConfig::default(),
      default_user: "JM".to_owned(),
      host:         "127.0.0.1".to_owned(),
      port:         8080,
    }
  }
}

impl AppConfig {
  /// Load from `path` (which may not exist) and the process environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("FIT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store.db_dir = expand_tilde(&cfg.store.db_dir);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
