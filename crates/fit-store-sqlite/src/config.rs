//! Location of the database file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory and file name of the store. Defaults to `database/fit.db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub db_dir:  PathBuf,
  pub db_name: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      db_dir:  PathBuf::from("database"),
      db_name: "fit.db".to_owned(),
    }
  }
}

impl StoreConfig {
  /// A store named `fit.db` inside `dir`.
  pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
    Self { db_dir: dir.into(), ..Self::default() }
  }

  pub fn path(&self) -> PathBuf { self.db_dir.join(&self.db_name) }
}
