//! Error type for `fit-store-sqlite`.

use std::path::PathBuf;

use fit_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] fit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("cannot prepare store directory {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("no rows given for table {0}")]
  EmptyInput(String),

  #[error("rows do not match table {table}: expected [{expected}], found [{found}]")]
  SchemaMismatch {
    table:    String,
    expected: String,
    found:    String,
  },

  #[error("table not found: {0}")]
  TableNotFound(String),

  /// The engine rejected ad-hoc SQL; carries the engine message.
  #[error("query failed: {0}")]
  Query(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(_) | Error::Io { .. } => ErrorKind::Other,
      Error::EmptyInput(_) => ErrorKind::EmptyInput,
      Error::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
      Error::TableNotFound(_) => ErrorKind::TableNotFound,
      Error::Query(_) => ErrorKind::Query,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
