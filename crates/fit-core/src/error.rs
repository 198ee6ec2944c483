//! Error types for `fit-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A `Day` cell that is not `DD/MM/YYYY` text.
  #[error("date {0:?} does not match DD/MM/YYYY")]
  DateParse(String),

  #[error("invalid {column} value {value:?}: {reason}")]
  InvalidValue {
    column: &'static str,
    value:  String,
    reason: String,
  },

  #[error("missing column: {0}")]
  MissingColumn(String),

  #[error("expected {expected} values in row, found {found}")]
  Arity { expected: usize, found: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Error kinds ─────────────────────────────────────────────────────────────

/// Backend-independent classification of layer failures.
///
/// Generic callers (the HTTP API, the CLI) branch on this instead of on a
/// concrete backend error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// No rows where at least one is required.
  EmptyInput,
  /// Row shape incompatible with the target table.
  SchemaMismatch,
  DateParse,
  InvalidValue,
  /// The engine rejected the SQL text.
  Query,
  TableNotFound,
  Other,
}

/// Implemented by every error type that crosses a crate boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::DateParse(_) => ErrorKind::DateParse,
      Error::InvalidValue { .. } => ErrorKind::InvalidValue,
      Error::MissingColumn(_) | Error::Arity { .. } => ErrorKind::SchemaMismatch,
    }
  }
}
