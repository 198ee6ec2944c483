//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `fit-store-sqlite`). The gateway, the
//! API and the CLI depend on this abstraction, not on a concrete backend.

use crate::{
  error::Classify,
  table::{ColumnInfo, Record, Schema, Table},
};

/// Create/append/read access to named tables in one database.
///
/// Every method is synchronous and self-contained: a backend acquires whatever
/// connection it needs inside the call and releases it before returning.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error
    + Classify
    + From<crate::Error>
    + Send
    + Sync
    + 'static;

  /// Create `name` from `rows`, replacing any existing table of that name.
  ///
  /// Column types come from `schema` when given, otherwise from the record
  /// type. Fails with an `EmptyInput` error when `rows` is empty.
  fn create_table<R: Record>(
    &self,
    name: &str,
    rows: &[R],
    schema: Option<&Schema>,
  ) -> Result<(), Self::Error>;

  /// Insert `rows` into the existing table `name`, returning how many were
  /// written.
  ///
  /// An empty batch is a logged no-op returning `Ok(0)`. Rows whose columns do
  /// not match the table fail with a `SchemaMismatch` error.
  fn append_rows<R: Record>(
    &self,
    name: &str,
    rows: &[R],
  ) -> Result<usize, Self::Error>;

  /// Every row of `name`. Fails with `TableNotFound` if it does not exist.
  fn read_table(&self, name: &str) -> Result<Table, Self::Error>;

  /// Run SQL text on a read-only connection and collect its result set.
  ///
  /// Every engine failure, including an attempted write or a reference to a
  /// missing table, surfaces as a `Query` error carrying the engine message.
  fn read_query(&self, sql: &str) -> Result<Table, Self::Error>;

  /// Names of user tables, sorted.
  fn list_tables(&self) -> Result<Vec<String>, Self::Error>;

  /// Column names and declared types of `name`.
  fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, Self::Error>;

  /// Read `name` and decode every row as `R`.
  fn read_records<R: Record>(&self, name: &str) -> Result<Vec<R>, Self::Error> {
    Ok(self.read_table(name)?.to_records()?)
  }
}
