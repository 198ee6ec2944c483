//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::{Path, PathBuf};

use fit_core::{
  store::RecordStore,
  table::{ColumnInfo, ColumnType, Record, Schema, Table},
};
use rusqlite::{Batch, Connection, OpenFlags, OptionalExtension as _};

use crate::{
  Error, Result, StoreConfig,
  encode::{collect_table, encode_value},
  schema::{
    LIST_TABLES, TABLE_EXISTS, TABLE_INFO, create_table_sql, drop_table_sql,
    insert_sql, select_all_sql,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// Holds only the file path. The file itself is created by the first
/// operation that writes to it.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  path: PathBuf,
}

impl SqliteStore {
  /// Prepare a store at `config.path()`, creating the directory if needed.
  pub fn open(config: &StoreConfig) -> Result<Self> {
    std::fs::create_dir_all(&config.db_dir).map_err(|source| Error::Io {
      path: config.db_dir.clone(),
      source,
    })?;
    let path = config.path();
    tracing::debug!(path = %path.display(), "store configured");
    Ok(Self { path })
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Read-write connection for the duration of one operation.
  pub(crate) fn connect(&self) -> Result<Connection> {
    Ok(Connection::open(&self.path)?)
  }

  fn connect_read_only(&self) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
      &self.path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
  }

  /// Run exactly one statement. Blank or comment-only input and trailing
  /// statements are refused before anything is stepped.
  fn query_read_only(&self, sql: &str) -> Result<Table> {
    let query = |e: rusqlite::Error| Error::Query(e.to_string());
    let conn = self.connect_read_only().map_err(query)?;
    let mut batch = Batch::new(&conn, sql);
    let Some(mut stmt) = batch.next().map_err(query)? else {
      return Err(Error::Query("empty query".into()));
    };
    if batch.next().map_err(query)?.is_some() {
      return Err(Error::Query(
        "only one statement may be run at a time".into(),
      ));
    }
    collect_table(&mut stmt).map_err(query)
  }
}

// ─── Connection helpers ──────────────────────────────────────────────────────

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(TABLE_EXISTS, rusqlite::params![name], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub(crate) fn table_columns(
  conn: &Connection,
  name: &str,
) -> rusqlite::Result<Vec<ColumnInfo>> {
  let mut stmt = conn.prepare(TABLE_INFO)?;
  let cols = stmt
    .query_map(rusqlite::params![name], |row| {
      Ok(ColumnInfo {
        name:      row.get(0)?,
        data_type: row.get(1)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(cols)
}

fn insert_rows<R: Record>(conn: &Connection, name: &str, rows: &[R]) -> Result<usize> {
  let columns: Vec<&str> = R::COLUMNS.iter().map(|(n, _)| *n).collect();
  let mut stmt = conn.prepare(&insert_sql(name, &columns))?;
  for row in rows {
    stmt.execute(rusqlite::params_from_iter(
      row.to_values().into_iter().map(encode_value),
    ))?;
  }
  Ok(rows.len())
}

fn joined<'a>(names: impl Iterator<Item = &'a str>) -> String {
  names.collect::<Vec<_>>().join(", ")
}

/// Column definitions for a new table: the record's own declarations, or the
/// caller's schema when it names exactly the record's columns.
fn resolve_columns<R: Record>(
  table: &str,
  schema: Option<&Schema>,
) -> Result<Vec<(&'static str, ColumnType)>> {
  let Some(schema) = schema else {
    return Ok(R::COLUMNS.to_vec());
  };

  let mismatch = || Error::SchemaMismatch {
    table:    table.to_owned(),
    expected: joined(schema.columns().map(|(n, _)| n)),
    found:    joined(R::COLUMNS.iter().map(|(n, _)| *n)),
  };

  if schema.len() != R::COLUMNS.len() {
    return Err(mismatch());
  }
  R::COLUMNS
    .iter()
    .map(|(name, _)| schema.get(name).map(|ty| (*name, ty)))
    .collect::<Option<Vec<_>>>()
    .ok_or_else(mismatch)
}

/// Rows of `R` fit a table when both carry the same column names.
fn check_columns<R: Record>(table: &str, existing: &[ColumnInfo]) -> Result<()> {
  let fits = existing.len() == R::COLUMNS.len()
    && R::COLUMNS
      .iter()
      .all(|(n, _)| existing.iter().any(|c| c.name.eq_ignore_ascii_case(n)));
  if fits {
    return Ok(());
  }
  Err(Error::SchemaMismatch {
    table:    table.to_owned(),
    expected: joined(existing.iter().map(|c| c.name.as_str())),
    found:    joined(R::COLUMNS.iter().map(|(n, _)| *n)),
  })
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  fn create_table<R: Record>(
    &self,
    name: &str,
    rows: &[R],
    schema: Option<&Schema>,
  ) -> Result<()> {
    if rows.is_empty() {
      tracing::warn!(table = name, "refusing to create a table from no rows");
      return Err(Error::EmptyInput(name.to_owned()));
    }
    let columns = resolve_columns::<R>(name, schema)?;

    let mut conn = self.connect()?;
    let tx = conn.transaction()?;
    tx.execute_batch(&drop_table_sql(name))?;
    tx.execute_batch(&create_table_sql(name, &columns))?;
    let written = insert_rows(&tx, name, rows)?;
    tx.commit()?;

    tracing::info!(table = name, rows = written, "table created");
    Ok(())
  }

  fn append_rows<R: Record>(&self, name: &str, rows: &[R]) -> Result<usize> {
    if rows.is_empty() {
      tracing::warn!(table = name, "empty append ignored");
      return Ok(0);
    }

    let mut conn = self.connect()?;
    let existing = table_columns(&conn, name)?;
    if existing.is_empty() {
      return Err(Error::TableNotFound(name.to_owned()));
    }
    check_columns::<R>(name, &existing)
      .inspect_err(|e| tracing::warn!(error = %e, "append rejected"))?;

    let tx = conn.transaction()?;
    let written = insert_rows(&tx, name, rows)?;
    tx.commit()?;

    tracing::info!(table = name, rows = written, "rows appended");
    Ok(written)
  }

  fn read_table(&self, name: &str) -> Result<Table> {
    let conn = self.connect()?;
    if !table_exists(&conn, name)? {
      return Err(Error::TableNotFound(name.to_owned()));
    }
    let mut stmt = conn.prepare(&select_all_sql(name))?;
    let table = collect_table(&mut stmt)?;
    Ok(table)
  }

  fn read_query(&self, sql: &str) -> Result<Table> {
    self
      .query_read_only(sql)
      .inspect_err(|e| tracing::warn!(error = %e, "query failed"))
  }

  fn list_tables(&self) -> Result<Vec<String>> {
    let conn = self.connect()?;
    let mut stmt = conn.prepare(LIST_TABLES)?;
    let names = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
  }

  fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>> {
    let conn = self.connect()?;
    let columns = table_columns(&conn, name)?;
    if columns.is_empty() {
      return Err(Error::TableNotFound(name.to_owned()));
    }
    Ok(columns)
  }
}
