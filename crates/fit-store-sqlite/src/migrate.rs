//! One-shot, destructive column-type migration.
//!
//! Rewrites a table so every column carries the declared type given in a
//! [`Schema`], casting existing values on the way. There is no version history
//! and no way back: values that do not survive the cast (e.g. a `8-10` reps
//! range cast to `INTEGER`) are lost.

use fit_core::table::{ColumnType, Schema};

use crate::{
  Error, Result, SqliteStore,
  schema::{cast_target, create_table_sql, drop_table_sql, quote_ident},
  store::table_columns,
};

impl SqliteStore {
  /// Rewrite `table` with the column types of `schema`, which must name
  /// exactly the table's columns.
  pub fn migrate_column_types(&self, table: &str, schema: &Schema) -> Result<()> {
    let mut conn = self.connect()?;
    let existing = table_columns(&conn, table)?;
    if existing.is_empty() {
      return Err(Error::TableNotFound(table.to_owned()));
    }

    let columns: Vec<(&str, ColumnType)> = existing
      .iter()
      .map(|c| schema.get(&c.name).map(|ty| (c.name.as_str(), ty)))
      .collect::<Option<_>>()
      .filter(|cols: &Vec<_>| cols.len() == schema.len())
      .ok_or_else(|| Error::SchemaMismatch {
        table:    table.to_owned(),
        expected: existing
          .iter()
          .map(|c| c.name.as_str())
          .collect::<Vec<_>>()
          .join(", "),
        found:    schema
          .columns()
          .map(|(n, _)| n)
          .collect::<Vec<_>>()
          .join(", "),
      })?;

    let staging = format!("{table}__migrating");
    let names = columns
      .iter()
      .map(|(n, _)| quote_ident(n))
      .collect::<Vec<_>>()
      .join(", ");
    let casts = columns
      .iter()
      .map(|(n, ty)| format!("CAST({q} AS {}) AS {q}", cast_target(*ty), q = quote_ident(n)))
      .collect::<Vec<_>>()
      .join(", ");

    let sql = format!(
      "{drop_staging};
       {create};
       INSERT INTO {staging_q} ({names}) SELECT {casts} FROM {table_q};
       DROP TABLE {table_q};
       ALTER TABLE {staging_q} RENAME TO {table_q};",
      drop_staging = drop_table_sql(&staging),
      create = create_table_sql(&staging, &columns),
      staging_q = quote_ident(&staging),
      table_q = quote_ident(table),
    );

    let tx = conn.transaction()?;
    tx.execute_batch(&sql)?;
    tx.commit()?;

    tracing::info!(table, columns = columns.len(), "column types migrated");
    Ok(())
  }
}
