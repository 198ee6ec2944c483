//! SQL text builders and catalog queries.
//!
//! Identifiers are always double-quoted, so table and column names come
//! through verbatim (`User`, names with spaces) without colliding with
//! keywords.

use fit_core::table::ColumnType;

/// Does a user table of this name exist? Names compare case-insensitively.
pub const TABLE_EXISTS: &str =
  "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE";

pub const LIST_TABLES: &str = "
SELECT name FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
ORDER BY name";

/// `(name, declared type)` per column, in physical order. Empty for a missing
/// table.
pub const TABLE_INFO: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

/// Storage class a declared type is cast through when a table is rewritten.
///
/// Dates live as ISO-8601 text; a `NUMERIC` cast would truncate `2024-03-15`
/// to `2024`.
pub fn cast_target(ty: ColumnType) -> &'static str {
  match ty {
    ColumnType::Date | ColumnType::Varchar => "TEXT",
    ColumnType::Decimal | ColumnType::Double => "REAL",
    ColumnType::Integer => "INTEGER",
  }
}

pub fn create_table_sql(name: &str, columns: &[(&str, ColumnType)]) -> String {
  let defs = columns
    .iter()
    .map(|(col, ty)| format!("{} {}", quote_ident(col), ty.sql_name()))
    .collect::<Vec<_>>()
    .join(", ");
  format!("CREATE TABLE {} ({defs})", quote_ident(name))
}

pub fn drop_table_sql(name: &str) -> String {
  format!("DROP TABLE IF EXISTS {}", quote_ident(name))
}

pub fn insert_sql(name: &str, columns: &[&str]) -> String {
  let cols = column_list(columns);
  let placeholders = (1..=columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!("INSERT INTO {} ({cols}) VALUES ({placeholders})", quote_ident(name))
}

pub fn select_all_sql(name: &str) -> String {
  format!("SELECT * FROM {}", quote_ident(name))
}

pub fn column_list(columns: &[&str]) -> String {
  columns
    .iter()
    .map(|c| quote_ident(c))
    .collect::<Vec<_>>()
    .join(", ")
}
