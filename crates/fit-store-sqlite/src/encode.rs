//! Conversion between [`fit_core::table::Value`] cells and SQLite values.

use fit_core::table::{Table, Value};
use rusqlite::{
  Statement,
  types::{Value as SqlValue, ValueRef},
};

pub fn encode_value(v: Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Real(f) => SqlValue::Real(f),
    Value::Text(s) => SqlValue::Text(s),
    Value::Blob(b) => SqlValue::Blob(b),
  }
}

pub fn decode_value(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(f) => Value::Real(f),
    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::Blob(b.to_vec()),
  }
}

/// Run a prepared, parameterless statement and collect its result set.
///
/// SQLite stores a whole-valued `DECIMAL` or `DOUBLE` as an integer. Cells of
/// columns declared with a fractional type are read back as reals.
pub fn collect_table(stmt: &mut Statement<'_>) -> rusqlite::Result<Table> {
  let columns: Vec<String> = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect();
  let fractional: Vec<bool> = stmt
    .columns()
    .iter()
    .map(|c| c.decl_type().is_some_and(is_fractional))
    .collect();

  let rows = stmt
    .query_map([], |row| {
      fractional
        .iter()
        .enumerate()
        .map(|(i, &fractional)| {
          row.get_ref(i).map(|v| match decode_value(v) {
            Value::Integer(n) if fractional => Value::Real(n as f64),
            other => other,
          })
        })
        .collect::<rusqlite::Result<Vec<_>>>()
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Table::new(columns, rows))
}

fn is_fractional(decl_type: &str) -> bool {
  let upper = decl_type.to_ascii_uppercase();
  ["DECIMAL", "DOUBLE", "REAL", "FLOAT"]
    .iter()
    .any(|t| upper.starts_with(t))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fractional_declared_types() {
    assert!(is_fractional("DECIMAL"));
    assert!(is_fractional("decimal(5,2)"));
    assert!(is_fractional("DOUBLE"));
    assert!(!is_fractional("INTEGER"));
    assert!(!is_fractional("VARCHAR"));
    assert!(!is_fractional("DATE"));
  }
}
