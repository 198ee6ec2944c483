//! Generic tabular values: the shape every store read returns and every typed
//! record is flattened into before it is written.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Cell values ─────────────────────────────────────────────────────────────

/// A single cell. Mirrors the storage classes of an embedded SQL engine.
///
/// Serialises untagged, so JSON `null`, `3`, `2.5` and `"x"` map directly onto
/// `Null`, `Integer`, `Real` and `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
  #[default]
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// Integer view; whole reals and integer text are accepted.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      Self::Real(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
      Self::Text(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  /// Decimal view; integers and numeric text are accepted.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Integer(i) => Some(*i as f64),
      Self::Real(f) => Some(*f),
      Self::Text(s) => s.trim().parse().ok(),
      _ => None,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => Ok(()),
      Self::Integer(i) => write!(f, "{i}"),
      Self::Real(r) => write!(f, "{r}"),
      Self::Text(s) => f.write_str(s),
      Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

// ─── Column types ────────────────────────────────────────────────────────────

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
  Date,
  Varchar,
  Decimal,
  Double,
  Integer,
}

impl ColumnType {
  pub fn sql_name(self) -> &'static str {
    match self {
      Self::Date => "DATE",
      Self::Varchar => "VARCHAR",
      Self::Decimal => "DECIMAL",
      Self::Double => "DOUBLE",
      Self::Integer => "INTEGER",
    }
  }
}

impl fmt::Display for ColumnType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.sql_name())
  }
}

impl FromStr for ColumnType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "DATE" => Ok(Self::Date),
      "VARCHAR" | "TEXT" | "STRING" => Ok(Self::Varchar),
      "DECIMAL" | "NUMERIC" => Ok(Self::Decimal),
      "DOUBLE" | "REAL" | "FLOAT" => Ok(Self::Double),
      "INTEGER" | "INT" | "BIGINT" => Ok(Self::Integer),
      other => Err(format!("unknown column type: {other:?}")),
    }
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// Ordered mapping of column name to declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
  columns: Vec<(String, ColumnType)>,
}

impl Schema {
  pub fn new() -> Self { Self::default() }

  /// The schema a record type declares for itself.
  pub fn of<R: Record>() -> Self {
    R::COLUMNS
      .iter()
      .map(|(name, ty)| ((*name).to_owned(), *ty))
      .collect()
  }

  /// Add or retype a column.
  pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
    let name = name.into();
    match self
      .columns
      .iter_mut()
      .find(|(n, _)| n.eq_ignore_ascii_case(&name))
    {
      Some(existing) => existing.1 = ty,
      None => self.columns.push((name, ty)),
    }
    self
  }

  /// Column names compare ASCII-case-insensitively, like SQL identifiers.
  pub fn get(&self, name: &str) -> Option<ColumnType> {
    self
      .columns
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, ty)| *ty)
  }

  pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnType)> {
    self.columns.iter().map(|(n, ty)| (n.as_str(), *ty))
  }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

impl FromIterator<(String, ColumnType)> for Schema {
  fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
    iter
      .into_iter()
      .fold(Self::new(), |schema, (name, ty)| schema.column(name, ty))
  }
}

/// A column as reported by the store's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
  pub name:      String,
  pub data_type: String,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A typed row of a named table.
///
/// `to_values` and `from_values` work in `COLUMNS` order.
pub trait Record: Sized {
  const COLUMNS: &'static [(&'static str, ColumnType)];

  fn to_values(&self) -> Vec<Value>;

  fn from_values(values: Vec<Value>) -> Result<Self>;
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// An untyped, SELECT-shaped result: column names plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<Value>>,
}

impl Table {
  pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
    Self { columns, rows }
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self
      .columns
      .iter()
      .position(|c| c.eq_ignore_ascii_case(name))
  }

  pub fn from_records<R: Record>(records: &[R]) -> Self {
    Self {
      columns: R::COLUMNS.iter().map(|(n, _)| (*n).to_owned()).collect(),
      rows:    records.iter().map(Record::to_values).collect(),
    }
  }

  /// Decode every row into `R`, matching columns by name so that the result
  /// of `SELECT *` decodes regardless of physical column order.
  pub fn to_records<R: Record>(&self) -> Result<Vec<R>> {
    let indices = R::COLUMNS
      .iter()
      .map(|(name, _)| {
        self
          .column_index(name)
          .ok_or_else(|| Error::MissingColumn((*name).to_owned()))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .rows
      .iter()
      .map(|row| {
        let values = indices
          .iter()
          .map(|&i| row.get(i).cloned().unwrap_or_default())
          .collect();
        R::from_values(values)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Pair {
    name:  String,
    count: i64,
  }

  impl Record for Pair {
    const COLUMNS: &'static [(&'static str, ColumnType)] =
      &[("Name", ColumnType::Varchar), ("Count", ColumnType::Integer)];

    fn to_values(&self) -> Vec<Value> {
      vec![self.name.clone().into(), self.count.into()]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
      let [name, count]: [Value; 2] =
        values.try_into().map_err(|v: Vec<Value>| Error::Arity {
          expected: 2,
          found:    v.len(),
        })?;
      Ok(Self {
        name:  name.to_string(),
        count: count.as_i64().unwrap_or_default(),
      })
    }
  }

  #[test]
  fn to_records_matches_columns_by_name() {
    let table = Table::new(
      vec!["count".into(), "NAME".into()],
      vec![vec![Value::Integer(3), Value::Text("a".into())]],
    );
    let pairs: Vec<Pair> = table.to_records().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].name, "a");
    assert_eq!(pairs[0].count, 3);
  }

  #[test]
  fn to_records_reports_missing_column() {
    let table = Table::new(vec!["Name".into()], vec![]);
    let err = table.to_records::<Pair>().err().unwrap();
    assert!(matches!(err, Error::MissingColumn(c) if c == "Count"));
  }

  #[test]
  fn from_records_uses_declared_columns() {
    let table = Table::from_records(&[Pair { name: "b".into(), count: 1 }]);
    assert_eq!(table.columns, vec!["Name", "Count"]);
    assert_eq!(table.rows[0][1], Value::Integer(1));
  }

  #[test]
  fn schema_lookup_is_case_insensitive_and_retypes() {
    let schema = Schema::of::<Pair>().column("count", ColumnType::Double);
    assert_eq!(schema.len(), 2);
    assert_eq!(schema.get("COUNT"), Some(ColumnType::Double));
    assert_eq!(schema.get("missing"), None);
  }

  #[test]
  fn value_deserialises_untagged_json() {
    let values: Vec<Value> =
      serde_json::from_str(r#"[null, 3, 2.5, "x"]"#).unwrap();
    assert_eq!(
      values,
      vec![
        Value::Null,
        Value::Integer(3),
        Value::Real(2.5),
        Value::Text("x".into())
      ]
    );
  }

  #[test]
  fn numeric_views_accept_text_and_whole_reals() {
    assert_eq!(Value::Text(" 12 ".into()).as_i64(), Some(12));
    assert_eq!(Value::Real(3.0).as_i64(), Some(3));
    assert_eq!(Value::Real(3.5).as_i64(), None);
    assert_eq!(Value::Integer(100).as_f64(), Some(100.0));
    assert_eq!(Value::Null.as_f64(), None);
  }

  #[test]
  fn column_type_parses_aliases() {
    assert_eq!("varchar".parse::<ColumnType>(), Ok(ColumnType::Varchar));
    assert_eq!("NUMERIC".parse::<ColumnType>(), Ok(ColumnType::Decimal));
    assert!("uuid".parse::<ColumnType>().is_err());
  }
}
