//! Lift records: one row per set performed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  table::{ColumnType, Record, Schema, Value},
};

/// Table holding every recorded set.
pub const LIFTS_TABLE: &str = "historic_exercises";

/// How [`LIFTS_TABLE`] is described to the assistant.
pub const LIFTS_DESCRIPTION: &str = "Every recorded gym set. Day is the session \
  date, Weight is in kilograms, Reps is a count or a range such as 8-10, Sets \
  is how many sets were done at that weight, User holds the lifter's initials.";

/// Storage form of `day`.
pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

// ─── Typed record ────────────────────────────────────────────────────────────

/// One recorded exercise set, already normalized.
///
/// `(weight, reps, sets, exercise)` is the performance class used by
/// [`compact`](crate::dedup::compact). Nothing here enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftRecord {
  pub day:      NaiveDate,
  /// Upper-case exercise name.
  pub exercise: String,
  pub weight:   f64,
  /// Kept as text because programmes write ranges such as `8-10`.
  pub reps:     String,
  pub sets:     u32,
  #[serde(default)]
  pub notes:    String,
  pub user:     String,
}

impl Record for LiftRecord {
  const COLUMNS: &'static [(&'static str, ColumnType)] = &[
    ("Day", ColumnType::Date),
    ("Exercise", ColumnType::Varchar),
    ("Weight", ColumnType::Decimal),
    ("Reps", ColumnType::Varchar),
    ("Sets", ColumnType::Integer),
    ("Notes", ColumnType::Varchar),
    ("User", ColumnType::Varchar),
  ];

  fn to_values(&self) -> Vec<Value> {
    vec![
      Value::Text(self.day.format(ISO_DATE).to_string()),
      Value::Text(self.exercise.clone()),
      Value::Real(self.weight),
      Value::Text(self.reps.clone()),
      Value::Integer(i64::from(self.sets)),
      Value::Text(self.notes.clone()),
      Value::Text(self.user.clone()),
    ]
  }

  fn from_values(values: Vec<Value>) -> Result<Self> {
    let [day, exercise, weight, reps, sets, notes, user]: [Value; 7] =
      values.try_into().map_err(|v: Vec<Value>| Error::Arity {
        expected: 7,
        found:    v.len(),
      })?;

    let day = day
      .as_str()
      .and_then(|s| NaiveDate::parse_from_str(s, ISO_DATE).ok())
      .ok_or_else(|| Error::InvalidValue {
        column: "Day",
        value:  day.to_string(),
        reason: "expected an ISO-8601 date".into(),
      })?;

    let weight = weight.as_f64().ok_or_else(|| Error::InvalidValue {
      column: "Weight",
      value:  weight.to_string(),
      reason: "expected a decimal".into(),
    })?;

    let sets = sets
      .as_i64()
      .and_then(|n| u32::try_from(n).ok())
      .ok_or_else(|| Error::InvalidValue {
        column: "Sets",
        value:  sets.to_string(),
        reason: "expected a non-negative integer".into(),
      })?;

    Ok(Self {
      day,
      exercise: exercise.to_string(),
      weight,
      // A migrated table stores reps as INTEGER; Display renders it as text.
      reps: reps.to_string(),
      sets,
      notes: notes.to_string(),
      user: user.to_string(),
    })
  }
}

/// Declared types for `historic_exercises` as created by the application.
pub fn lift_schema() -> Schema { Schema::of::<LiftRecord>() }

/// Column casts applied by the one-shot administrative migration.
pub fn lift_migration_schema() -> Schema {
  Schema::new()
    .column("Day", ColumnType::Date)
    .column("Exercise", ColumnType::Varchar)
    .column("Weight", ColumnType::Decimal)
    .column("Reps", ColumnType::Integer)
    .column("Sets", ColumnType::Integer)
    .column("Notes", ColumnType::Varchar)
    .column("User", ColumnType::Varchar)
}

/// Distinct lifters in first-seen order.
pub fn lifters(records: &[LiftRecord]) -> Vec<String> {
  let mut users: Vec<String> = Vec::new();
  for r in records {
    if !users.contains(&r.user) {
      users.push(r.user.clone());
    }
  }
  users
}

// ─── Raw input ───────────────────────────────────────────────────────────────

/// A lift row as it arrives from a spreadsheet export or a form: every cell
/// loosely typed. Consumed by [`Normalizer`](crate::normalize::Normalizer).
///
/// A missing cell deserializes as null, so an incomplete row is rejected by
/// the normalizer on its own instead of failing the whole upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLiftRow {
  #[serde(rename = "Day", default)]
  pub day:      Value,
  #[serde(rename = "Exercise", default)]
  pub exercise: Value,
  #[serde(rename = "Weight", default)]
  pub weight:   Value,
  #[serde(rename = "Reps", default)]
  pub reps:     Value,
  #[serde(rename = "Sets", default)]
  pub sets:     Value,
  #[serde(rename = "Notes", default)]
  pub notes:    Value,
  #[serde(rename = "User", default)]
  pub user:     Value,
}
