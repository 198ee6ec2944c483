//! Coercion of loosely-typed lift rows into [`LiftRecord`]s.
//!
//! Rules per column:
//!
//! | column   | result                                   |
//! |----------|------------------------------------------|
//! | Day      | calendar date parsed from `DD/MM/YYYY`   |
//! | Exercise | trimmed, upper-case text                 |
//! | Weight   | non-negative, finite decimal             |
//! | Reps     | text (ranges such as `8-10` allowed)     |
//! | Sets     | positive integer                         |
//! | Notes    | text, empty when absent                  |
//! | User     | text, the configured default when absent |
//!
//! A malformed row never aborts a batch: it is reported in
//! [`NormalizedBatch::skipped`] and the remaining rows carry on.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Error, Result,
  lift::{LiftRecord, RawLiftRow},
  table::Value,
};

/// Input format of the `Day` column.
pub const DAY_FORMAT: &str = "%d/%m/%Y";

/// Parse a `DD/MM/YYYY` day.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), DAY_FORMAT)
    .map_err(|_| Error::DateParse(text.to_owned()))
}

// ─── Batch result ────────────────────────────────────────────────────────────

/// A row the normalizer refused, with its position in the input.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
  pub index: usize,
  pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedBatch {
  pub records: Vec<LiftRecord>,
  pub skipped: Vec<SkippedRow>,
}

impl NormalizedBatch {
  pub fn skipped_count(&self) -> usize { self.skipped.len() }
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
  default_user: String,
}

impl Normalizer {
  /// `default_user` fills rows whose `User` cell is missing or blank.
  pub fn new(default_user: impl Into<String>) -> Self {
    Self { default_user: default_user.into() }
  }

  pub fn normalize_row(&self, raw: &RawLiftRow) -> Result<LiftRecord> {
    let day = match &raw.day {
      Value::Text(s) => parse_day(s)?,
      other => return Err(Error::DateParse(other.to_string())),
    };

    let exercise = required_text("Exercise", &raw.exercise)?.to_uppercase();

    let weight = raw
      .weight
      .as_f64()
      .filter(|w| w.is_finite())
      .ok_or_else(|| invalid("Weight", &raw.weight, "expected a decimal"))?;
    if weight < 0.0 {
      return Err(invalid("Weight", &raw.weight, "must not be negative"));
    }

    let reps = required_text("Reps", &raw.reps)?;

    let sets = raw
      .sets
      .as_i64()
      .ok_or_else(|| invalid("Sets", &raw.sets, "expected an integer"))?;
    let sets = u32::try_from(sets)
      .ok()
      .filter(|&n| n > 0)
      .ok_or_else(|| invalid("Sets", &raw.sets, "must be positive"))?;

    let user = match raw.user.to_string().trim() {
      "" => self.default_user.clone(),
      u => u.to_owned(),
    };

    Ok(LiftRecord {
      day,
      exercise,
      // Collapse -0.0 so equal weights compare equal bit-for-bit.
      weight: weight + 0.0,
      reps,
      sets,
      notes: raw.notes.to_string().trim().to_owned(),
      user,
    })
  }

  /// Normalize every row, skipping and reporting the ones that fail.
  ///
  /// The input is borrowed and the output freshly allocated.
  pub fn normalize_batch(&self, rows: &[RawLiftRow]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, raw) in rows.iter().enumerate() {
      match self.normalize_row(raw) {
        Ok(record) => batch.records.push(record),
        Err(e) => {
          tracing::warn!(row = index, error = %e, "skipping malformed lift row");
          batch.skipped.push(SkippedRow { index, error: e.to_string() });
        }
      }
    }
    batch
  }
}

fn required_text(column: &'static str, value: &Value) -> Result<String> {
  let text = value.to_string().trim().to_owned();
  if text.is_empty() {
    return Err(invalid(column, value, "must not be empty"));
  }
  Ok(text)
}

fn invalid(column: &'static str, value: &Value, reason: &str) -> Error {
  Error::InvalidValue {
    column,
    value: value.to_string(),
    reason: reason.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(day: &str) -> RawLiftRow {
    RawLiftRow {
      day:      day.into(),
      exercise: " bench press ".into(),
      weight:   "82.5".into(),
      reps:     "8-10".into(),
      sets:     "3".into(),
      notes:    Value::Null,
      user:     Value::Null,
    }
  }

  #[test]
  fn parses_day_month_year() {
    let d = parse_day("15/03/2024").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
  }

  #[test]
  fn rejects_iso_day() {
    assert!(matches!(parse_day("2024-03-15"), Err(Error::DateParse(s)) if s == "2024-03-15"));
  }

  #[test]
  fn coerces_every_column() {
    let r = Normalizer::new("JM").normalize_row(&raw("01/02/2024")).unwrap();
    assert_eq!(r.day, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(r.exercise, "BENCH PRESS");
    assert_eq!(r.weight, 82.5);
    assert_eq!(r.reps, "8-10");
    assert_eq!(r.sets, 3);
    assert_eq!(r.notes, "");
    assert_eq!(r.user, "JM");
  }

  #[test]
  fn accepts_numeric_cells() {
    let mut row = raw("01/02/2024");
    row.weight = Value::Integer(100);
    row.reps = Value::Integer(8);
    row.sets = Value::Real(4.0);
    row.user = "AB".into();
    let r = Normalizer::default().normalize_row(&row).unwrap();
    assert_eq!(r.weight, 100.0);
    assert_eq!(r.reps, "8");
    assert_eq!(r.sets, 4);
    assert_eq!(r.user, "AB");
  }

  #[test]
  fn rejects_negative_weight_and_zero_sets() {
    let n = Normalizer::default();

    let mut row = raw("01/02/2024");
    row.weight = "-5".into();
    assert!(matches!(
      n.normalize_row(&row),
      Err(Error::InvalidValue { column: "Weight", .. })
    ));

    let mut row = raw("01/02/2024");
    row.sets = Value::Integer(0);
    assert!(matches!(
      n.normalize_row(&row),
      Err(Error::InvalidValue { column: "Sets", .. })
    ));
  }

  #[test]
  fn non_text_day_is_a_date_error() {
    let mut row = raw("01/02/2024");
    row.day = Value::Integer(20240201);
    assert!(matches!(
      Normalizer::default().normalize_row(&row),
      Err(Error::DateParse(_))
    ));
  }

  #[test]
  fn batch_skips_bad_rows_and_keeps_the_rest() {
    let rows = vec![raw("01/02/2024"), raw("2024-02-02"), raw("03/02/2024")];
    let batch = Normalizer::new("JM").normalize_batch(&rows);
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.skipped_count(), 1);
    assert_eq!(batch.skipped[0].index, 1);
    // Input untouched.
    assert_eq!(rows[1].day, Value::Text("2024-02-02".into()));
  }
}
