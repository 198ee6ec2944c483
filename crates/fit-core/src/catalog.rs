//! The exercise catalog: which exercises belong to which planned session.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  table::{ColumnType, Record, Value},
};

/// Table holding the catalog.
pub const CATALOG_TABLE: &str = "exercises";

/// How [`CATALOG_TABLE`] is described to the assistant.
pub const CATALOG_DESCRIPTION: &str = "The training plan. Day names a planned \
  session (or MISC for ad-hoc exercises), Exercise is an upper-case exercise \
  name.";

/// Sentinel session for exercises outside any planned session.
pub const MISC: &str = "MISC";

// ─── Session ─────────────────────────────────────────────────────────────────

/// A catalog `Day` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Session {
  Planned(String),
  /// Unscheduled, ad-hoc exercises.
  Misc,
}

impl Session {
  pub fn is_misc(&self) -> bool { matches!(self, Self::Misc) }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Planned(s) => s,
      Self::Misc => MISC,
    }
  }
}

impl From<String> for Session {
  fn from(s: String) -> Self {
    if s.trim().eq_ignore_ascii_case(MISC) {
      Self::Misc
    } else {
      Self::Planned(s)
    }
  }
}

impl From<&str> for Session {
  fn from(s: &str) -> Self { Self::from(s.to_owned()) }
}

impl From<Session> for String {
  fn from(s: Session) -> Self {
    match s {
      Session::Planned(s) => s,
      Session::Misc => MISC.to_owned(),
    }
  }
}

impl fmt::Display for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Catalog entry ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCatalogEntry {
  pub day:      Session,
  pub exercise: String,
}

impl ExerciseCatalogEntry {
  pub fn new(day: impl Into<Session>, exercise: &str) -> Self {
    Self {
      day:      day.into(),
      exercise: exercise.trim().to_uppercase(),
    }
  }

  /// An ad-hoc exercise filed under the `MISC` session.
  pub fn misc(exercise: &str) -> Self { Self::new(Session::Misc, exercise) }
}

impl Record for ExerciseCatalogEntry {
  const COLUMNS: &'static [(&'static str, ColumnType)] =
    &[("Day", ColumnType::Varchar), ("Exercise", ColumnType::Varchar)];

  fn to_values(&self) -> Vec<Value> {
    vec![
      Value::Text(self.day.as_str().to_owned()),
      Value::Text(self.exercise.clone()),
    ]
  }

  fn from_values(values: Vec<Value>) -> Result<Self> {
    let [day, exercise]: [Value; 2] =
      values.try_into().map_err(|v: Vec<Value>| Error::Arity {
        expected: 2,
        found:    v.len(),
      })?;
    Ok(Self {
      day:      Session::from(day.to_string()),
      exercise: exercise.to_string(),
    })
  }
}

// ─── Selection helpers ───────────────────────────────────────────────────────

/// Distinct sessions in catalog order.
pub fn sessions(catalog: &[ExerciseCatalogEntry]) -> Vec<Session> {
  let mut out: Vec<Session> = Vec::new();
  for e in catalog {
    if !out.contains(&e.day) {
      out.push(e.day.clone());
    }
  }
  out
}

/// Distinct exercises planned for `session`, in catalog order.
pub fn exercises_for(
  catalog: &[ExerciseCatalogEntry],
  session: &Session,
) -> Vec<String> {
  distinct_exercises(catalog.iter().filter(|e| &e.day == session))
}

/// Every distinct exercise in the catalog.
pub fn exercise_list(catalog: &[ExerciseCatalogEntry]) -> Vec<String> {
  distinct_exercises(catalog.iter())
}

fn distinct_exercises<'a>(
  entries: impl Iterator<Item = &'a ExerciseCatalogEntry>,
) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for e in entries {
    if !out.contains(&e.exercise) {
      out.push(e.exercise.clone());
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn catalog() -> Vec<ExerciseCatalogEntry> {
    vec![
      ExerciseCatalogEntry::new("PUSH", "bench press"),
      ExerciseCatalogEntry::new("PUSH", "dips"),
      ExerciseCatalogEntry::new("LEGS", "squat"),
      ExerciseCatalogEntry::new("PUSH", "bench press"),
      ExerciseCatalogEntry::misc("farmer carry"),
    ]
  }

  #[test]
  fn misc_sentinel_round_trips_through_text() {
    assert_eq!(Session::from("misc"), Session::Misc);
    assert_eq!(String::from(Session::Misc), "MISC");
    let entry = ExerciseCatalogEntry::from_values(
      ExerciseCatalogEntry::misc("row").to_values(),
    )
    .unwrap();
    assert!(entry.day.is_misc());
    assert_eq!(entry.exercise, "ROW");
  }

  #[test]
  fn sessions_are_distinct_in_order() {
    let s = sessions(&catalog());
    assert_eq!(
      s,
      vec![Session::from("PUSH"), Session::from("LEGS"), Session::Misc]
    );
  }

  #[test]
  fn exercises_for_filters_by_session() {
    let push = exercises_for(&catalog(), &Session::from("PUSH"));
    assert_eq!(push, vec!["BENCH PRESS", "DIPS"]);
    assert!(exercises_for(&catalog(), &Session::from("PULL")).is_empty());
  }

  #[test]
  fn exercise_list_covers_every_session() {
    assert_eq!(exercise_list(&catalog()).len(), 4);
  }

  #[test]
  fn session_serialises_as_plain_string() {
    let json = serde_json::to_string(&ExerciseCatalogEntry::misc("row")).unwrap();
    assert_eq!(json, r#"{"day":"MISC","exercise":"ROW"}"#);
  }
}
