//! Reductions over lift tables: compaction and personal-best extraction.
//!
//! Both are pure: they borrow the input and return a new `Vec`. Ties that the
//! ordering keys leave open are settled by input position, so the output is
//! fully determined by the input sequence.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use crate::lift::LiftRecord;

/// Exact identity of a row across all columns.
type RowKey<'a> = (chrono::NaiveDate, &'a str, u64, &'a str, u32, &'a str, &'a str);

/// `(weight, reps, sets, exercise)`.
type ClassKey<'a> = (u64, &'a str, u32, &'a str);

fn row_key(r: &LiftRecord) -> RowKey<'_> {
  (
    r.day,
    r.exercise.as_str(),
    r.weight.to_bits(),
    r.reps.as_str(),
    r.sets,
    r.notes.as_str(),
    r.user.as_str(),
  )
}

fn class_key(r: &LiftRecord) -> ClassKey<'_> {
  (r.weight.to_bits(), r.reps.as_str(), r.sets, r.exercise.as_str())
}

// ─── Compaction ──────────────────────────────────────────────────────────────

/// Drop exact duplicates, then keep one row per performance class: the one
/// with the earliest `day`, and of those the first in input order.
///
/// Survivors keep their relative input order, which makes the operation
/// idempotent.
pub fn compact(records: &[LiftRecord]) -> Vec<LiftRecord> {
  let mut seen = HashSet::new();
  let unique: Vec<(usize, &LiftRecord)> = records
    .iter()
    .enumerate()
    .filter(|&(_, r)| seen.insert(row_key(r)))
    .collect();

  let mut keep: HashMap<ClassKey<'_>, usize> = HashMap::new();
  for &(i, r) in &unique {
    match keep.entry(class_key(r)) {
      Entry::Vacant(slot) => {
        slot.insert(i);
      }
      Entry::Occupied(mut slot) => {
        // Strictly earlier only: equal days leave the first-seen row in place.
        if r.day < records[*slot.get()].day {
          slot.insert(i);
        }
      }
    }
  }

  let kept: HashSet<usize> = keep.into_values().collect();
  let out: Vec<LiftRecord> = unique
    .into_iter()
    .filter(|(i, _)| kept.contains(i))
    .map(|(_, r)| r.clone())
    .collect();

  tracing::debug!(before = records.len(), after = out.len(), "compacted lift rows");
  out
}

// ─── Personal bests ──────────────────────────────────────────────────────────

/// For each `(user, exercise)` pair among `exercises`, the heaviest row; equal
/// weights go to the earliest day, then to input order.
///
/// `None` selects every exercise; an empty selection yields no rows. Names
/// are compared case-insensitively. Output is sorted by user, then exercise.
pub fn personal_bests(
  records: &[LiftRecord],
  exercises: Option<&[String]>,
) -> Vec<LiftRecord> {
  let wanted: Option<HashSet<String>> = exercises
    .map(|list| list.iter().map(|e| e.trim().to_uppercase()).collect());

  let mut best: HashMap<(&str, &str), &LiftRecord> = HashMap::new();
  for r in records {
    if let Some(wanted) = &wanted
      && !wanted.contains(&r.exercise.to_uppercase())
    {
      continue;
    }
    match best.entry((r.user.as_str(), r.exercise.as_str())) {
      Entry::Vacant(slot) => {
        slot.insert(r);
      }
      Entry::Occupied(mut slot) => {
        let current = *slot.get();
        if r.weight > current.weight
          || (r.weight == current.weight && r.day < current.day)
        {
          slot.insert(r);
        }
      }
    }
  }

  let mut out: Vec<LiftRecord> = best.into_values().cloned().collect();
  out.sort_by(|a, b| (&a.user, &a.exercise).cmp(&(&b.user, &b.exercise)));
  out
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn lift(user: &str, exercise: &str, weight: f64, day: (i32, u32, u32)) -> LiftRecord {
    LiftRecord {
      day: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
      exercise: exercise.into(),
      weight,
      reps: "8".into(),
      sets: 3,
      notes: String::new(),
      user: user.into(),
    }
  }

  // ── compact ───────────────────────────────────────────────────────────────

  #[test]
  fn keeps_earliest_of_identical_performances() {
    let rows = vec![
      lift("JM", "SQUAT", 100.0, (2024, 1, 5)),
      lift("JM", "SQUAT", 100.0, (2024, 1, 1)),
    ];
    let out = compact(&rows);
    assert_eq!(out, vec![lift("JM", "SQUAT", 100.0, (2024, 1, 1))]);
  }

  #[test]
  fn drops_exact_duplicates() {
    let a = lift("JM", "SQUAT", 100.0, (2024, 1, 1));
    let out = compact(&[a.clone(), a.clone(), a.clone()]);
    assert_eq!(out, vec![a]);
  }

  #[test]
  fn distinct_classes_all_survive_in_input_order() {
    let rows = vec![
      lift("JM", "SQUAT", 110.0, (2024, 1, 3)),
      lift("JM", "SQUAT", 100.0, (2024, 1, 2)),
      lift("JM", "DEADLIFT", 100.0, (2024, 1, 1)),
    ];
    assert_eq!(compact(&rows), rows);
  }

  #[test]
  fn reps_and_sets_are_part_of_the_class() {
    let a = lift("JM", "SQUAT", 100.0, (2024, 1, 1));
    let mut b = lift("JM", "SQUAT", 100.0, (2024, 1, 2));
    b.reps = "5".into();
    let mut c = lift("JM", "SQUAT", 100.0, (2024, 1, 3));
    c.sets = 5;
    assert_eq!(compact(&[a, b, c]).len(), 3);
  }

  #[test]
  fn same_day_tie_keeps_first_in_input() {
    let mut a = lift("JM", "SQUAT", 100.0, (2024, 1, 1));
    a.notes = "first".into();
    let mut b = a.clone();
    b.notes = "second".into();
    let out = compact(&[a.clone(), b]);
    assert_eq!(out, vec![a]);
  }

  #[test]
  fn compaction_is_idempotent() {
    let mut rows = vec![
      lift("JM", "SQUAT", 100.0, (2024, 1, 5)),
      lift("AB", "SQUAT", 100.0, (2024, 1, 1)),
      lift("JM", "BENCH PRESS", 80.0, (2024, 1, 2)),
      lift("JM", "BENCH PRESS", 80.0, (2024, 1, 2)),
      lift("JM", "BENCH PRESS", 82.5, (2024, 1, 9)),
    ];
    rows[3].notes = "easy".into();
    let once = compact(&rows);
    assert_eq!(compact(&once), once);
    assert_eq!(once.len(), 3);
  }

  // ── personal_bests ────────────────────────────────────────────────────────

  #[test]
  fn pb_is_heaviest_row() {
    let rows = vec![
      lift("A", "SQUAT", 100.0, (2024, 1, 1)),
      lift("A", "SQUAT", 120.0, (2024, 2, 1)),
    ];
    let pbs = personal_bests(&rows, Some(&["SQUAT".to_owned()][..]));
    assert_eq!(pbs, vec![lift("A", "SQUAT", 120.0, (2024, 2, 1))]);
  }

  #[test]
  fn pb_tie_goes_to_earliest_day() {
    let rows = vec![
      lift("A", "SQUAT", 120.0, (2024, 3, 1)),
      lift("A", "SQUAT", 120.0, (2024, 2, 1)),
    ];
    let pbs = personal_bests(&rows, None);
    assert_eq!(pbs[0].day, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
  }

  #[test]
  fn pb_one_row_per_user_and_exercise() {
    let rows = vec![
      lift("B", "SQUAT", 90.0, (2024, 1, 1)),
      lift("A", "SQUAT", 100.0, (2024, 1, 1)),
      lift("A", "DEADLIFT", 140.0, (2024, 1, 1)),
      lift("A", "CURL", 20.0, (2024, 1, 1)),
      lift("B", "SQUAT", 95.0, (2024, 1, 8)),
    ];
    let pbs = personal_bests(&rows, Some(&["squat".to_owned(), "DEADLIFT".to_owned()][..]));
    let keys: Vec<(&str, &str, f64)> = pbs
      .iter()
      .map(|r| (r.user.as_str(), r.exercise.as_str(), r.weight))
      .collect();
    assert_eq!(
      keys,
      vec![("A", "DEADLIFT", 140.0), ("A", "SQUAT", 100.0), ("B", "SQUAT", 95.0)]
    );
  }

  #[test]
  fn pb_without_filter_covers_every_exercise() {
    let rows = vec![
      lift("A", "SQUAT", 100.0, (2024, 1, 1)),
      lift("A", "CURL", 20.0, (2024, 1, 1)),
      lift("B", "SQUAT", 90.0, (2024, 1, 1)),
    ];
    assert_eq!(personal_bests(&rows, None).len(), 3);
  }

  #[test]
  fn pb_of_empty_selection_is_empty() {
    let rows = vec![
      lift("A", "SQUAT", 100.0, (2024, 1, 1)),
      lift("B", "SQUAT", 90.0, (2024, 1, 1)),
    ];
    assert!(personal_bests(&rows, Some(&[][..])).is_empty());
  }
}
