//! Spreadsheet exports (CSV) into raw lift rows and catalog entries.
//!
//! Every text cell is upper-cased on the way in so exercise names, users and
//! session names compare cleanly against what is already stored.

use std::{collections::HashMap, io::Read};

use anyhow::{Context as _, bail};
use csv::StringRecord;
use fit_core::{catalog::ExerciseCatalogEntry, lift::RawLiftRow, table::Value};

/// Header positions, matched case-insensitively.
struct Headers(HashMap<String, usize>);

impl Headers {
  fn new(record: &StringRecord) -> Self {
    Self(
      record
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect(),
    )
  }

  fn require(&self, name: &str) -> anyhow::Result<usize> {
    match self.0.get(&name.to_ascii_lowercase()) {
      Some(&i) => Ok(i),
      None => bail!("CSV has no {name:?} column"),
    }
  }

  fn optional(&self, name: &str) -> Option<usize> {
    self.0.get(&name.to_ascii_lowercase()).copied()
  }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
  csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(input)
}

fn cell(record: &StringRecord, index: Option<usize>) -> Value {
  match index.and_then(|i| record.get(i)) {
    Some(s) if !s.is_empty() => Value::Text(s.to_uppercase()),
    _ => Value::Null,
  }
}

/// Read a lift export with `Day, Exercise, Weight, Reps, Sets` and optional
/// `Notes, User` columns. Cells stay loosely typed for the normalizer.
pub fn read_lifts(input: impl Read) -> anyhow::Result<Vec<RawLiftRow>> {
  let mut rdr = reader(input);
  let headers = Headers::new(rdr.headers().context("reading CSV header")?);
  let day = headers.require("Day")?;
  let exercise = headers.require("Exercise")?;
  let weight = headers.require("Weight")?;
  let reps = headers.require("Reps")?;
  let sets = headers.require("Sets")?;
  let notes = headers.optional("Notes");
  let user = headers.optional("User");

  let mut rows = Vec::new();
  for (line, result) in rdr.records().enumerate() {
    let record = result.with_context(|| format!("reading CSV row {}", line + 1))?;
    rows.push(RawLiftRow {
      day:      cell(&record, Some(day)),
      exercise: cell(&record, Some(exercise)),
      weight:   cell(&record, Some(weight)),
      reps:     cell(&record, Some(reps)),
      sets:     cell(&record, Some(sets)),
      notes:    cell(&record, notes),
      user:     cell(&record, user),
    });
  }
  Ok(rows)
}

/// Read a catalog export with `Day, Exercise` columns. Rows without an
/// exercise are dropped.
pub fn read_catalog(input: impl Read) -> anyhow::Result<Vec<ExerciseCatalogEntry>> {
  let mut rdr = reader(input);
  let headers = Headers::new(rdr.headers().context("reading CSV header")?);
  let day = headers.require("Day")?;
  let exercise = headers.require("Exercise")?;

  let mut entries = Vec::new();
  for (line, result) in rdr.records().enumerate() {
    let record = result.with_context(|| format!("reading CSV row {}", line + 1))?;
    let name = record.get(exercise).unwrap_or_default();
    if name.is_empty() {
      continue;
    }
    let session = record.get(day).unwrap_or_default().to_uppercase();
    entries.push(ExerciseCatalogEntry::new(session, name));
  }
  Ok(entries)
}
