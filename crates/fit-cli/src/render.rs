//! Plain-text and JSON output.

use std::fmt::Write as _;

use fit_core::table::Table;
use serde::Serialize;

/// Render `table` as aligned columns with a header rule. An empty result
/// still shows its header.
pub fn table(table: &Table) -> String {
  let cells: Vec<Vec<String>> = table
    .rows
    .iter()
    .map(|row| row.iter().map(ToString::to_string).collect())
    .collect();

  let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
  for row in &cells {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_line(&mut out, table.columns.iter().map(String::as_str), &widths);
  let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
  push_line(&mut out, rule.iter().map(String::as_str), &widths);
  for row in &cells {
    push_line(&mut out, row.iter().map(String::as_str), &widths);
  }
  let _ = write!(out, "({} rows)", cells.len());
  out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
  let line = cells
    .zip(widths)
    .map(|(c, w)| format!("{c:<w$}"))
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(line.trim_end());
  out.push('\n');
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
  Ok(serde_json::to_string_pretty(value)?)
}
