//! Query gateway: free-form, possibly assistant-written SQL in, a uniform
//! [`Table`] out.
//!
//! The gateway never lets an engine failure escape as anything other than the
//! store's typed error, and offers [`QueryGateway::execute_or_empty`] for
//! callers that would rather render an empty dataset than handle one.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::{
  catalog::{CATALOG_DESCRIPTION, CATALOG_TABLE},
  lift::{LIFTS_DESCRIPTION, LIFTS_TABLE},
  store::RecordStore,
  table::{ColumnInfo, Table},
};

/// First fenced ```` ```sql ```` block of an assistant reply.
static SQL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)```[ \t]*sql[ \t]*\r?\n(.*?)```").expect("static regex")
});

/// Pull the SQL out of an assistant reply, if it contains a `sql` block.
pub fn extract_sql(response: &str) -> Option<&str> {
  SQL_BLOCK
    .captures(response)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().trim())
    .filter(|s| !s.is_empty())
}

// ─── Table context ───────────────────────────────────────────────────────────

/// Built-in description of one of the layer's own tables; empty for any other.
pub fn default_description(table: &str) -> &'static str {
  if table.eq_ignore_ascii_case(LIFTS_TABLE) {
    LIFTS_DESCRIPTION
  } else if table.eq_ignore_ascii_case(CATALOG_TABLE) {
    CATALOG_DESCRIPTION
  } else {
    ""
  }
}

/// What the assistant is told about a table so that its SQL stays inside the
/// known schema.
#[derive(Debug, Clone, Serialize)]
pub struct TableContext {
  pub table:       String,
  pub description: String,
  pub columns:     Vec<ColumnInfo>,
}

impl fmt::Display for TableContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Table: {}", self.table)?;
    if !self.description.is_empty() {
      writeln!(f, "{}", self.description.trim())?;
    }
    writeln!(f)?;
    writeln!(f, "Columns:")?;
    for c in &self.columns {
      writeln!(f, "- **{}**: {}", c.name, c.data_type)?;
    }
    Ok(())
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

pub struct QueryGateway<'a, S> {
  store: &'a S,
}

impl<'a, S: RecordStore> QueryGateway<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Execute `sql` as given. Write statements fail: the backend runs the
  /// text on a read-only connection.
  pub fn execute_read_only_sql(&self, sql: &str) -> Result<Table, S::Error> {
    tracing::debug!(sql, "executing read-only query");
    self
      .store
      .read_query(sql)
      .inspect_err(|e| tracing::warn!(error = %e, "query rejected"))
  }

  /// Like [`execute_read_only_sql`](Self::execute_read_only_sql), but a
  /// failure yields an empty table (already logged).
  pub fn execute_or_empty(&self, sql: &str) -> Table {
    self.execute_read_only_sql(sql).unwrap_or_default()
  }

  /// Execute the SQL block of an assistant reply. `None` when the reply has
  /// no SQL block.
  pub fn run_response(&self, response: &str) -> Option<Result<Table, S::Error>> {
    extract_sql(response).map(|sql| self.execute_read_only_sql(sql))
  }

  pub fn table_context(
    &self,
    table: &str,
    description: &str,
  ) -> Result<TableContext, S::Error> {
    Ok(TableContext {
      table:       table.to_owned(),
      description: description.to_owned(),
      columns:     self.store.describe_table(table)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_fenced_sql() {
    let reply = "Here you go:\n```sql\nSELECT * FROM historic_exercises LIMIT 10\n```\nEnjoy.";
    assert_eq!(
      extract_sql(reply),
      Some("SELECT * FROM historic_exercises LIMIT 10")
    );
  }

  #[test]
  fn extracts_first_block_only() {
    let reply = "```sql\nSELECT 1\n```\nand\n```sql\nSELECT 2\n```";
    assert_eq!(extract_sql(reply), Some("SELECT 1"));
  }

  #[test]
  fn tolerates_spaced_and_upper_case_fence() {
    let reply = "``` SQL\r\nSELECT 1;\r\n```";
    assert_eq!(extract_sql(reply), Some("SELECT 1;"));
  }

  #[test]
  fn ignores_other_languages_and_empty_blocks() {
    assert_eq!(extract_sql("```python\nprint(1)\n```"), None);
    assert_eq!(extract_sql("```sql\n\n```"), None);
    assert_eq!(extract_sql("no code here"), None);
  }

  #[test]
  fn context_lists_columns() {
    let ctx = TableContext {
      table:       "historic_exercises".into(),
      description: "Gym sessions.".into(),
      columns:     vec![ColumnInfo {
        name:      "Day".into(),
        data_type: "DATE".into(),
      }],
    };
    let text = ctx.to_string();
    assert!(text.starts_with("Table: historic_exercises\nGym sessions.\n"));
    assert!(text.contains("- **Day**: DATE"));
  }

  #[test]
  fn known_tables_have_descriptions() {
    assert_eq!(default_description("HISTORIC_EXERCISES"), LIFTS_DESCRIPTION);
    assert_eq!(default_description("exercises"), CATALOG_DESCRIPTION);
    assert_eq!(default_description("scratch"), "");
  }
}
