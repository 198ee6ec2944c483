//! Subcommand implementations. Everything except `serve` is a single
//! synchronous pass over the store.

use std::{
  fs::File,
  io::Read as _,
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use fit_api::{AppState, api_router};
use fit_core::{
  Classify as _, ErrorKind,
  catalog::{self, CATALOG_TABLE, ExerciseCatalogEntry, Session},
  dedup,
  gateway::{QueryGateway, default_description},
  lift::{self, LIFTS_TABLE, LiftRecord, RawLiftRow, lift_migration_schema, lift_schema},
  normalize::{Normalizer, SkippedRow},
  store::RecordStore as _,
  table::{Table, Value},
};
use fit_store_sqlite::SqliteStore;
use serde::Serialize;
use tokio::net::TcpListener;

use crate::{CatalogCommand, Command, config::AppConfig, render, sheet};

pub struct Runner {
  pub store: SqliteStore,
  pub cfg:   AppConfig,
  pub json:  bool,
}

#[derive(Serialize)]
struct WriteSummary<'a> {
  table:   &'a str,
  written: usize,
  skipped: &'a [SkippedRow],
}

impl Runner {
  pub async fn run(self, command: Command) -> anyhow::Result<ExitCode> {
    match command {
      Command::Import { file, compact } => self.import(&file, compact)?,
      Command::Append { file } => self.append(&file)?,
      Command::Record { day, exercise, weight, reps, sets, notes, user } => {
        let raw = RawLiftRow {
          day:      day.into(),
          exercise: exercise.into(),
          weight:   weight.into(),
          reps:     reps.into(),
          sets:     sets.into(),
          notes:    notes.map_or(Value::Null, Value::from),
          user:     user.map_or(Value::Null, Value::from),
        };
        self.record(&raw)?;
      }
      Command::Lifts { exercise, user } => self.lifts(exercise, user)?,
      Command::Lifters => self.lifters()?,
      Command::Compact => self.compact()?,
      Command::Pb { exercises } => self.personal_bests(&exercises)?,
      Command::Catalog(cmd) => self.catalog(cmd)?,
      Command::Query { sql } => return self.query(&sql),
      Command::RunResponse { file } => return self.run_response(file),
      Command::Context { table, description } => self.context(&table, description)?,
      Command::Tables => self.tables()?,
      Command::Migrate { table } => self.migrate(&table)?,
      Command::Serve { host, port } => self.serve(host, port).await?,
    }
    Ok(ExitCode::SUCCESS)
  }

  fn normalizer(&self) -> Normalizer { Normalizer::new(&self.cfg.default_user) }

  /// Print `value` as JSON under `--json`, otherwise the text form.
  fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if self.json {
      println!("{}", render::json(value)?);
    } else {
      println!("{}", text());
    }
    Ok(())
  }

  fn emit_table(&self, table: &Table) -> anyhow::Result<()> {
    self.emit(table, || render::table(table))
  }

  fn emit_summary(&self, summary: &WriteSummary<'_>) -> anyhow::Result<()> {
    self.emit(summary, || {
      let mut text = format!("{} rows written to {}", summary.written, summary.table);
      for s in summary.skipped {
        text.push_str(&format!("\n  skipped row {}: {}", s.index, s.error));
      }
      text
    })
  }

  // ─── Lifts ─────────────────────────────────────────────────────────────────

  fn import(&self, file: &Path, compact: bool) -> anyhow::Result<()> {
    let rows = sheet::read_lifts(open(file)?)?;
    let batch = self.normalizer().normalize_batch(&rows);
    let records = if compact {
      dedup::compact(&batch.records)
    } else {
      batch.records
    };

    self
      .store
      .create_table(LIFTS_TABLE, &records, Some(&lift_schema()))
      .with_context(|| format!("importing {}", file.display()))?;

    self.emit_summary(&WriteSummary {
      table:   LIFTS_TABLE,
      written: records.len(),
      skipped: &batch.skipped,
    })
  }

  fn append(&self, file: &Path) -> anyhow::Result<()> {
    let rows = sheet::read_lifts(open(file)?)?;
    let batch = self.normalizer().normalize_batch(&rows);
    let written = self
      .store
      .append_rows(LIFTS_TABLE, &batch.records)
      .with_context(|| format!("appending {}", file.display()))?;

    self.emit_summary(&WriteSummary {
      table: LIFTS_TABLE,
      written,
      skipped: &batch.skipped,
    })
  }

  /// Append one set, creating the lift table on first use.
  fn record(&self, raw: &RawLiftRow) -> anyhow::Result<()> {
    let record = self.normalizer().normalize_row(raw).context("invalid set")?;
    let rows = [record];
    match self.store.append_rows(LIFTS_TABLE, &rows) {
      Err(e) if e.kind() == ErrorKind::TableNotFound => {
        self.store.create_table(LIFTS_TABLE, &rows, Some(&lift_schema()))?;
      }
      other => {
        other?;
      }
    }
    let [record] = rows;
    self.emit(&record, || {
      format!(
        "recorded {} {} x {} x {} for {} on {}",
        record.exercise, record.weight, record.reps, record.sets, record.user, record.day
      )
    })
  }

  fn read_lifts(&self) -> anyhow::Result<Vec<LiftRecord>> {
    Ok(self.store.read_records(LIFTS_TABLE)?)
  }

  fn lifts(&self, exercise: Option<String>, user: Option<String>) -> anyhow::Result<()> {
    let mut records = self.read_lifts()?;
    if let Some(exercise) = exercise {
      records.retain(|r| r.exercise.eq_ignore_ascii_case(exercise.trim()));
    }
    if let Some(user) = user {
      records.retain(|r| r.user.eq_ignore_ascii_case(user.trim()));
    }
    self.emit(&records, || render::table(&Table::from_records(&records)))
  }

  fn lifters(&self) -> anyhow::Result<()> {
    let users = lift::lifters(&self.read_lifts()?);
    self.emit(&users, || users.join("\n"))
  }

  fn compact(&self) -> anyhow::Result<()> {
    let records = self.read_lifts()?;
    let compacted = dedup::compact(&records);
    if !compacted.is_empty() && compacted.len() != records.len() {
      self
        .store
        .create_table(LIFTS_TABLE, &compacted, Some(&lift_schema()))?;
    }

    #[derive(Serialize)]
    struct Counts {
      before: usize,
      after:  usize,
    }
    let counts = Counts { before: records.len(), after: compacted.len() };
    self.emit(&counts, || {
      format!("compacted {LIFTS_TABLE}: {} rows to {}", counts.before, counts.after)
    })
  }

  fn personal_bests(&self, exercises: &[String]) -> anyhow::Result<()> {
    let filter = (!exercises.is_empty()).then_some(exercises);
    let bests = dedup::personal_bests(&self.read_lifts()?, filter);
    self.emit(&bests, || render::table(&Table::from_records(&bests)))
  }

  // ─── Catalog ───────────────────────────────────────────────────────────────

  fn catalog(&self, cmd: CatalogCommand) -> anyhow::Result<()> {
    match cmd {
      CatalogCommand::Import { file } => {
        let entries = sheet::read_catalog(open(&file)?)?;
        self
          .store
          .create_table(CATALOG_TABLE, &entries, None)
          .with_context(|| format!("importing {}", file.display()))?;
        self.emit_summary(&WriteSummary {
          table:   CATALOG_TABLE,
          written: entries.len(),
          skipped: &[],
        })
      }
      CatalogCommand::AddMisc { exercise } => {
        if exercise.trim().is_empty() {
          anyhow::bail!("exercise must not be empty");
        }
        let entry = ExerciseCatalogEntry::misc(&exercise);
        self
          .store
          .append_rows(CATALOG_TABLE, std::slice::from_ref(&entry))?;
        self.emit(&entry, || format!("added {} to {}", entry.exercise, entry.day))
      }
      CatalogCommand::Sessions => {
        let sessions = catalog::sessions(&self.read_catalog()?);
        self.emit(&sessions, || {
          sessions.iter().map(Session::to_string).collect::<Vec<_>>().join("\n")
        })
      }
      CatalogCommand::List { session } => {
        let entries = self.read_catalog()?;
        let exercises = match session {
          Some(s) => catalog::exercises_for(&entries, &Session::from(s.to_uppercase())),
          None => catalog::exercise_list(&entries),
        };
        self.emit(&exercises, || exercises.join("\n"))
      }
    }
  }

  fn read_catalog(&self) -> anyhow::Result<Vec<ExerciseCatalogEntry>> {
    Ok(self.store.read_records(CATALOG_TABLE)?)
  }

  // ─── Assistant ─────────────────────────────────────────────────────────────

  /// A failing query is reported, not propagated: the exit code carries it.
  fn query(&self, sql: &str) -> anyhow::Result<ExitCode> {
    match QueryGateway::new(&self.store).execute_read_only_sql(sql) {
      Ok(table) => {
        self.emit_table(&table)?;
        Ok(ExitCode::SUCCESS)
      }
      Err(e) => {
        eprintln!("query failed: {e}");
        Ok(ExitCode::FAILURE)
      }
    }
  }

  fn run_response(&self, file: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut reply = String::new();
    match &file {
      Some(path) => {
        open(path)?.read_to_string(&mut reply)?;
      }
      None => {
        std::io::stdin()
          .read_to_string(&mut reply)
          .context("reading reply from stdin")?;
      }
    }

    match QueryGateway::new(&self.store).run_response(&reply) {
      None => {
        eprintln!("no ```sql block in the reply");
        Ok(ExitCode::FAILURE)
      }
      Some(Ok(table)) => {
        self.emit_table(&table)?;
        Ok(ExitCode::SUCCESS)
      }
      Some(Err(e)) => {
        eprintln!("query failed: {e}");
        Ok(ExitCode::FAILURE)
      }
    }
  }

  fn context(&self, table: &str, description: Option<String>) -> anyhow::Result<()> {
    let description = description.unwrap_or_else(|| default_description(table).to_owned());
    let context = QueryGateway::new(&self.store).table_context(table, &description)?;
    self.emit(&context, || context.to_string())
  }

  fn tables(&self) -> anyhow::Result<()> {
    let names = self.store.list_tables()?;
    self.emit(&names, || names.join("\n"))
  }

  // ─── Admin ─────────────────────────────────────────────────────────────────

  fn migrate(&self, table: &str) -> anyhow::Result<()> {
    self
      .store
      .migrate_column_types(table, &lift_migration_schema())
      .with_context(|| format!("migrating {table}"))?;
    let columns = self.store.describe_table(table)?;
    self.emit(&columns, || {
      columns
        .iter()
        .map(|c| format!("{}: {}", c.name, c.data_type))
        .collect::<Vec<_>>()
        .join("\n")
    })
  }

  async fn serve(self, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or(self.cfg.host);
    let port = port.unwrap_or(self.cfg.port);
    let normalizer = Normalizer::new(self.cfg.default_user);
    let app = api_router(AppState::new(self.store, normalizer));

    let address = format!("{host}:{port}");
    tracing::info!("Listening on http://{address}");
    let listener = TcpListener::bind(&address)
      .await
      .with_context(|| format!("failed to bind {address}"))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
  }
}

fn open(path: &Path) -> anyhow::Result<File> {
  File::open(path).with_context(|| format!("opening {}", path.display()))
}
