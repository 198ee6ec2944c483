//! Handlers for `/lifts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/lifts` | optional `exercise`, `user` filters |
//! | `POST` | `/lifts` | Body: raw rows; normalized and appended |
//! | `POST` | `/lifts/import` | Body: raw rows; replaces the table. `?compact=true` compacts first |
//! | `POST` | `/lifts/compact` | Rewrites the table compacted |
//! | `GET`  | `/lifts/pbs` | optional `exercises=A,B` |

use axum::{
  Json,
  extract::{Query, State},
};
use fit_core::{
  dedup,
  lift::{LIFTS_TABLE, LiftRecord, RawLiftRow, lift_schema},
  normalize::SkippedRow,
  store::RecordStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, blocking, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Exercise name, compared case-insensitively.
  pub exercise: Option<String>,
  /// Lifter initials, compared case-insensitively.
  pub user:     Option<String>,
}

/// `GET /lifts[?exercise=...][&user=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<LiftRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut records = blocking(&state.store, |s| {
    s.read_records::<LiftRecord>(LIFTS_TABLE)
      .map_err(ApiError::store)
  })
  .await?;

  if let Some(exercise) = params.exercise.as_deref().map(str::trim) {
    records.retain(|r| r.exercise.eq_ignore_ascii_case(exercise));
  }
  if let Some(user) = params.user.as_deref().map(str::trim) {
    records.retain(|r| r.user.eq_ignore_ascii_case(user));
  }
  Ok(Json(records))
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AppendResponse {
  pub appended: usize,
  pub skipped:  Vec<SkippedRow>,
}

/// `POST /lifts`: the form-submission path. Malformed rows are reported, not
/// fatal.
pub async fn append<S>(
  State(state): State<AppState<S>>,
  Json(rows): Json<Vec<RawLiftRow>>,
) -> Result<Json<AppendResponse>, ApiError>
where
  S: RecordStore + 'static,
{
  let batch = state.normalizer.normalize_batch(&rows);
  let records = batch.records;
  let appended = blocking(&state.store, move |s| {
    s.append_rows(LIFTS_TABLE, &records).map_err(ApiError::store)
  })
  .await?;

  Ok(Json(AppendResponse { appended, skipped: batch.skipped }))
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ImportParams {
  /// Compact the normalized rows before writing them.
  #[serde(default)]
  pub compact: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
  pub written: usize,
  pub skipped: Vec<SkippedRow>,
}

/// `POST /lifts/import[?compact=true]`: replace the whole table with the
/// normalized upload.
pub async fn import<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ImportParams>,
  Json(rows): Json<Vec<RawLiftRow>>,
) -> Result<Json<ImportResponse>, ApiError>
where
  S: RecordStore + 'static,
{
  let batch = state.normalizer.normalize_batch(&rows);
  let records = if params.compact {
    dedup::compact(&batch.records)
  } else {
    batch.records
  };
  let written = records.len();

  blocking(&state.store, move |s| {
    s.create_table(LIFTS_TABLE, &records, Some(&lift_schema()))
      .map_err(ApiError::store)
  })
  .await?;

  Ok(Json(ImportResponse { written, skipped: batch.skipped }))
}

// ─── Compact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CompactResponse {
  pub before: usize,
  pub after:  usize,
}

/// `POST /lifts/compact`
pub async fn compact<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<CompactResponse>, ApiError>
where
  S: RecordStore + 'static,
{
  let counts = blocking(&state.store, |s| {
    let records: Vec<LiftRecord> =
      s.read_records(LIFTS_TABLE).map_err(ApiError::store)?;
    let compacted = dedup::compact(&records);
    // An empty table stays as it is; there is nothing to create it from.
    if !compacted.is_empty() && compacted.len() != records.len() {
      s.create_table(LIFTS_TABLE, &compacted, Some(&lift_schema()))
        .map_err(ApiError::store)?;
    }
    Ok(CompactResponse {
      before: records.len(),
      after:  compacted.len(),
    })
  })
  .await?;

  tracing::info!(before = counts.before, after = counts.after, "lift table compacted");
  Ok(Json(counts))
}

// ─── Personal bests ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct PbParams {
  /// Comma-separated exercise names. Absent means every exercise; an empty
  /// list means none.
  pub exercises: Option<String>,
}

/// `GET /lifts/pbs[?exercises=SQUAT,DEADLIFT]`
pub async fn personal_bests<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PbParams>,
) -> Result<Json<Vec<LiftRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  // Absent means every exercise; present but empty selects nothing.
  let exercises: Option<Vec<String>> = params.exercises.map(|s| {
    s.split(',')
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty())
      .collect()
  });

  let records = blocking(&state.store, |s| {
    s.read_records::<LiftRecord>(LIFTS_TABLE)
      .map_err(ApiError::store)
  })
  .await?;

  Ok(Json(dedup::personal_bests(&records, exercises.as_deref())))
}
