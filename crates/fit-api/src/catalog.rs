//! Handlers for `/catalog` endpoints.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fit_core::{
  catalog::{self, CATALOG_TABLE, ExerciseCatalogEntry, Session},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{AppState, blocking, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct CatalogParams {
  pub session: Option<String>,
}

async fn read_catalog<S>(
  state: &AppState<S>,
) -> Result<Vec<ExerciseCatalogEntry>, ApiError>
where
  S: RecordStore + 'static,
{
  blocking(&state.store, |s| {
    s.read_records(CATALOG_TABLE).map_err(ApiError::store)
  })
  .await
}

/// `GET /catalog[?session=PUSH]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<ExerciseCatalogEntry>>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut entries = read_catalog(&state).await?;
  if let Some(session) = params.session {
    let session = Session::from(session);
    entries.retain(|e| e.day == session);
  }
  Ok(Json(entries))
}

/// `GET /catalog/sessions`: distinct sessions in catalog order.
pub async fn sessions<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: RecordStore + 'static,
{
  let entries = read_catalog(&state).await?;
  Ok(Json(catalog::sessions(&entries)))
}

#[derive(Debug, Deserialize)]
pub struct MiscBody {
  pub exercise: String,
}

/// `POST /catalog/misc`: file an ad-hoc exercise under `MISC`. Returns 201 and
/// the stored entry.
pub async fn add_misc<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<MiscBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  if body.exercise.trim().is_empty() {
    return Err(ApiError::BadRequest("exercise must not be empty".into()));
  }
  let entry = ExerciseCatalogEntry::misc(&body.exercise);
  let stored = entry.clone();
  blocking(&state.store, move |s| {
    s.append_rows(CATALOG_TABLE, &[stored]).map_err(ApiError::store)
  })
  .await?;
  Ok((StatusCode::CREATED, Json(entry)))
}
