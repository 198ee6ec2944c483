//! Handler for `POST /query`: read-only SQL from the dashboard or the
//! assistant.

use axum::{Json, extract::State};
use fit_core::{gateway::QueryGateway, store::RecordStore, table::Table};
use serde::Deserialize;

use crate::{AppState, blocking, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct QueryBody {
  pub sql: String,
}

/// `POST /query` with `{"sql": "..."}`. Engine failures and write attempts
/// come back as 400 with the engine message.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<QueryBody>,
) -> Result<Json<Table>, ApiError>
where
  S: RecordStore + 'static,
{
  let table = blocking(&state.store, move |s| {
    QueryGateway::new(s)
      .execute_read_only_sql(&body.sql)
      .map_err(ApiError::store)
  })
  .await?;
  Ok(Json(table))
}
