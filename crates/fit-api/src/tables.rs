//! Handlers for `/tables`: what the assistant needs to know before writing
//! SQL.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use fit_core::{
  gateway::{QueryGateway, TableContext, default_description},
  store::RecordStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, blocking, error::ApiError};

/// `GET /tables`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: RecordStore + 'static,
{
  let names =
    blocking(&state.store, |s| s.list_tables().map_err(ApiError::store)).await?;
  Ok(Json(names))
}

#[derive(Debug, Deserialize, Default)]
pub struct ContextParams {
  /// Overrides the built-in description.
  pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
  #[serde(flatten)]
  pub context: TableContext,
  /// The context rendered as prompt text.
  pub prompt:  String,
}

/// `GET /tables/{name}/context[?description=...]`
pub async fn context<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
  Query(params): Query<ContextParams>,
) -> Result<Json<ContextResponse>, ApiError>
where
  S: RecordStore + 'static,
{
  let description = params
    .description
    .unwrap_or_else(|| default_description(&name).to_owned());

  let context = blocking(&state.store, move |s| {
    QueryGateway::new(s)
      .table_context(&name, &description)
      .map_err(ApiError::store)
  })
  .await?;

  let prompt = context.to_string();
  Ok(Json(ContextResponse { context, prompt }))
}
