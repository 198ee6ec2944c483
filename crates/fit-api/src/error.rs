//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fit_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("worker failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl ApiError {
  /// Map a store error onto a response class by its [`ErrorKind`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.kind() {
      ErrorKind::TableNotFound => Self::NotFound(e.to_string()),
      ErrorKind::EmptyInput
      | ErrorKind::SchemaMismatch
      | ErrorKind::DateParse
      | ErrorKind::InvalidValue
      | ErrorKind::Query => Self::BadRequest(e.to_string()),
      ErrorKind::Other => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Join(e) => {
        tracing::error!(error = %e, "blocking task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
