//! JSON REST API for the fit lift-record layer.
//!
//! Exposes an axum [`Router`] backed by any [`fit_core::store::RecordStore`].
//! The dashboard UI and the assistant both talk to the store through it.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fit_api::api_router(AppState::new(store, normalizer)))
//! ```

pub mod catalog;
pub mod error;
pub mod lifts;
pub mod query;
pub mod tables;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fit_core::{normalize::Normalizer, store::RecordStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:      Arc<S>,
  pub normalizer: Arc<Normalizer>,
}

impl<S> AppState<S> {
  pub fn new(store: S, normalizer: Normalizer) -> Self {
    Self {
      store:      Arc::new(store),
      normalizer: Arc::new(normalizer),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      normalizer: Arc::clone(&self.normalizer),
    }
  }
}

/// Run a store operation on the blocking pool. The store is synchronous and
/// opens a connection per call.
pub(crate) async fn blocking<S, T, F>(store: &Arc<S>, f: F) -> Result<T, ApiError>
where
  S: RecordStore + 'static,
  T: Send + 'static,
  F: FnOnce(&S) -> Result<T, ApiError> + Send + 'static,
{
  let store = Arc::clone(store);
  tokio::task::spawn_blocking(move || f(&store)).await?
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Lifts
    .route("/lifts", get(lifts::list::<S>).post(lifts::append::<S>))
    .route("/lifts/import", post(lifts::import::<S>))
    .route("/lifts/compact", post(lifts::compact::<S>))
    .route("/lifts/pbs", get(lifts::personal_bests::<S>))
    // Catalog
    .route("/catalog", get(catalog::list::<S>))
    .route("/catalog/sessions", get(catalog::sessions::<S>))
    .route("/catalog/misc", post(catalog::add_misc::<S>))
    // Assistant
    .route("/query", post(query::handler::<S>))
    .route("/tables", get(tables::list::<S>))
    .route("/tables/{name}/context", get(tables::context::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use fit_core::{
    catalog::{CATALOG_TABLE, ExerciseCatalogEntry},
    store::RecordStore as _,
  };
  use fit_store_sqlite::{SqliteStore, StoreConfig};
  use serde_json::{Value, json};
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  use super::*;

  fn app() -> (TempDir, SqliteStore, Router) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&StoreConfig::in_dir(dir.path())).unwrap();
    let router = api_router(AppState::new(store.clone(), Normalizer::new("JM")));
    (dir, store, router)
  }

  async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let body = match body {
      Some(v) => Body::from(v.to_string()),
      None => Body::empty(),
    };
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(body)
      .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn raw_rows() -> Value {
    json!([
      { "Day": "01/01/2024", "Exercise": "squat", "Weight": 100, "Reps": "8", "Sets": 3 },
      { "Day": "08/01/2024", "Exercise": "squat", "Weight": 100, "Reps": "8", "Sets": 3 },
      { "Day": "02/01/2024", "Exercise": "bench press", "Weight": 82.5, "Reps": "8-10", "Sets": 3, "User": "AB" },
      { "Day": "2024-01-03", "Exercise": "deadlift", "Weight": 140, "Reps": "5", "Sets": 1 },
    ])
  }

  // ── Lifts ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn import_normalizes_and_reports_skipped_rows() {
    let (_dir, _store, router) = app();
    let (status, body) = send(&router, "POST", "/lifts/import", Some(raw_rows())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["written"], 3);
    assert_eq!(body["skipped"][0]["index"], 3);

    let (status, body) = send(&router, "GET", "/lifts", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["exercise"], "SQUAT");
    assert_eq!(rows[0]["user"], "JM");
    assert_eq!(rows[0]["day"], "2024-01-01");
  }

  #[tokio::test]
  async fn import_can_compact_first() {
    let (_dir, _store, router) = app();
    let (_, body) = send(
      &router,
      "POST",
      "/lifts/import?compact=true",
      Some(raw_rows()),
    )
    .await;
    assert_eq!(body["written"], 2);
  }

  #[tokio::test]
  async fn import_of_only_bad_rows_is_rejected() {
    let (_dir, _store, router) = app();
    let rows = json!([{ "Day": "yesterday", "Exercise": "squat", "Weight": 1, "Reps": "1", "Sets": 1 }]);
    let (status, body) = send(&router, "POST", "/lifts/import", Some(rows)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn row_missing_a_cell_is_skipped_not_fatal() {
    let (_dir, _store, router) = app();
    let rows = json!([
      { "Day": "01/01/2024", "Exercise": "squat", "Weight": 100, "Reps": "8", "Sets": 3 },
      { "Day": "02/01/2024", "Exercise": "squat", "Reps": "8", "Sets": 3 },
    ]);
    let (status, body) = send(&router, "POST", "/lifts/import", Some(rows)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["written"], 1);
    assert_eq!(body["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(body["skipped"][0]["index"], 1);
  }

  #[tokio::test]
  async fn append_adds_to_existing_table() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    let row = json!([{ "Day": "15/01/2024", "Exercise": "Squat", "Weight": 105, "Reps": "8", "Sets": 3 }]);
    let (status, body) = send(&router, "POST", "/lifts", Some(row)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appended"], 1);
    assert_eq!(body["skipped"], json!([]));

    let (_, body) = send(&router, "GET", "/lifts?exercise=squat", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn append_before_import_is_not_found() {
    let (_dir, _store, router) = app();
    let (status, _) = send(&router, "POST", "/lifts", Some(raw_rows())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn filters_by_user() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;
    let (_, body) = send(&router, "GET", "/lifts?user=ab", None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["exercise"], "BENCH PRESS");
  }

  #[tokio::test]
  async fn compact_rewrites_table() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    let (status, body) = send(&router, "POST", "/lifts/compact", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "before": 3, "after": 2 }));

    let (_, body) = send(&router, "POST", "/lifts/compact", None).await;
    assert_eq!(body, json!({ "before": 2, "after": 2 }));
  }

  #[tokio::test]
  async fn personal_bests_by_exercise() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    let (status, body) = send(&router, "GET", "/lifts/pbs?exercises=squat", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["day"], "2024-01-01");

    let (_, body) = send(&router, "GET", "/lifts/pbs", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&router, "GET", "/lifts/pbs?exercises=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  // ── Catalog ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn catalog_lists_sessions_and_accepts_misc() {
    let (_dir, store, router) = app();
    store
      .create_table(
        CATALOG_TABLE,
        &[
          ExerciseCatalogEntry::new("PUSH", "bench press"),
          ExerciseCatalogEntry::new("PULL", "row"),
          ExerciseCatalogEntry::new("PUSH", "dips"),
        ],
        None,
      )
      .unwrap();

    let (_, body) = send(&router, "GET", "/catalog/sessions", None).await;
    assert_eq!(body, json!(["PUSH", "PULL"]));

    let (status, body) = send(
      &router,
      "POST",
      "/catalog/misc",
      Some(json!({ "exercise": " farmer carry " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "day": "MISC", "exercise": "FARMER CARRY" }));

    let (_, body) = send(&router, "GET", "/catalog?session=PUSH", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (_, body) = send(&router, "GET", "/catalog", None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn blank_misc_exercise_is_rejected() {
    let (_dir, _store, router) = app();
    let (status, _) = send(
      &router,
      "POST",
      "/catalog/misc",
      Some(json!({ "exercise": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Query and tables ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn query_returns_table() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    let (status, body) = send(
      &router,
      "POST",
      "/query",
      Some(json!({ "sql": "SELECT COUNT(*) AS n FROM historic_exercises" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "columns": ["n"], "rows": [[3]] }));
  }

  #[tokio::test]
  async fn bad_or_writing_query_is_a_bad_request() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    for sql in [
      "SELECT * FROM dropped_table",
      "DELETE FROM historic_exercises",
      "SELECT 1; DELETE FROM historic_exercises",
      "-- nothing",
    ] {
      let (status, body) =
        send(&router, "POST", "/query", Some(json!({ "sql": sql }))).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{sql}");
      assert!(body["error"].is_string());
    }

    let (_, body) = send(&router, "GET", "/lifts", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn tables_and_context() {
    let (_dir, _store, router) = app();
    send(&router, "POST", "/lifts/import", Some(raw_rows())).await;

    let (_, body) = send(&router, "GET", "/tables", None).await;
    assert_eq!(body, json!(["historic_exercises"]));

    let (status, body) =
      send(&router, "GET", "/tables/historic_exercises/context", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"].as_array().unwrap().len(), 7);
    assert!(body["prompt"].as_str().unwrap().contains("- **Reps**: VARCHAR"));

    let (status, _) = send(&router, "GET", "/tables/nowhere/context", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
