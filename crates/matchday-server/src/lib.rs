//! Process-level wiring for the Matchday server: configuration, store
//! startup, and the full application router (JSON API plus static
//! front-end).

pub mod settings;
pub mod web;

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
  BoxError, Json, Router,
  error_handling::HandleErrorLayer,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use matchday_api::ApiError;
use matchday_core::{resolver::PeriodResolver, store::LeagueStore};
use matchday_store_sqlite::SqliteStore;
use serde_json::json;
use tower::{
  ServiceBuilder,
  timeout::{TimeoutLayer, error::Elapsed},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use settings::ServerConfig;

/// Open the store at `path` and confirm it answers, trying up to `attempts`
/// times with `delay` between tries. The last failure is returned once the
/// attempts are used up.
pub async fn open_with_retry(
  path: &Path,
  attempts: u32,
  delay: Duration,
) -> matchday_store_sqlite::Result<SqliteStore> {
  let attempts = attempts.max(1);
  let mut attempt = 1;
  loop {
    let outcome = match SqliteStore::open(path).await {
      Ok(store) => store.ping().await.map(|()| store),
      Err(e) => Err(e),
    };
    match outcome {
      Ok(store) => {
        info!(path = %path.display(), attempt, "store ready");
        return Ok(store);
      }
      Err(e) if attempt < attempts => {
        warn!(error = %e, attempt, attempts, "store not reachable yet; retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(e) => return Err(e),
    }
  }
}

/// The complete application: the JSON API under `/api`, everything else from
/// `public_dir`, with request tracing and a per-request timeout.
pub fn app<S>(
  resolver: Arc<PeriodResolver<S>>,
  public_dir: &Path,
  request_timeout: Duration,
) -> Router
where
  S: LeagueStore + 'static,
{
  let router = Router::new()
    .nest("/api", matchday_api::api_router(resolver))
    .merge(web::static_router(public_dir));
  with_timeout(router, request_timeout).layer(TraceLayer::new_for_http())
}

/// Bound every request in `router` by `limit`. A request that runs out of
/// time gets a 408 with the same `{"error": ...}` body as the API errors.
pub(crate) fn with_timeout(router: Router, limit: Duration) -> Router {
  router.layer(
    ServiceBuilder::new()
      .layer(HandleErrorLayer::new(timed_out))
      .layer(TimeoutLayer::new(limit)),
  )
}

async fn timed_out(err: BoxError) -> Response {
  if err.is::<Elapsed>() {
    warn!("request timed out");
    let body = Json(json!({ "error": "request timed out" }));
    return (StatusCode::REQUEST_TIMEOUT, body).into_response();
  }
  ApiError::Store(err).into_response()
}
