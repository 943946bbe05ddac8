//! JSON REST API for Matchday.
//!
//! Exposes an axum [`Router`] backed by any [`matchday_core::store::LeagueStore`]
//! through a shared [`PeriodResolver`]. Static files, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", matchday_api::api_router(resolver.clone()))
//! ```

pub mod error;
pub mod matches;
pub mod params;
pub mod periods;
pub mod players;
pub mod teams;

use std::sync::Arc;

use axum::{
  Router,
  http::{
    HeaderValue, StatusCode,
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
  },
  routing::{get, post},
};
use matchday_core::{resolver::PeriodResolver, store::LeagueStore};
use tower_http::set_header::SetResponseHeaderLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `resolver`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type. Every response carries permissive CORS headers and
/// each `POST` route answers an `OPTIONS` pre-flight with `204`.
pub fn api_router<S>(resolver: Arc<PeriodResolver<S>>) -> Router<()>
where
  S: LeagueStore + 'static,
{
  Router::new()
    // Teams
    .route("/add-team", post(teams::add::<S>).options(preflight))
    .route("/list-teams", get(teams::list::<S>))
    // Players
    .route("/add-player", post(players::add::<S>).options(preflight))
    .route("/players", get(players::list::<S>))
    .route("/delete-player", post(players::delete::<S>).options(preflight))
    // Matches
    .route("/add-match", post(matches::add::<S>).options(preflight))
    .route("/matches", get(matches::list::<S>))
    .route("/delete-match", post(matches::delete::<S>).options(preflight))
    // Periods
    .route("/current-period", get(periods::current::<S>))
    .route("/list-periods", get(periods::list::<S>))
    .with_state(resolver)
    .layer(SetResponseHeaderLayer::overriding(
      ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static("*"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      ACCESS_CONTROL_ALLOW_HEADERS,
      HeaderValue::from_static("Content-Type"),
    ))
}

/// `OPTIONS` on any `POST` route.
async fn preflight() -> StatusCode { StatusCode::NO_CONTENT }

#[cfg(test)]
mod tests;
