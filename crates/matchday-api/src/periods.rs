//! Handlers for period endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/current-period` | Period plus timing; optional `?period=` |
//! | `GET`  | `/list-periods` | Most recently started first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use matchday_core::{period::Period, resolver::PeriodResolver, store::LeagueStore};
use serde::Serialize;

use crate::{error::ApiError, params::PeriodQuery};

#[derive(Debug, Serialize)]
pub struct CurrentPeriodView {
  pub period:          Period,
  pub elapsed_hours:   f64,
  pub remaining_hours: f64,
  pub auto_reset_in:   String,
}

/// `GET /current-period[?period=<date>]`
pub async fn current<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<CurrentPeriodView>, ApiError> {
  let Query(query) = query?;
  let period = resolver.resolve(query.date()?).await.map_err(ApiError::from_store)?;
  let timing = resolver.timing(&period);
  Ok(Json(CurrentPeriodView {
    period,
    elapsed_hours: timing.elapsed_hours(),
    remaining_hours: timing.remaining_hours(),
    auto_reset_in: timing.auto_reset_in(),
  }))
}

/// `GET /list-periods`
pub async fn list<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
) -> Result<Json<Vec<Period>>, ApiError> {
  let periods = resolver
    .store()
    .list_periods()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(periods))
}
