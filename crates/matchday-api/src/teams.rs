//! Handlers for team endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/add-team` | Body: `{"name":"Lions"}`; upsert into the current period |
//! | `GET`  | `/list-teams` | Optional `?period=YYYY-MM-DD` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use matchday_core::{
  league::{Team, TeamId},
  resolver::PeriodResolver,
  store::LeagueStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, params::PeriodQuery};

/// Public shape of a team; the owning period is implied by the request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamView {
  pub id:   TeamId,
  pub name: String,
}

impl From<Team> for TeamView {
  fn from(team: Team) -> Self { Self { id: team.id, name: team.name } }
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddTeamBody {
  pub name: String,
}

/// `POST /add-team`
pub async fn add<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  body: Result<Json<AddTeamBody>, JsonRejection>,
) -> Result<Json<TeamView>, ApiError> {
  let Json(body) = body?;
  let period = resolver.resolve_current().await.map_err(ApiError::from_store)?;
  let team = resolver
    .store()
    .upsert_team(period.id, body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(team.into()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /list-teams[?period=<date>]`
pub async fn list<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<TeamView>>, ApiError> {
  let Query(query) = query?;
  let period = resolver.resolve(query.date()?).await.map_err(ApiError::from_store)?;
  let teams = resolver
    .store()
    .list_teams(period.id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(teams.into_iter().map(TeamView::from).collect()))
}
