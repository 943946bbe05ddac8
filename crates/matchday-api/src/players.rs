//! Handlers for player endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/add-player` | Body: `{"name","team_id","goals","assists"}`; overwrites counts |
//! | `GET`  | `/players` | Ranked by points, then goals, then name; optional `?period=` |
//! | `POST` | `/delete-player` | Body: `{"name","team_id"}`; 404 if absent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use matchday_core::{
  league::{NewPlayer, Player, TeamId},
  resolver::PeriodResolver,
  store::LeagueStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  error::ApiError,
  params::{PeriodQuery, positive_id},
};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
  pub name:    String,
  pub team_id: TeamId,
  pub goals:   u32,
  pub assists: u32,
}

impl From<Player> for PlayerView {
  fn from(p: Player) -> Self {
    Self { name: p.name, team_id: p.team_id, goals: p.goals, assists: p.assists }
  }
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddPlayerBody {
  pub name:    String,
  pub team_id: i64,
  pub goals:   u32,
  pub assists: u32,
}

/// `POST /add-player`
pub async fn add<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  body: Result<Json<AddPlayerBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  let team_id = TeamId(positive_id(body.team_id, "team")?);

  let period = resolver.resolve_current().await.map_err(ApiError::from_store)?;
  let input = NewPlayer {
    name: body.name,
    team_id,
    goals: body.goals,
    assists: body.assists,
  };
  resolver
    .store()
    .upsert_player(period.id, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "ok": true })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /players[?period=<date>]`
pub async fn list<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<PlayerView>>, ApiError> {
  let Query(query) = query?;
  let period = resolver.resolve(query.date()?).await.map_err(ApiError::from_store)?;
  let players = resolver
    .store()
    .list_players(period.id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(players.into_iter().map(PlayerView::from).collect()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeletePlayerBody {
  pub name:    String,
  pub team_id: i64,
}

/// `POST /delete-player`
pub async fn delete<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  body: Result<Json<DeletePlayerBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  let team_id = TeamId(positive_id(body.team_id, "team")?);

  let period = resolver.resolve_current().await.map_err(ApiError::from_store)?;
  let removed = resolver
    .store()
    .delete_player(period.id, team_id, body.name)
    .await
    .map_err(ApiError::from_store)?;
  if !removed {
    return Err(ApiError::NotFound("player not found in active period".into()));
  }
  Ok(Json(json!({ "ok": true })))
}
