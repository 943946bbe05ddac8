//! Handlers for match endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/add-match` | Body: `{"team1_id","team2_id","score1","score2"}` |
//! | `GET`  | `/matches` | Chronological; optional `?period=` |
//! | `POST` | `/delete-match` | Body: `{"id"}`; 404 if absent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use matchday_core::{
  league::{Match, MatchId, NewMatch, TeamId},
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
pub struct MatchView {
  pub id:        MatchId,
  pub team1_id:  TeamId,
  pub team2_id:  TeamId,
  pub score1:    u32,
  pub score2:    u32,
  pub played_at: DateTime<Utc>,
}

impl From<Match> for MatchView {
  fn from(m: Match) -> Self {
    Self {
      id:        m.id,
      team1_id:  m.team1_id,
      team2_id:  m.team2_id,
      score1:    m.score1,
      score2:    m.score2,
      played_at: m.played_at,
    }
  }
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddMatchBody {
  pub team1_id: i64,
  pub team2_id: i64,
  pub score1:   u32,
  pub score2:   u32,
}

/// `POST /add-match`. `played_at` comes from the server clock.
pub async fn add<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  body: Result<Json<AddMatchBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  let input = NewMatch {
    team1_id: TeamId(positive_id(body.team1_id, "team")?),
    team2_id: TeamId(positive_id(body.team2_id, "team")?),
    score1:   body.score1,
    score2:   body.score2,
  };
  input.validate()?;

  let period = resolver.resolve_current().await.map_err(ApiError::from_store)?;
  let recorded = resolver
    .store()
    .record_match(period.id, input, resolver.now())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "id": recorded.id })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /matches[?period=<date>]`
pub async fn list<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<MatchView>>, ApiError> {
  let Query(query) = query?;
  let period = resolver.resolve(query.date()?).await.map_err(ApiError::from_store)?;
  let matches = resolver
    .store()
    .list_matches(period.id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(matches.into_iter().map(MatchView::from).collect()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteMatchBody {
  pub id: i64,
}

/// `POST /delete-match`
pub async fn delete<S: LeagueStore>(
  State(resolver): State<Arc<PeriodResolver<S>>>,
  body: Result<Json<DeleteMatchBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  let id = MatchId(positive_id(body.id, "match")?);

  let period = resolver.resolve_current().await.map_err(ApiError::from_store)?;
  let removed = resolver
    .store()
    .delete_match(period.id, id)
    .await
    .map_err(ApiError::from_store)?;
  if !removed {
    return Err(ApiError::NotFound("match not found in active period".into()));
  }
  Ok(Json(json!({ "ok": true })))
}
