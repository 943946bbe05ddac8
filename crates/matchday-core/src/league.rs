//! Teams, players and matches: everything recorded inside a period.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, period::PeriodId};

// ─── Identity ────────────────────────────────────────────────────────────────

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

row_id!(
  /// Store-assigned team identifier.
  TeamId
);
row_id!(
  /// Store-assigned player identifier.
  PlayerId
);
row_id!(
  /// Store-assigned match identifier.
  MatchId
);

// ─── Team ────────────────────────────────────────────────────────────────────

/// A team registered for one period. The same name may be registered again in
/// a later period and gets a new identifier there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub id:        TeamId,
  pub name:      String,
  pub period_id: PeriodId,
}

// ─── Player ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub id:      PlayerId,
  pub name:    String,
  /// The owning team; it fixes the player's period.
  pub team_id: TeamId,
  pub goals:   u32,
  pub assists: u32,
}

impl Player {
  /// Leaderboard score.
  pub fn points(&self) -> u64 { u64::from(self.goals) + u64::from(self.assists) }
}

/// Input to [`crate::store::LeagueStore::upsert_player`]. On a `(name, team)`
/// conflict the stored goals and assists are overwritten.
#[derive(Debug, Clone)]
pub struct NewPlayer {
  pub name:    String,
  pub team_id: TeamId,
  pub goals:   u32,
  pub assists: u32,
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A recorded match result. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
  pub id:        MatchId,
  pub team1_id:  TeamId,
  pub team2_id:  TeamId,
  pub score1:    u32,
  pub score2:    u32,
  pub played_at: DateTime<Utc>,
  pub period_id: PeriodId,
}

/// Input to [`crate::store::LeagueStore::record_match`].
/// `played_at` is supplied by the caller's clock, not the client.
#[derive(Debug, Clone)]
pub struct NewMatch {
  pub team1_id: TeamId,
  pub team2_id: TeamId,
  pub score1:   u32,
  pub score2:   u32,
}

impl NewMatch {
  /// Checks that do not need the store.
  pub fn validate(&self) -> Result<()> {
    if self.team1_id == self.team2_id {
      return Err(Error::SelfMatch);
    }
    Ok(())
  }
}

// ─── Names ───────────────────────────────────────────────────────────────────

/// Trim a team or player name, rejecting one that is empty afterwards.
pub fn normalize_name(raw: &str) -> Result<String> {
  let name = raw.trim();
  if name.is_empty() {
    return Err(Error::EmptyName);
  }
  Ok(name.to_owned())
}
