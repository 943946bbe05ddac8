//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! fraction and a `Z` suffix, which keeps lexicographic and chronological
//! order identical. Identifiers are SQLite integer row ids.

use chrono::{DateTime, SecondsFormat, Utc};
use matchday_core::{
  league::{Match, MatchId, Player, PlayerId, Team, TeamId},
  period::{Period, PeriodId},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ────────────────────────────────────────────────────────────────

fn decode_count(column: &str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Corrupt(format!("{column} = {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `periods` row.
pub struct RawPeriod {
  pub id:        i64,
  pub name:      String,
  pub start_at:  String,
  pub end_at:    Option<String>,
  pub is_active: bool,
}

impl RawPeriod {
  pub const COLUMNS: &'static str = "id, name, start_at, end_at, is_active";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      name:      row.get(1)?,
      start_at:  row.get(2)?,
      end_at:    row.get(3)?,
      is_active: row.get(4)?,
    })
  }

  pub fn into_period(self) -> Result<Period> {
    Ok(Period {
      id:         PeriodId(self.id),
      name:       self.name,
      start_time: decode_dt(&self.start_at)?,
      end_time:   self.end_at.as_deref().map(decode_dt).transpose()?,
      is_active:  self.is_active,
    })
  }
}

/// Raw values read directly from a `teams` row.
pub struct RawTeam {
  pub id:        i64,
  pub name:      String,
  pub period_id: i64,
}

impl RawTeam {
  pub const COLUMNS: &'static str = "id, name, period_id";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)?, period_id: row.get(2)? })
  }

  pub fn into_team(self) -> Team {
    Team {
      id:        TeamId(self.id),
      name:      self.name,
      period_id: PeriodId(self.period_id),
    }
  }
}

/// Raw values read directly from a `players` row.
pub struct RawPlayer {
  pub id:      i64,
  pub name:    String,
  pub team_id: i64,
  pub goals:   i64,
  pub assists: i64,
}

impl RawPlayer {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      name:    row.get(1)?,
      team_id: row.get(2)?,
      goals:   row.get(3)?,
      assists: row.get(4)?,
    })
  }

  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      id:      PlayerId(self.id),
      name:    self.name,
      team_id: TeamId(self.team_id),
      goals:   decode_count("goals", self.goals)?,
      assists: decode_count("assists", self.assists)?,
    })
  }
}

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub id:        i64,
  pub team1_id:  i64,
  pub team2_id:  i64,
  pub score1:    i64,
  pub score2:    i64,
  pub played_at: String,
  pub period_id: i64,
}

impl RawMatch {
  pub const COLUMNS: &'static str =
    "id, team1_id, team2_id, score1, score2, played_at, period_id";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      team1_id:  row.get(1)?,
      team2_id:  row.get(2)?,
      score1:    row.get(3)?,
      score2:    row.get(4)?,
      played_at: row.get(5)?,
      period_id: row.get(6)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      id:        MatchId(self.id),
      team1_id:  TeamId(self.team1_id),
      team2_id:  TeamId(self.team2_id),
      score1:    decode_count("score1", self.score1)?,
      score2:    decode_count("score2", self.score2)?,
      played_at: decode_dt(&self.played_at)?,
      period_id: PeriodId(self.period_id),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = decode_dt("2026-10-19T09:59:59.9Z").unwrap();
    let b = decode_dt("2026-10-19T10:00:00Z").unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(b), "2026-10-19T10:00:00.000000Z");
  }

  #[test]
  fn timestamps_survive_encoding() {
    let dt = decode_dt("2026-10-19T10:00:00.123456Z").unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn negative_counts_are_corrupt() {
    assert!(matches!(decode_count("goals", -1), Err(Error::Corrupt(_))));
    assert_eq!(decode_count("goals", 4).unwrap(), 4);
  }
}
