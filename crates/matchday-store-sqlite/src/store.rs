//! [`SqliteStore`]: the SQLite implementation of [`LeagueStore`].

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use matchday_core::{
  Error as CoreError,
  league::{Match, MatchId, NewMatch, NewPlayer, Player, Team, TeamId, normalize_name},
  period::{Period, PeriodId, PeriodResolution},
  store::LeagueStore,
};

use crate::{
  Result,
  encode::{RawMatch, RawPeriod, RawPlayer, RawTeam, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Matchday league store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// statements run on the connection's dedicated thread, one closure at a
/// time, so each closure below is atomic with respect to this process.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The period a team belongs to, if the team exists.
fn team_period(
  conn: &rusqlite::Connection,
  team: TeamId,
) -> rusqlite::Result<Option<PeriodId>> {
  conn
    .query_row(
      "SELECT period_id FROM teams WHERE id = ?1",
      rusqlite::params![team.0],
      |row| row.get(0).map(PeriodId),
    )
    .optional()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

/// Closure outcome for operations that may fail validation inside the
/// database thread: the outer error is the database, the inner one the
/// domain.
type Checked<T> = std::result::Result<T, CoreError>;

// ─── LeagueStore impl ────────────────────────────────────────────────────────

impl LeagueStore for SqliteStore {
  type Error = crate::Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Periods ───────────────────────────────────────────────────────────────

  async fn rotate_period(
    &self,
    now: DateTime<Utc>,
    max_age: TimeDelta,
    label: String,
  ) -> Result<PeriodResolution> {
    let now_str = encode_dt(now);
    // An active period that started after the cutoff is still fresh. A
    // cutoff before the representable range keeps every period fresh.
    let cutoff = now
      .checked_sub_signed(max_age)
      .map(encode_dt)
      .unwrap_or_default();

    let outcome: Checked<(RawPeriod, bool, Option<i64>)> = self
      .conn
      .call(move |conn| {
        // Hold the write lock before reading the active row.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let active = tx
          .query_row(
            &format!("SELECT {} FROM periods WHERE is_active = 1", RawPeriod::COLUMNS),
            [],
            RawPeriod::from_row,
          )
          .optional()?;

        let mut closed = None;
        if let Some(raw) = active {
          if raw.start_at > cutoff {
            tx.commit()?;
            return Ok(Ok((raw, false, None)));
          }
          tx.execute(
            "UPDATE periods SET is_active = 0, end_at = ?1 WHERE id = ?2",
            rusqlite::params![now_str, raw.id],
          )?;
          closed = Some(raw.id);
        }

        // Never start before the latest recorded end, even if the clock
        // stepped backwards since.
        let latest_end: Option<String> =
          tx.query_row("SELECT MAX(end_at) FROM periods", [], |row| row.get(0))?;
        let start_at = match latest_end {
          Some(end) if end > now_str => end,
          _ => now_str,
        };

        let inserted = tx.query_row(
          &format!(
            "INSERT INTO periods (name, start_at, is_active) VALUES (?1, ?2, 1)
             RETURNING {}",
            RawPeriod::COLUMNS
          ),
          rusqlite::params![label, start_at],
          RawPeriod::from_row,
        );
        let raw = match inserted {
          Ok(raw) => raw,
          Err(e) if is_constraint_violation(&e) => {
            return Ok(Err(CoreError::RotationConflict));
          }
          Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(Ok((raw, true, closed)))
      })
      .await?;

    let (raw, opened, closed) = outcome?;
    if let Some(old) = closed {
      debug!(period_id = old, "closed stale period");
    }
    Ok(PeriodResolution {
      period: raw.into_period()?,
      opened,
      closed: closed.map(PeriodId),
    })
  }

  async fn find_period_started_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Option<Period>> {
    let from_str  = encode_dt(from);
    let until_str = encode_dt(until);

    let raw: Option<RawPeriod> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM periods
                 WHERE start_at >= ?1 AND start_at < ?2
                 ORDER BY start_at DESC, id DESC
                 LIMIT 1",
                RawPeriod::COLUMNS
              ),
              rusqlite::params![from_str, until_str],
              RawPeriod::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPeriod::into_period).transpose()
  }

  async fn list_periods(&self) -> Result<Vec<Period>> {
    let raws: Vec<RawPeriod> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM periods ORDER BY start_at DESC, id DESC",
          RawPeriod::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawPeriod::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  async fn delete_period(&self, id: PeriodId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM periods WHERE id = ?1", rusqlite::params![id.0])?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  async fn upsert_team(&self, period: PeriodId, name: String) -> Result<Team> {
    let name = normalize_name(&name)?;

    let raw: RawTeam = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO teams (name, period_id) VALUES (?1, ?2)
             ON CONFLICT (period_id, name) DO UPDATE SET name = excluded.name
             RETURNING {}",
            RawTeam::COLUMNS
          ),
          rusqlite::params![name, period.0],
          RawTeam::from_row,
        )?)
      })
      .await?;

    Ok(raw.into_team())
  }

  async fn list_teams(&self, period: PeriodId) -> Result<Vec<Team>> {
    let raws: Vec<RawTeam> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM teams WHERE period_id = ?1 ORDER BY name, id",
          RawTeam::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![period.0], RawTeam::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawTeam::into_team).collect())
  }

  // ── Players ───────────────────────────────────────────────────────────────

  async fn upsert_player(&self, period: PeriodId, input: NewPlayer) -> Result<()> {
    let name = normalize_name(&input.name)?;
    let team = input.team_id;

    let outcome: Checked<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match team_period(&tx, team)? {
          None => return Ok(Err(CoreError::TeamNotFound(team))),
          Some(p) if p != period => {
            return Ok(Err(CoreError::TeamOutsidePeriod { team, period }));
          }
          Some(_) => {}
        }
        tx.execute(
          "INSERT INTO players (name, team_id, goals, assists) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (team_id, name)
           DO UPDATE SET goals = excluded.goals, assists = excluded.assists",
          rusqlite::params![name, team.0, input.goals, input.assists],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    Ok(outcome?)
  }

  async fn list_players(&self, period: PeriodId) -> Result<Vec<Player>> {
    let raws: Vec<RawPlayer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.id, p.name, p.team_id, p.goals, p.assists
           FROM players p
           JOIN teams t ON t.id = p.team_id
           WHERE t.period_id = ?1
           ORDER BY (p.goals + p.assists) DESC, p.goals DESC, p.name ASC, p.id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![period.0], RawPlayer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlayer::into_player).collect()
  }

  async fn delete_player(
    &self,
    period: PeriodId,
    team: TeamId,
    name: String,
  ) -> Result<bool> {
    let name = normalize_name(&name)?;

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM players
           WHERE name = ?1
             AND team_id = ?2
             AND team_id IN (SELECT id FROM teams WHERE period_id = ?3)",
          rusqlite::params![name, team.0, period.0],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn record_match(
    &self,
    period: PeriodId,
    input: NewMatch,
    played_at: DateTime<Utc>,
  ) -> Result<Match> {
    input.validate()?;
    let played_at_str = encode_dt(played_at);

    let outcome: Checked<RawMatch> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let (t1, t2) = (input.team1_id, input.team2_id);
        let p1 = match team_period(&tx, t1)? {
          Some(p) => p,
          None => return Ok(Err(CoreError::TeamNotFound(t1))),
        };
        let p2 = match team_period(&tx, t2)? {
          Some(p) => p,
          None => return Ok(Err(CoreError::TeamNotFound(t2))),
        };
        if p1 != p2 {
          return Ok(Err(CoreError::TeamsInDifferentPeriods(t1, t2)));
        }
        if p1 != period {
          return Ok(Err(CoreError::TeamOutsidePeriod { team: t1, period }));
        }

        let raw = tx.query_row(
          &format!(
            "INSERT INTO matches (team1_id, team2_id, score1, score2, played_at, period_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {}",
            RawMatch::COLUMNS
          ),
          rusqlite::params![
            t1.0,
            t2.0,
            input.score1,
            input.score2,
            played_at_str,
            period.0,
          ],
          RawMatch::from_row,
        )?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    outcome?.into_match()
  }

  async fn list_matches(&self, period: PeriodId) -> Result<Vec<Match>> {
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM matches WHERE period_id = ?1 ORDER BY played_at ASC, id ASC",
          RawMatch::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![period.0], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn delete_match(&self, period: PeriodId, id: MatchId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM matches WHERE id = ?1 AND period_id = ?2",
          rusqlite::params![id.0, period.0],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }
}
