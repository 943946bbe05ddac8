//! The `LeagueStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `matchday-store-sqlite`).
//! Higher layers (`matchday-api`, the resolver) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
  Classify,
  league::{Match, MatchId, NewMatch, NewPlayer, Player, Team, TeamId},
  period::{Period, PeriodId, PeriodResolution},
};

/// Abstraction over a Matchday store backend.
///
/// Every team, player and match operation is parameterised by a resolved
/// [`PeriodId`] and never crosses into another period implicitly. Validation
/// failures surface as [`crate::Error`] values converted into `Self::Error`,
/// so callers can classify them with [`Classify::kind`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LeagueStore: Send + Sync {
  type Error: std::error::Error
    + Classify
    + From<crate::Error>
    + Send
    + Sync
    + 'static;

  /// Cheap round trip used to confirm the store is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Periods ───────────────────────────────────────────────────────────

  /// Atomically return the active period, rotating it first if it has been
  /// active for `max_age` or longer at `now`, and opening one labelled
  /// `label` if none is active.
  ///
  /// Fails with [`crate::Error::RotationConflict`] if a concurrent writer won
  /// the race; re-running the call then observes the winner's row.
  fn rotate_period(
    &self,
    now: DateTime<Utc>,
    max_age: TimeDelta,
    label: String,
  ) -> impl Future<Output = Result<PeriodResolution, Self::Error>> + Send + '_;

  /// The most recently started period whose start lies in `[from, until)`.
  fn find_period_started_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Period>, Self::Error>> + Send + '_;

  /// All periods, most recently started first.
  fn list_periods(
    &self,
  ) -> impl Future<Output = Result<Vec<Period>, Self::Error>> + Send + '_;

  /// Administrative removal of a period and, by cascade, everything recorded
  /// in it. Returns `false` if no such period exists.
  fn delete_period(
    &self,
    id: PeriodId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Teams ─────────────────────────────────────────────────────────────

  /// Register `name` in `period`, returning the existing row if the name is
  /// already taken there.
  fn upsert_team(
    &self,
    period: PeriodId,
    name: String,
  ) -> impl Future<Output = Result<Team, Self::Error>> + Send + '_;

  /// Teams of `period`, ordered by name.
  fn list_teams(
    &self,
    period: PeriodId,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  // ── Players ───────────────────────────────────────────────────────────

  /// Insert a player or overwrite their goals and assists. The team must
  /// belong to `period`.
  fn upsert_player(
    &self,
    period: PeriodId,
    input: NewPlayer,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Players of `period` ranked by points, then goals, then name.
  fn list_players(
    &self,
    period: PeriodId,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + '_;

  /// Returns `false` if no player `name` exists on `team` within `period`.
  fn delete_player(
    &self,
    period: PeriodId,
    team: TeamId,
    name: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Matches ───────────────────────────────────────────────────────────

  /// Record a result between two distinct teams of `period`.
  fn record_match(
    &self,
    period: PeriodId,
    input: NewMatch,
    played_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  /// Matches of `period` in the order they were played.
  fn list_matches(
    &self,
    period: PeriodId,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Returns `false` if `id` does not exist within `period`.
  fn delete_match(
    &self,
    period: PeriodId,
    id: MatchId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
