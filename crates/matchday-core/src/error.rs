//! Error types for `matchday-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{league::TeamId, period::PeriodId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("name must not be empty")]
  EmptyName,

  #[error("a match needs two distinct teams")]
  SelfMatch,

  #[error("team {0} not found")]
  TeamNotFound(TeamId),

  #[error("team {team} is not part of period {period}")]
  TeamOutsidePeriod { team: TeamId, period: PeriodId },

  #[error("teams {0} and {1} belong to different periods")]
  TeamsInDifferentPeriods(TeamId, TeamId),

  #[error("invalid period date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("no period recorded for {0}")]
  PeriodNotFound(NaiveDate),

  #[error("unknown timezone: {0:?}")]
  UnknownTimezone(String),

  #[error("invalid period policy: {0}")]
  InvalidPolicy(String),

  /// Another writer opened or closed a period between our read and write.
  #[error("concurrent period rotation")]
  RotationConflict,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse failure classes, used by callers to decide between rejecting the
/// request, reporting absence, retrying locally, or failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or semantically inconsistent input. Never retried.
  InvalidInput,
  /// The addressed row or period does not exist.
  NotFound,
  /// Lost a race against a concurrent period rotation.
  Conflict,
  /// The store failed; the whole request may be retried.
  Transient,
}

/// Implemented by every error type that crosses the store boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::EmptyName
      | Self::SelfMatch
      | Self::TeamNotFound(_)
      | Self::TeamOutsidePeriod { .. }
      | Self::TeamsInDifferentPeriods(..)
      | Self::InvalidDate(_)
      | Self::UnknownTimezone(_)
      | Self::InvalidPolicy(_) => ErrorKind::InvalidInput,
      Self::PeriodNotFound(_) => ErrorKind::NotFound,
      Self::RotationConflict => ErrorKind::Conflict,
    }
  }
}
