//! Periods: the rolling time windows every team, player and match belongs
//! to.
//!
//! A period is opened lazily the first time something needs it and stays
//! active for a fixed duration. Once stale it is closed (end boundary set,
//! active flag cleared) and a fresh one is opened in its place. Closed periods
//! are kept so historical data can be looked up by calendar date.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned period identifier; increases with creation order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeriodId(pub i64);

impl fmt::Display for PeriodId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// A `[start_time, end_time)` window. `end_time` stays empty while the period
/// is active and is written exactly once, when it is superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub id:         PeriodId,
  /// Human label, e.g. `Period 2026-10-19 09:30`.
  pub name:       String,
  pub start_time: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end_time:   Option<DateTime<Utc>>,
  pub is_active:  bool,
}

impl Period {
  /// Whether an active period has outlived `duration` at `now`.
  pub fn is_stale(&self, now: DateTime<Utc>, duration: TimeDelta) -> bool {
    !self.is_active || now - self.start_time >= duration
  }

  /// Elapsed and remaining time of this period as seen at `now`.
  pub fn timing(&self, now: DateTime<Utc>, duration: TimeDelta) -> PeriodTiming {
    if !self.is_active {
      let elapsed = self
        .end_time
        .map(|end| end - self.start_time)
        .unwrap_or_else(|| now - self.start_time);
      return PeriodTiming {
        elapsed:   elapsed.max(TimeDelta::zero()),
        remaining: TimeDelta::zero(),
      };
    }

    let elapsed = now - self.start_time;
    PeriodTiming {
      elapsed,
      remaining: (duration - elapsed).max(TimeDelta::zero()),
    }
  }
}

/// Outcome of a store-side rotation: the period that is current afterwards
/// and, if a rotation happened, the one that was closed.
#[derive(Debug, Clone)]
pub struct PeriodResolution {
  pub period: Period,
  /// `true` if `period` was inserted by this call.
  pub opened: bool,
  pub closed: Option<PeriodId>,
}

// ─── Timing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTiming {
  pub elapsed:   TimeDelta,
  pub remaining: TimeDelta,
}

impl PeriodTiming {
  pub fn elapsed_hours(&self) -> f64 { hours(self.elapsed) }

  pub fn remaining_hours(&self) -> f64 { hours(self.remaining) }

  /// Compact countdown until the next automatic rotation, e.g. `23h59m58s`.
  pub fn auto_reset_in(&self) -> String { format_duration(self.remaining) }
}

fn hours(d: TimeDelta) -> f64 {
  d.num_milliseconds() as f64 / 3_600_000.0
}

/// Render a duration as `XhYmZs`, dropping leading zero units. Sub-second
/// precision is truncated; negative durations render as `0s`.
pub fn format_duration(d: TimeDelta) -> String {
  let total = d.num_seconds().max(0);
  let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
  match (h, m) {
    (0, 0) => format!("{s}s"),
    (0, _) => format!("{m}m{s}s"),
    _ => format!("{h}h{m}m{s}s"),
  }
}

// ─── Calendar helpers ────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` query value.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// Parse an IANA timezone name such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
  name
    .parse::<Tz>()
    .map_err(|_| Error::UnknownTimezone(name.to_owned()))
}

/// The UTC bounds of calendar day `date` in `tz`: `[00:00, next day 00:00)`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
  let next = date
    .succ_opt()
    .ok_or_else(|| Error::InvalidDate(date.to_string()))?;
  Ok((local_midnight(date, tz)?, local_midnight(next, tz)?))
}

/// First instant of `date` in `tz`. A few zones skip midnight on DST days, in
/// which case the day starts at the first representable wall-clock hour.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
  (0..3)
    .find_map(|hour| {
      let t = NaiveTime::from_hms_opt(hour, 0, 0)?;
      tz.from_local_datetime(&date.and_time(t)).earliest()
    })
    .map(|dt| dt.with_timezone(&Utc))
    .ok_or_else(|| Error::InvalidDate(date.to_string()))
}

/// Label given to a period opened at `now`.
pub fn period_label(now: DateTime<Utc>, tz: Tz) -> String {
  now.with_timezone(&tz).format("Period %Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
  }

  fn active(start: &str) -> Period {
    Period {
      id:         PeriodId(1),
      name:       "p".into(),
      start_time: at(start),
      end_time:   None,
      is_active:  true,
    }
  }

  #[test]
  fn staleness_uses_full_duration() {
    let p = active("2026-10-19T10:00:00Z");
    let day = TimeDelta::hours(24);
    assert!(!p.is_stale(at("2026-10-20T09:59:59Z"), day));
    assert!(p.is_stale(at("2026-10-20T10:00:00Z"), day));
  }

  #[test]
  fn timing_of_active_period_counts_down() {
    let p = active("2026-10-19T10:00:00Z");
    let t = p.timing(at("2026-10-19T16:00:00Z"), TimeDelta::hours(24));
    assert_eq!(t.elapsed_hours(), 6.0);
    assert_eq!(t.remaining_hours(), 18.0);
    assert_eq!(t.auto_reset_in(), "18h0m0s");
  }

  #[test]
  fn timing_of_overdue_period_clamps_remaining() {
    let p = active("2026-10-19T10:00:00Z");
    let t = p.timing(at("2026-10-21T10:00:00Z"), TimeDelta::hours(24));
    assert_eq!(t.remaining, TimeDelta::zero());
    assert_eq!(t.auto_reset_in(), "0s");
  }

  #[test]
  fn timing_of_closed_period_is_frozen() {
    let mut p = active("2026-10-19T10:00:00Z");
    p.is_active = false;
    p.end_time = Some(at("2026-10-20T12:30:00Z"));
    let t = p.timing(at("2026-10-25T00:00:00Z"), TimeDelta::hours(24));
    assert_eq!(t.elapsed_hours(), 26.5);
    assert_eq!(t.remaining, TimeDelta::zero());
  }

  #[test]
  fn format_duration_drops_leading_units() {
    assert_eq!(format_duration(TimeDelta::seconds(42)), "42s");
    assert_eq!(format_duration(TimeDelta::seconds(300)), "5m0s");
    assert_eq!(format_duration(TimeDelta::seconds(86_399)), "23h59m59s");
    assert_eq!(format_duration(TimeDelta::seconds(-5)), "0s");
  }

  #[test]
  fn parse_date_rejects_garbage() {
    assert_eq!(
      parse_date("2026-10-19").unwrap(),
      NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    );
    assert!(matches!(parse_date("19/10/2026"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("2026-02-30"), Err(Error::InvalidDate(_))));
  }

  #[test]
  fn day_bounds_follow_reference_timezone() {
    let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

    let (start, end) = day_bounds(date, chrono_tz::UTC).unwrap();
    assert_eq!(start, at("2026-07-01T00:00:00Z"));
    assert_eq!(end, at("2026-07-02T00:00:00Z"));

    let (start, end) = day_bounds(date, chrono_tz::Europe::Berlin).unwrap();
    assert_eq!(start, at("2026-06-30T22:00:00Z"));
    assert_eq!(end, at("2026-07-01T22:00:00Z"));
  }

  #[test]
  fn day_bounds_span_dst_change() {
    // Clocks go back on the last Sunday of October: a 25-hour day.
    let date = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
    let (start, end) = day_bounds(date, chrono_tz::Europe::Berlin).unwrap();
    assert_eq!(end - start, TimeDelta::hours(25));
  }

  #[test]
  fn label_uses_reference_timezone() {
    let now = at("2026-10-19T22:15:00Z");
    assert_eq!(period_label(now, chrono_tz::UTC), "Period 2026-10-19 22:15");
    assert_eq!(
      period_label(now, chrono_tz::Asia::Tokyo),
      "Period 2026-10-20 07:15"
    );
  }

  #[test]
  fn unknown_timezone_is_rejected() {
    assert!(parse_timezone("Europe/Berlin").is_ok());
    assert!(matches!(
      parse_timezone("Mars/Olympus"),
      Err(Error::UnknownTimezone(_))
    ));
  }
}
