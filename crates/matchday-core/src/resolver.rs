//! [`PeriodResolver`] decides which period a request belongs to.
//!
//! The resolver owns a short-lived cache of the current period so that most
//! requests skip the store round trip. The cache is only an optimisation: the
//! decision to rotate is always taken inside the store's transaction, and a
//! cached period is dropped as soon as it could have been rotated.

use std::sync::{
  Arc, PoisonError, RwLock,
  atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::{
  Classify, Error, ErrorKind,
  clock::Clock,
  period::{Period, PeriodId, PeriodTiming, day_bounds, period_label},
  store::LeagueStore,
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Tunables for period rotation and lookup.
#[derive(Debug, Clone, Copy)]
pub struct PeriodPolicy {
  /// How long a period stays active before the next request rotates it.
  pub duration:  TimeDelta,
  /// Upper bound on how long a resolved period is served from memory.
  pub cache_ttl: TimeDelta,
  /// Timezone used for calendar-date lookups and period labels.
  pub timezone:  Tz,
}

/// Longest accepted period, a little over a year.
pub const MAX_PERIOD_HOURS: i64 = 24 * 366;

impl PeriodPolicy {
  /// Checked constructor. The duration must be positive and at most
  /// [`MAX_PERIOD_HOURS`]; the cache bound may be zero (no caching) but not
  /// negative or longer than the duration.
  pub fn new(duration: TimeDelta, cache_ttl: TimeDelta, timezone: Tz) -> Result<Self, Error> {
    if duration <= TimeDelta::zero() || duration > TimeDelta::hours(MAX_PERIOD_HOURS) {
      return Err(Error::InvalidPolicy(format!(
        "period duration must be between 1 second and {MAX_PERIOD_HOURS} hours, got {}s",
        duration.num_seconds()
      )));
    }
    if cache_ttl < TimeDelta::zero() || cache_ttl > duration {
      return Err(Error::InvalidPolicy(format!(
        "cache ttl must be between 0 and the period duration, got {}s",
        cache_ttl.num_seconds()
      )));
    }
    Ok(Self { duration, cache_ttl, timezone })
  }
}

impl Default for PeriodPolicy {
  fn default() -> Self {
    Self {
      duration:  TimeDelta::hours(24),
      cache_ttl: TimeDelta::seconds(60),
      timezone:  chrono_tz::UTC,
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

struct CachedPeriod {
  period:     Period,
  checked_at: DateTime<Utc>,
}

/// Resolves "now" or a calendar date to a stored [`Period`].
///
/// One instance is shared by every request handler; cloning the surrounding
/// `Arc` is the intended way to hand it around.
pub struct PeriodResolver<S> {
  store:  Arc<S>,
  clock:  Arc<dyn Clock>,
  policy: PeriodPolicy,
  cache:  RwLock<Option<CachedPeriod>>,
  /// Bumped by every invalidation; a resolution that began under an older
  /// generation does not refill the cache.
  generation: AtomicU64,
}

impl<S: LeagueStore> PeriodResolver<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: PeriodPolicy) -> Self {
    Self {
      store,
      clock,
      policy,
      cache: RwLock::new(None),
      generation: AtomicU64::new(0),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn policy(&self) -> &PeriodPolicy { &self.policy }

  /// The resolver's notion of the current instant.
  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  /// The period covering the present instant, opening a new one if none is
  /// active or the active one has run its course.
  pub async fn resolve_current(&self) -> Result<Period, S::Error> {
    let generation = self.generation.load(Ordering::Acquire);
    let now = self.clock.now();
    if let Some(period) = self.cached(now) {
      debug!(period_id = %period.id, "current period served from cache");
      return Ok(period);
    }

    let label = period_label(now, self.policy.timezone);
    let resolution = match self
      .store
      .rotate_period(now, self.policy.duration, label.clone())
      .await
    {
      Err(e) if e.kind() == ErrorKind::Conflict => {
        warn!(error = %e, "lost period rotation race; re-reading");
        self
          .store
          .rotate_period(now, self.policy.duration, label)
          .await?
      }
      other => other?,
    };

    if resolution.opened {
      info!(
        period_id = %resolution.period.id,
        name = %resolution.period.name,
        closed = ?resolution.closed.map(|id| id.0),
        "opened period"
      );
    }

    self.remember(&resolution.period, now, generation);
    Ok(resolution.period)
  }

  /// The period that started on `date` in the reference timezone.
  ///
  /// Rolling windows cannot be derived from a date, so this never creates a
  /// period; a date without one is [`Error::PeriodNotFound`].
  pub async fn resolve_for_date(&self, date: NaiveDate) -> Result<Period, S::Error> {
    let (from, until) = day_bounds(date, self.policy.timezone)?;
    self
      .store
      .find_period_started_between(from, until)
      .await?
      .ok_or_else(|| Error::PeriodNotFound(date).into())
  }

  /// [`Self::resolve_for_date`] when a date is given, otherwise
  /// [`Self::resolve_current`].
  pub async fn resolve(&self, date: Option<NaiveDate>) -> Result<Period, S::Error> {
    match date {
      Some(date) => self.resolve_for_date(date).await,
      None => self.resolve_current().await,
    }
  }

  /// Elapsed/remaining time of `period` at the resolver's current instant.
  pub fn timing(&self, period: &Period) -> PeriodTiming {
    period.timing(self.clock.now(), self.policy.duration)
  }

  /// Delete a period with everything recorded in it.
  pub async fn purge(&self, id: PeriodId) -> Result<bool, S::Error> {
    let removed = self.store.delete_period(id).await?;
    self.invalidate();
    if removed {
      info!(period_id = %id, "purged period");
    }
    Ok(removed)
  }

  /// Forget the cached period; the next resolution goes to the store. A
  /// resolution already in flight is not cached when it completes.
  pub fn invalidate(&self) {
    let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
    self.generation.fetch_add(1, Ordering::AcqRel);
    *guard = None;
  }

  fn cached(&self, now: DateTime<Utc>) -> Option<Period> {
    let guard = self.cache.read().unwrap_or_else(PoisonError::into_inner);
    let entry = guard.as_ref()?;
    let age = now - entry.checked_at;
    let fresh = age >= TimeDelta::zero()
      && age < self.policy.cache_ttl
      && !entry.period.is_stale(now, self.policy.duration);
    fresh.then(|| entry.period.clone())
  }

  fn remember(&self, period: &Period, now: DateTime<Utc>, generation: u64) {
    let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
    if self.generation.load(Ordering::Acquire) == generation {
      *guard = Some(CachedPeriod { period: period.clone(), checked_at: now });
    }
  }
}
