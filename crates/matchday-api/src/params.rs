//! Extractor helpers shared by every handler.

use chrono::NaiveDate;
use matchday_core::period::parse_date;
use serde::Deserialize;

use crate::error::ApiError;

/// `?period=YYYY-MM-DD` selects a past period by the day it started on.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
  pub period: Option<String>,
}

impl PeriodQuery {
  /// The requested date, or `None` for the current period. A blank value
  /// counts as absent.
  pub fn date(&self) -> Result<Option<NaiveDate>, ApiError> {
    match self.period.as_deref().map(str::trim) {
      None | Some("") => Ok(None),
      Some(raw) => Ok(Some(parse_date(raw)?)),
    }
  }
}

/// Reject zero and negative identifiers before they reach the store.
pub fn positive_id(raw: i64, what: &str) -> Result<i64, ApiError> {
  if raw <= 0 {
    return Err(ApiError::BadRequest(format!("invalid {what} id")));
  }
  Ok(raw)
}
