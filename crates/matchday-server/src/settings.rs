//! Runtime configuration: built-in defaults, then `config.toml`, then
//! `MATCHDAY_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use chrono::TimeDelta;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use matchday_core::{period::parse_timezone, resolver::PeriodPolicy};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  pub public_dir:             PathBuf,
  /// IANA name of the reference timezone for `?period=` dates and labels.
  pub timezone:               String,
  pub period_hours:           u32,
  pub cache_ttl_secs:         u32,
  pub request_timeout_secs:   u64,
  pub startup_attempts:       u32,
  pub startup_retry_delay_ms: u64,
}

impl ServerConfig {
  /// Load from the optional file at `path` layered over the defaults, with
  /// environment variables taking precedence.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = defaults()
      .context("invalid built-in defaults")?
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix("MATCHDAY"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  /// Period rules derived from the configuration. Fails on an unknown
  /// timezone name or an out-of-range duration or cache bound.
  pub fn policy(&self) -> matchday_core::Result<PeriodPolicy> {
    PeriodPolicy::new(
      TimeDelta::hours(i64::from(self.period_hours)),
      TimeDelta::seconds(i64::from(self.cache_ttl_secs)),
      parse_timezone(&self.timezone)?,
    )
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn startup_retry_delay(&self) -> Duration {
    Duration::from_millis(self.startup_retry_delay_ms)
  }

  /// The store path with a leading `~` expanded to the home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 3000_i64)?
    .set_default("store_path", "matchday.sqlite3")?
    .set_default("public_dir", "public")?
    .set_default("timezone", "UTC")?
    .set_default("period_hours", 24_i64)?
    .set_default("cache_ttl_secs", 60_i64)?
    .set_default("request_timeout_secs", 15_i64)?
    .set_default("startup_attempts", 10_i64)?
    .set_default("startup_retry_delay_ms", 2000_i64)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
