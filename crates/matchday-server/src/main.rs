//! matchday server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API plus the static front-end over HTTP.
//!
//! # Purging a period
//!
//! To delete a period with all of its teams, players and matches:
//!
//! ```text
//! cargo run -p matchday-server --bin server -- --purge-period 3
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use matchday_core::{clock::SystemClock, period::PeriodId, resolver::PeriodResolver};
use matchday_server::{ServerConfig, app, open_with_retry};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Matchday league server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Delete the period with this id, cascading to everything recorded in it,
  /// and exit.
  #[arg(long, value_name = "ID")]
  purge_period: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config)?;
  let policy = server_cfg
    .policy()
    .context("invalid period configuration")?;

  // Open SQLite store; the schema is created on open.
  let store_path = server_cfg.resolved_store_path();
  let store = open_with_retry(
    &store_path,
    server_cfg.startup_attempts,
    server_cfg.startup_retry_delay(),
  )
  .await
  .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let resolver = Arc::new(PeriodResolver::new(
    Arc::new(store),
    Arc::new(SystemClock),
    policy,
  ));

  // Helper mode: purge a period and exit.
  if let Some(id) = cli.purge_period {
    let removed = resolver
      .purge(PeriodId(id))
      .await
      .with_context(|| format!("failed to purge period {id}"))?;
    if removed {
      println!("period {id} deleted");
    } else {
      println!("period {id} not found");
    }
    return Ok(());
  }

  let app = app(resolver, &server_cfg.public_dir, server_cfg.request_timeout());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
