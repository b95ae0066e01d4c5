//! detax server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the JSON API over HTTP. With `audit_interval_secs` set,
//! a background task periodically looks for aggregates that have no audit
//! history.

mod settings;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use detax_api::AppState;
use detax_core::audit::find_audit_gaps;
use detax_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

/// Upper bound on documents and on projects inspected per audit pass.
const AUDIT_SCAN_LIMIT: usize = 10_000;

#[derive(Parser)]
#[command(author, version, about = "detax knowledge-base server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run one audit check, print every aggregate without history and exit.
  #[arg(long)]
  audit: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let catalog = server_cfg.catalog().context("invalid channel catalog")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Helper mode: audit once and exit.
  if cli.audit {
    let gaps = find_audit_gaps(store.as_ref(), store.as_ref(), AUDIT_SCAN_LIMIT)
      .await
      .context("audit check failed")?;
    for gap in &gaps {
      println!("{} {}", gap.aggregate_type, gap.aggregate_id);
    }
    return Ok(());
  }

  if let Some(every) = server_cfg.audit_interval() {
    tracing::info!(interval_secs = every.as_secs(), "scheduling audit checks");
    spawn_audit(Arc::clone(&store), every);
  }

  let app = detax_api::router(AppState::new(store, catalog));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn spawn_audit(store: Arc<SqliteStore>, every: Duration) {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      match find_audit_gaps(store.as_ref(), store.as_ref(), AUDIT_SCAN_LIMIT).await {
        Ok(gaps) if gaps.is_empty() => tracing::debug!("audit check found no gaps"),
        Ok(gaps) => tracing::warn!(
          count = gaps.len(),
          "audit check found aggregates without history"
        ),
        Err(err) => tracing::error!(error = %err, "audit check failed"),
      }
    }
  });
}
