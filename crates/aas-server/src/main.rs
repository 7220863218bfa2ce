//! aas-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, starts one simulator worker per configured device and
//! serves the read API over HTTP until Ctrl+C.
//!
//! ```text
//! cargo run -p aas-server -- --config config.toml
//! ```

use std::path::{Path, PathBuf};

use aas_server::{
  ServerConfig,
  simulator::{self, Worker},
};
use aas_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::{net::TcpListener, sync::watch};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "AAS telemetry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Serve the API only; start no simulator workers.
  #[arg(long)]
  no_simulate: bool,
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
  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&cfg.store_path);

  // Opening the first store creates the schema; later handles find it in place.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_write_policy(cfg.write_policy());

  // Start workers, each with its own connection.
  let (stop_tx, stop_rx) = watch::channel(false);
  let mut workers = Vec::new();
  if cli.no_simulate {
    tracing::info!("simulation disabled");
  } else {
    for sim in &cfg.simulators {
      let worker_store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store for {}", sim.asset_id))?
        .with_write_policy(cfg.write_policy());
      let worker = Worker::new(worker_store, sim.source(), cfg.interval());
      workers.push(simulator::spawn(worker, stop_rx.clone()));
    }
  }
  drop(stop_rx);

  let app = aas_server::router(store);
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal(stop_tx))
    .await
    .context("server error")?;

  for handle in workers {
    if let Err(e) = handle.await {
      tracing::warn!(error = %e, "worker task failed");
    }
  }
  tracing::info!("shut down");

  Ok(())
}

/// Resolve on Ctrl+C and tell the workers to stop.
async fn shutdown_signal(stop: watch::Sender<bool>) {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
  stop.send(true).ok();
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
