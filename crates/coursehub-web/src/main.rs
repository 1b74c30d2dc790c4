//! CourseHub server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `COURSEHUB_*` environment variables, opens the SQLite store, and serves the
//! marketplace over HTTP.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use coursehub_core::store::MarketStore;
use coursehub_store_sqlite::SqliteStore;
use coursehub_web::{AppState, ServerConfig, session};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How often expired sessions are swept from the store.
const REAP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser)]
#[command(author, version, about = "CourseHub marketplace server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("COURSEHUB"))
    .build()
    .context("failed to read configuration")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.database_path = expand_tilde(&server_cfg.database_path);
  server_cfg.upload_dir = expand_tilde(&server_cfg.upload_dir);

  tokio::fs::create_dir_all(&server_cfg.upload_dir)
    .await
    .with_context(|| format!("failed to create upload dir {:?}", server_cfg.upload_dir))?;

  let store = SqliteStore::open(&server_cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.database_path))?;
  let identities = store
    .count_identities()
    .await
    .context("failed to query the store")?;
  tracing::info!(identities, path = ?server_cfg.database_path, "store opened");

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg).context("invalid configuration")?;

  session::spawn_reaper(state.store.clone(), REAP_INTERVAL);

  let app = coursehub_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
