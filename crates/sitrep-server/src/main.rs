//! sitrep server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), builds the
//! HTTP fetcher, pipeline and cache, and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use sitrep_cache::{DataCache, SystemClock};
use sitrep_server::{ApiState, ServerConfig};
use sitrep_source::{HttpFetcher, Pipeline};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sitrep epidemiological data server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SITREP"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Build the pipeline and cache.
  let fetcher =
    HttpFetcher::new(Duration::from_secs(server_cfg.fetch_timeout_seconds))
      .context("failed to build HTTP client")?;
  let state = ApiState {
    pipeline: Arc::new(Pipeline::new(
      fetcher,
      server_cfg.sources.clone(),
    )),
    cache:    Arc::new(DataCache::new(
      server_cfg.cache_ttl_seconds,
      Arc::new(SystemClock),
    )),
  };

  let app = sitrep_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
