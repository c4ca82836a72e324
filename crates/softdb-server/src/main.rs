//! SoftDB server binary.
//!
//! Reads `softdb.toml` (or the path given with `--config`), opens the SQLite
//! database, makes sure its schema exists, and serves the JSON API over HTTP.

mod settings;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use softdb_core::store::SubjectRepository;
use softdb_store_sqlite::Services;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "SoftDB software license server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "softdb.toml")]
  config: std::path::PathBuf,

  /// Create the schema and seed the root subjects, then exit.
  #[arg(short = 'd', long)]
  setup_only: bool,

  /// Log the descendants of the `what` and `why` roots, then exit.
  #[arg(long)]
  report: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let database_path = expand_tilde(&server_cfg.database_path);
  let services = Services::open(&database_path, &server_cfg.table_prefix)
    .await
    .with_context(|| format!("failed to open database at {database_path:?}"))?;

  if cli.setup_only {
    info!(path = ?database_path, "schema created");
    return Ok(());
  }

  if cli.report {
    return report(&services).await;
  }

  let app = axum::Router::new()
    .merge(softdb_api::api_router(Arc::new(services)))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Walk the `what` and `why` taxonomies and log every subject found.
async fn report(services: &Services) -> anyhow::Result<()> {
  for root in ["what", "why"] {
    let subjects = services
      .subjects
      .get_all_descendant_subjects(root)
      .await
      .with_context(|| format!("failed to resolve descendants of {root:?}"))?;
    info!(root, count = subjects.len(), "descendants");
    for subject in subjects {
      info!(
        root,
        name = %subject.name,
        category = %subject.category,
        parents = ?subject.parents,
        "subject"
      );
    }
  }
  Ok(())
}
