//! `ecoprint-init` — one-shot schema bootstrap for the prediction log.
//!
//! Reads `bootstrap.toml` (or the path given with `--config`), opens the
//! SQLite document store and creates the `predictions`, `feedback` and
//! `metrics` collections with their validators and indexes.
//!
//! ```text
//! ecoprint-init --store ~/ecoprint.db --database ensemble_models
//! ECOPRINT_SEED_SAMPLE=false ecoprint-init
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use ecoprint_bootstrap::{BootstrapConfig, initialize};
use ecoprint_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Initialise the EcoPrint prediction-log database")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "bootstrap.toml")]
  config: PathBuf,

  /// SQLite file holding the document store.
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,

  /// Target database name.
  #[arg(long)]
  database: Option<String>,

  /// Leave existing collections alone instead of failing.
  #[arg(long)]
  skip_existing: bool,

  /// Do not insert the sample prediction.
  #[arg(long)]
  no_seed: bool,
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

  // Load configuration; flags override file and environment.
  let builder = BootstrapConfig::builder(&cli.config)
    .set_override_option(
      "store_path",
      cli.store.map(|p| p.to_string_lossy().into_owned()),
    )?
    .set_override_option("database", cli.database)?
    .set_override_option("skip_existing", cli.skip_existing.then_some(true))?
    .set_override_option("seed_sample", cli.no_seed.then_some(false))?;

  let cfg = BootstrapConfig::from_builder(builder)
    .context("failed to read configuration")?;

  let store_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let report = initialize(&store, &cfg.options())
    .await
    .with_context(|| format!("failed to initialise database {:?}", cfg.database))?;

  println!("Database initialised: {}", report.database);
  if !report.created.is_empty() {
    println!("Collections created: {}", report.created.join(", "));
  }
  if !report.skipped.is_empty() {
    println!("Collections skipped (already present): {}", report.skipped.join(", "));
  }
  println!("Indexes ensured: {}", report.index_count());
  if let Some(id) = &report.seeded_id {
    println!("Sample prediction inserted: {id}");
  }

  Ok(())
}
