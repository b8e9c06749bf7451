//! Runtime configuration for `ecoprint-init`.
//!
//! Sources are layered, later ones winning: an optional TOML file, then
//! `ECOPRINT_*` environment variables, then whatever overrides the caller adds
//! to the [`builder`](BootstrapConfig::builder) (the binary adds its flags).

use std::path::{Path, PathBuf};

use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;

use crate::bootstrap::{BootstrapOptions, DEFAULT_DATABASE};

/// Deserialised configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
  /// SQLite file holding the document store; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  #[serde(default = "default_database")]
  pub database:      String,
  #[serde(default)]
  pub skip_existing: bool,
  #[serde(default = "default_seed_sample")]
  pub seed_sample:   bool,
}

fn default_store_path() -> PathBuf { PathBuf::from("ecoprint.db") }

fn default_database() -> String { DEFAULT_DATABASE.to_owned() }

fn default_seed_sample() -> bool { true }

impl BootstrapConfig {
  pub const ENV_PREFIX: &'static str = "ECOPRINT";

  /// File and environment sources; the file may be absent.
  pub fn builder(path: &Path) -> ConfigBuilder<DefaultState> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(Self::ENV_PREFIX))
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(Self::builder(path))
  }

  pub fn options(&self) -> BootstrapOptions {
    BootstrapOptions {
      database:      self.database.clone(),
      skip_existing: self.skip_existing,
      seed_sample:   self.seed_sample,
    }
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
