//! Error type for `ecoprint-bootstrap`.

use ecoprint_core::{Namespace, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
  /// A collection the bootstrapper was about to create already exists.
  #[error("collection already exists: {0}")]
  CollectionConflict(Namespace),

  #[error("seed record error: {0}")]
  Seed(#[from] ecoprint_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SetupError {
  /// Classify a backend error raised while working on `ns`.
  pub fn from_store<E: StoreError>(err: E, ns: &Namespace) -> Self {
    if err.is_collection_conflict() {
      Self::CollectionConflict(ns.clone())
    } else {
      Self::Store(Box::new(err))
    }
  }
}
