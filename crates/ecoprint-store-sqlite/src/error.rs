//! Error type for `ecoprint-store-sqlite`.

use ecoprint_core::{Namespace, store::StoreError, validate::Violation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ecoprint_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("collection already exists: {0}")]
  CollectionExists(Namespace),

  #[error("collection not found: {0}")]
  CollectionNotFound(Namespace),

  /// The document was rejected by the collection's validator.
  #[error("document failed validation for {namespace}: {}", summarize(.violations))]
  DocumentValidation {
    namespace:  Namespace,
    violations: Vec<Violation>,
  },

  #[error("duplicate _id {id:?} in {namespace}")]
  DuplicateId { namespace: Namespace, id: String },

  #[error("index {0:?} has no keys")]
  EmptyIndex(String),

  /// A database, collection or field name that cannot be used safely.
  #[error("invalid name: {0:?}")]
  InvalidName(String),
}

fn summarize(violations: &[Violation]) -> String {
  violations
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

impl StoreError for Error {
  fn is_collection_conflict(&self) -> bool {
    matches!(self, Self::CollectionExists(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
