//! Error types for `ecoprint-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("prediction must carry exactly {expected} features, got {actual}")]
  FeatureCount { expected: usize, actual: usize },

  #[error("class index out of range: {0}")]
  UnknownClass(i32),

  #[error("record did not serialise to a JSON object")]
  NotAnObject,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
