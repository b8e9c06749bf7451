//! [`initialize`] — the bootstrap sequence.
//!
//! Steps run strictly in order and the first error aborts the run:
//!
//! 1. create every declared collection with its validator,
//! 2. ensure every declared index,
//! 3. optionally insert the sample prediction.
//!
//! Nothing is rolled back on failure.

use std::collections::BTreeMap;

use chrono::Utc;
use ecoprint_core::{
  Namespace,
  record::{Prediction, Record},
  schema,
  store::DocumentStore,
};
use tracing::info;

use crate::{SetupError, seed};

/// Database the collections are created in unless configured otherwise.
pub const DEFAULT_DATABASE: &str = "ensemble_models";

/// Knobs for a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
  pub database:      String,
  /// Leave collections that already exist alone instead of failing.
  pub skip_existing: bool,
  /// Insert the sample prediction after setting up the schema.
  pub seed_sample:   bool,
}

impl Default for BootstrapOptions {
  fn default() -> Self {
    Self {
      database:      DEFAULT_DATABASE.to_owned(),
      skip_existing: false,
      seed_sample:   true,
    }
  }
}

/// What a bootstrap run did.
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
  pub database:  String,
  /// Collections created by this run, in creation order.
  pub created:   Vec<String>,
  /// Collections that already existed and were left untouched.
  pub skipped:   Vec<String>,
  /// Index names ensured, per collection.
  pub indexes:   BTreeMap<String, Vec<String>>,
  /// `_id` of the seeded prediction, if one was inserted.
  pub seeded_id: Option<String>,
}

impl BootstrapReport {
  pub fn index_count(&self) -> usize { self.indexes.values().map(Vec::len).sum() }
}

/// Create the prediction-log collections, their indexes and (optionally) the
/// sample record in `store`.
pub async fn initialize<S: DocumentStore>(
  store: &S,
  options: &BootstrapOptions,
) -> Result<BootstrapReport, SetupError> {
  let specs = schema::all();
  let mut report = BootstrapReport {
    database: options.database.clone(),
    ..BootstrapReport::default()
  };

  let existing = if options.skip_existing {
    store
      .list_collections(options.database.clone())
      .await
      .map_err(|e| SetupError::Store(Box::new(e)))?
  } else {
    Vec::new()
  };

  // ── Collections ───────────────────────────────────────────────────────
  for spec in &specs {
    let ns = Namespace::new(&options.database, spec.name);
    if existing.iter().any(|name| name == spec.name) {
      info!(collection = %ns, "collection exists, skipping");
      report.skipped.push(spec.name.to_owned());
      continue;
    }
    store
      .create_collection(ns.clone(), Some(spec.validator.clone()))
      .await
      .map_err(|e| SetupError::from_store(e, &ns))?;
    info!(collection = %ns, "created collection");
    report.created.push(spec.name.to_owned());
  }

  // ── Indexes ───────────────────────────────────────────────────────────
  for spec in &specs {
    let ns = Namespace::new(&options.database, spec.name);
    let mut names = Vec::with_capacity(spec.indexes.len());
    for index in &spec.indexes {
      let name = store
        .create_index(ns.clone(), index.clone())
        .await
        .map_err(|e| SetupError::from_store(e, &ns))?;
      names.push(name);
    }
    info!(collection = %ns, indexes = ?names, "indexes ensured");
    report.indexes.insert(spec.name.to_owned(), names);
  }

  // ── Seed ──────────────────────────────────────────────────────────────
  if options.seed_sample {
    let ns = Namespace::new(&options.database, Prediction::COLLECTION);
    let document = seed::sample_prediction(Utc::now()).to_document()?;
    let id = store
      .insert_one(ns.clone(), document)
      .await
      .map_err(|e| SetupError::from_store(e, &ns))?;
    info!(collection = %ns, id = %id, "sample prediction inserted");
    report.seeded_id = Some(id);
  }

  Ok(report)
}
