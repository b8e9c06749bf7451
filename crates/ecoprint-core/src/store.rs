//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `ecoprint-store-sqlite`). The bootstrapper depends on this abstraction, not
//! on any concrete backend.

use std::{fmt, future::Future};

use serde_json::Value;

use crate::{
  index::{IndexKey, IndexModel, SortOrder},
  schema::Validator,
};

/// A stored document: a JSON object. `_id` is assigned on insert if absent.
pub type Document = serde_json::Map<String, Value>;

/// The field holding a document's identity.
pub const ID_FIELD: &str = "_id";

// ─── Namespace ───────────────────────────────────────────────────────────────

/// Address of a collection: `database.collection`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
  pub database:   String,
  pub collection: String,
}

impl Namespace {
  pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
    Self { database: database.into(), collection: collection.into() }
  }
}

impl fmt::Display for Namespace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.database, self.collection)
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DocumentStore::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
  /// Every `(field, value)` pair must match exactly.
  pub filter: Vec<(String, Value)>,
  /// Applied in order; insertion order breaks remaining ties.
  pub sort:   Vec<IndexKey>,
  pub limit:  Option<usize>,
}

impl FindOptions {
  pub fn new() -> Self { Self::default() }

  pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filter.push((field.into(), value.into()));
    self
  }

  pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
    self.sort.push(IndexKey { field: field.into(), order });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors must be classifiable so callers can react to a collection
/// that already exists without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the error reports that the collection already exists.
  fn is_collection_conflict(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document database backend.
///
/// Documents are append-only from the point of view of this trait: there are
/// no update or delete operations.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait DocumentStore: Send + Sync {
  type Error: StoreError;

  // ── Collections ───────────────────────────────────────────────────────

  /// Create a collection, optionally guarded by a validator.
  ///
  /// Fails if the collection already exists; the error reports
  /// [`StoreError::is_collection_conflict`].
  fn create_collection(
    &self,
    ns: Namespace,
    validator: Option<Validator>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Names of the collections in `database`, sorted.
  fn list_collections(
    &self,
    database: String,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// The validator installed on a collection, if any.
  fn collection_validator(
    &self,
    ns: Namespace,
  ) -> impl Future<Output = Result<Option<Validator>, Self::Error>> + Send + '_;

  // ── Indexes ───────────────────────────────────────────────────────────

  /// Create an index and return its name. Creating an index whose name
  /// already exists on the collection is a no-op.
  fn create_index(
    &self,
    ns: Namespace,
    model: IndexModel,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// All indexes on a collection, including the implicit `_id_` index.
  fn list_indexes(
    &self,
    ns: Namespace,
  ) -> impl Future<Output = Result<Vec<IndexModel>, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Validate and insert a document, returning its `_id`.
  fn insert_one(
    &self,
    ns: Namespace,
    document: Document,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Documents matching `options`. A collection that does not exist yields
  /// no documents.
  fn find<'a>(
    &'a self,
    ns: Namespace,
    options: &'a FindOptions,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  fn count_documents(
    &self,
    ns: Namespace,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
