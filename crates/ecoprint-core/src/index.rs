//! Index models.
//!
//! An index is an ordered list of `(field, direction)` keys. Its name follows
//! the MongoDB convention: each key renders as `<field>_<1|-1>` and keys are
//! joined with `_`, so `{ timestamp: -1 }` is named `timestamp_-1`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the index every collection carries on `_id`.
pub const PRIMARY_INDEX_NAME: &str = "_id_";

/// Sort direction of an index key; serialised as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum SortOrder {
  Ascending,
  Descending,
}

impl From<SortOrder> for i8 {
  fn from(order: SortOrder) -> Self {
    match order {
      SortOrder::Ascending => 1,
      SortOrder::Descending => -1,
    }
  }
}

impl TryFrom<i8> for SortOrder {
  type Error = String;

  fn try_from(value: i8) -> Result<Self, Self::Error> {
    match value {
      1 => Ok(Self::Ascending),
      -1 => Ok(Self::Descending),
      other => Err(format!("sort direction must be 1 or -1, got {other}")),
    }
  }
}

impl fmt::Display for SortOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", i8::from(*self))
  }
}

/// One field of an index or sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexKey {
  /// Dotted field path, e.g. `location.lat`.
  pub field: String,
  pub order: SortOrder,
}

impl IndexKey {
  pub fn ascending(field: impl Into<String>) -> Self {
    Self { field: field.into(), order: SortOrder::Ascending }
  }

  pub fn descending(field: impl Into<String>) -> Self {
    Self { field: field.into(), order: SortOrder::Descending }
  }
}

/// A named index over one or more keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
  pub name: String,
  pub keys: Vec<IndexKey>,
}

impl IndexModel {
  /// Build an index over `keys`, deriving its conventional name.
  pub fn new(keys: Vec<IndexKey>) -> Self {
    let name = keys
      .iter()
      .map(|k| format!("{}_{}", k.field, k.order))
      .collect::<Vec<_>>()
      .join("_");
    Self { name, keys }
  }

  pub fn ascending(field: impl Into<String>) -> Self {
    Self::new(vec![IndexKey::ascending(field)])
  }

  pub fn descending(field: impl Into<String>) -> Self {
    Self::new(vec![IndexKey::descending(field)])
  }

  /// The implicit unique index on `_id`.
  pub fn primary() -> Self {
    Self {
      name: PRIMARY_INDEX_NAME.to_owned(),
      keys: vec![IndexKey::ascending("_id")],
    }
  }
}
