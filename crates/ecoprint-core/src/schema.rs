//! Collection declarations: validators and index sets.
//!
//! Validators are modelled on the subset of MongoDB's `$jsonSchema` the
//! prediction log needs. They serialise to exactly that shape, so a
//! [`Validator`] can be installed on any backend that understands it, and are
//! evaluated in-process by [`crate::validate`] for backends that do not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::VariantNames;

use crate::{
  index::IndexModel,
  record::{Feedback, Metric, Prediction, Rating, Record, RiskLevel},
};

// ─── BSON types ──────────────────────────────────────────────────────────────

/// The `bsonType` keyword values understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BsonType {
  Object,
  Array,
  Double,
  Int,
  Long,
  String,
  Bool,
  Date,
  Null,
}

impl BsonType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Object => "object",
      Self::Array => "array",
      Self::Double => "double",
      Self::Int => "int",
      Self::Long => "long",
      Self::String => "string",
      Self::Bool => "bool",
      Self::Date => "date",
      Self::Null => "null",
    }
  }
}

impl std::fmt::Display for BsonType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── JsonSchema ──────────────────────────────────────────────────────────────

/// A `$jsonSchema` node. Unset keywords impose no constraint; properties that
/// are not declared are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bson_type:  Option<BsonType>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub required:   Vec<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub properties: BTreeMap<String, JsonSchema>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub items:      Option<Box<JsonSchema>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_items:  Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_items:  Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub minimum:    Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maximum:    Option<f64>,
  #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
  pub allowed:    Option<Vec<Value>>,
}

impl JsonSchema {
  pub fn of(bson_type: BsonType) -> Self {
    Self { bson_type: Some(bson_type), ..Self::default() }
  }

  pub fn object() -> Self { Self::of(BsonType::Object) }

  pub fn double() -> Self { Self::of(BsonType::Double) }

  pub fn int() -> Self { Self::of(BsonType::Int) }

  pub fn string() -> Self { Self::of(BsonType::String) }

  pub fn date() -> Self { Self::of(BsonType::Date) }

  /// An array whose every element must satisfy `items`.
  pub fn array(items: JsonSchema) -> Self {
    Self { items: Some(Box::new(items)), ..Self::of(BsonType::Array) }
  }

  pub fn required<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.required.extend(fields.into_iter().map(Into::into));
    self
  }

  pub fn property(mut self, name: impl Into<String>, schema: JsonSchema) -> Self {
    self.properties.insert(name.into(), schema);
    self
  }

  /// Constrain an array to between `min` and `max` items, inclusive.
  pub fn items_between(mut self, min: usize, max: usize) -> Self {
    self.min_items = Some(min);
    self.max_items = Some(max);
    self
  }

  /// Constrain a number to `[min, max]`.
  pub fn range(mut self, min: f64, max: f64) -> Self {
    self.minimum = Some(min);
    self.maximum = Some(max);
    self
  }

  /// Restrict a string to a fixed vocabulary.
  pub fn one_of(mut self, values: &[&str]) -> Self {
    self.allowed = Some(
      values
        .iter()
        .map(|v| Value::String((*v).to_owned()))
        .collect(),
    );
    self
  }
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// A collection validator: `{ "$jsonSchema": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
  #[serde(rename = "$jsonSchema")]
  pub json_schema: JsonSchema,
}

impl From<JsonSchema> for Validator {
  fn from(json_schema: JsonSchema) -> Self { Self { json_schema } }
}

// ─── Collection specs ────────────────────────────────────────────────────────

/// Everything the bootstrapper needs to set up one collection.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
  pub name:      &'static str,
  pub validator: Validator,
  /// Created in order, one `create_index` call each.
  pub indexes:   Vec<IndexModel>,
}

/// The `predictions` collection.
pub fn predictions() -> CollectionSpec {
  let n = Prediction::FEATURE_COUNT;
  let schema = JsonSchema::object()
    .required([
      "features",
      "prediction",
      "class_name",
      "confidence",
      "risk_level",
      "risk_score",
      "timestamp",
    ])
    .property(
      "features",
      JsonSchema::array(JsonSchema::double()).items_between(n, n),
    )
    .property("prediction", JsonSchema::int().range(0.0, 6.0))
    .property("class_name", JsonSchema::string())
    .property("confidence", JsonSchema::double().range(0.0, 1.0))
    .property("risk_level", JsonSchema::string().one_of(RiskLevel::VARIANTS))
    .property("risk_score", JsonSchema::int().range(1.0, 9.0))
    .property("processing_time_ms", JsonSchema::double())
    .property("user_id", JsonSchema::string())
    .property(
      "location",
      JsonSchema::object()
        .property("lat", JsonSchema::double())
        .property("lon", JsonSchema::double()),
    )
    .property("timestamp", JsonSchema::date());

  CollectionSpec {
    name:      Prediction::COLLECTION,
    validator: schema.into(),
    indexes:   vec![
      IndexModel::descending("timestamp"),
      IndexModel::ascending("user_id"),
      IndexModel::ascending("prediction"),
      IndexModel::ascending("risk_level"),
      IndexModel::descending("confidence"),
    ],
  }
}

/// The `feedback` collection.
pub fn feedback() -> CollectionSpec {
  let schema = JsonSchema::object()
    .required(["prediction_id", "feedback_type", "rating", "timestamp"])
    .property("prediction_id", JsonSchema::string())
    .property("feedback_type", JsonSchema::string())
    .property("rating", JsonSchema::string().one_of(Rating::VARIANTS))
    .property("comment", JsonSchema::string())
    .property("user_id", JsonSchema::string())
    .property("timestamp", JsonSchema::date());

  CollectionSpec {
    name:      Feedback::COLLECTION,
    validator: schema.into(),
    indexes:   vec![
      IndexModel::ascending("prediction_id"),
      IndexModel::descending("timestamp"),
      IndexModel::ascending("rating"),
      IndexModel::ascending("user_id"),
    ],
  }
}

/// The `metrics` collection.
pub fn metrics() -> CollectionSpec {
  let schema = JsonSchema::object()
    .required(["timestamp", "metric_type"])
    .property("metric_type", JsonSchema::string())
    .property("data", JsonSchema::object())
    .property("timestamp", JsonSchema::date());

  CollectionSpec {
    name:      Metric::COLLECTION,
    validator: schema.into(),
    indexes:   vec![
      IndexModel::descending("timestamp"),
      IndexModel::ascending("metric_type"),
    ],
  }
}

/// All declared collections, in creation order.
pub fn all() -> [CollectionSpec; 3] { [predictions(), feedback(), metrics()] }
