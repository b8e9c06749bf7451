//! Record types: the three append-only logs of the prediction service.
//!
//! Records are written by producers outside this workspace; the types here
//! describe what a conforming document looks like and give producers a typed
//! way to build one. The validators in [`crate::schema`] are derived from the
//! same vocabulary, so the two cannot drift apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Document, Error, Result};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// Coarse risk classification attached to a prediction.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
}

/// A user's rating of a prediction.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rating {
  VeryPoor,
  Poor,
  Average,
  Good,
  Excellent,
}

/// The forest cover classes a prediction index refers to.
///
/// The validator keeps `class_name` a free-form string; this type only gives
/// producers the canonical labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverType {
  SpruceFir,
  LodgepolePine,
  PonderosaPine,
  CottonwoodWillow,
  Aspen,
  DouglasFir,
  Krummholz,
}

impl CoverType {
  pub const ALL: [Self; 7] = [
    Self::SpruceFir,
    Self::LodgepolePine,
    Self::PonderosaPine,
    Self::CottonwoodWillow,
    Self::Aspen,
    Self::DouglasFir,
    Self::Krummholz,
  ];

  /// The class index stored in `prediction`.
  pub fn index(self) -> i32 {
    match self {
      Self::SpruceFir => 0,
      Self::LodgepolePine => 1,
      Self::PonderosaPine => 2,
      Self::CottonwoodWillow => 3,
      Self::Aspen => 4,
      Self::DouglasFir => 5,
      Self::Krummholz => 6,
    }
  }

  /// The label stored in `class_name`.
  pub fn label(self) -> &'static str {
    match self {
      Self::SpruceFir => "Spruce/Fir",
      Self::LodgepolePine => "Lodgepole Pine",
      Self::PonderosaPine => "Ponderosa Pine",
      Self::CottonwoodWillow => "Cottonwood/Willow",
      Self::Aspen => "Aspen",
      Self::DouglasFir => "Douglas-fir",
      Self::Krummholz => "Krummholz",
    }
  }

  pub fn from_index(index: i32) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|c| c.index() == index)
      .ok_or(Error::UnknownClass(index))
  }
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// A record kind that lives in a named collection.
pub trait Record: Serialize {
  /// Name of the collection the record is written to.
  const COLLECTION: &'static str;

  /// Serialise into the document shape stored in the collection.
  fn to_document(&self) -> Result<Document> {
    match serde_json::to_value(self)? {
      serde_json::Value::Object(map) => Ok(map),
      _ => Err(Error::NotAnObject),
    }
  }
}

// ─── Prediction ──────────────────────────────────────────────────────────────

/// Where a prediction was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub lat: f64,
  pub lon: f64,
}

/// One model output, logged when a prediction is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  /// Model input vector; always [`Prediction::FEATURE_COUNT`] long.
  pub features:           Vec<f64>,
  /// Class index in `0..=6`.
  pub prediction:         i32,
  pub class_name:         String,
  /// In `[0, 1]`.
  pub confidence:         f64,
  pub risk_level:         RiskLevel,
  /// In `1..=9`.
  pub risk_score:         i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub processing_time_ms: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location:           Option<Location>,
  #[serde(with = "crate::date")]
  pub timestamp:          DateTime<Utc>,
}

impl Prediction {
  pub const FEATURE_COUNT: usize = 54;

  /// Build a prediction for `class`, checking the feature vector length.
  /// Optional fields start empty.
  pub fn new(
    features: Vec<f64>,
    class: CoverType,
    confidence: f64,
    risk_level: RiskLevel,
    risk_score: i32,
    timestamp: DateTime<Utc>,
  ) -> Result<Self> {
    if features.len() != Self::FEATURE_COUNT {
      return Err(Error::FeatureCount {
        expected: Self::FEATURE_COUNT,
        actual:   features.len(),
      });
    }
    Ok(Self {
      features,
      prediction: class.index(),
      class_name: class.label().to_owned(),
      confidence,
      risk_level,
      risk_score,
      processing_time_ms: None,
      user_id: None,
      location: None,
      timestamp,
    })
  }
}

impl Record for Prediction {
  const COLLECTION: &'static str = "predictions";
}

// ─── Feedback ────────────────────────────────────────────────────────────────

/// A user's verdict on an earlier prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
  /// `_id` of the prediction this refers to. Not enforced by the store.
  pub prediction_id: String,
  pub feedback_type: String,
  pub rating:        Rating,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id:       Option<String>,
  #[serde(with = "crate::date")]
  pub timestamp:     DateTime<Utc>,
}

impl Record for Feedback {
  const COLLECTION: &'static str = "feedback";
}

// ─── Metric ──────────────────────────────────────────────────────────────────

/// A free-form operational measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
  pub metric_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:        Option<Document>,
  #[serde(with = "crate::date")]
  pub timestamp:   DateTime<Utc>,
}

impl Record for Metric {
  const COLLECTION: &'static str = "metrics";
}
