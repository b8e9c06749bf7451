//! The sample prediction inserted at the end of a bootstrap run.

use chrono::{DateTime, Utc};
use ecoprint_core::record::{CoverType, Location, Prediction, RiskLevel};

/// `user_id` of the seeded record.
pub const SAMPLE_USER_ID: &str = "system_init";

/// The leading, non-zero features of the sample; the remaining entries up to
/// [`Prediction::FEATURE_COUNT`] are zero.
pub const SAMPLE_LEADING_FEATURES: [f64; 10] = [
  2000.0, 180.0, 15.0, 300.0, 50.0, 1000.0, 200.0, 220.0, 180.0, 2000.0,
];

pub fn sample_features() -> Vec<f64> {
  let mut features = SAMPLE_LEADING_FEATURES.to_vec();
  features.resize(Prediction::FEATURE_COUNT, 0.0);
  features
}

/// A high-risk Lodgepole Pine prediction stamped at `timestamp`.
pub fn sample_prediction(timestamp: DateTime<Utc>) -> Prediction {
  let class = CoverType::LodgepolePine;
  Prediction {
    features: sample_features(),
    prediction: class.index(),
    class_name: class.label().to_owned(),
    confidence: 0.95,
    risk_level: RiskLevel::High,
    risk_score: 8,
    processing_time_ms: Some(45.2),
    user_id: Some(SAMPLE_USER_ID.to_owned()),
    location: Some(Location { lat: 40.7128, lon: -74.0060 }),
    timestamp,
  }
}
