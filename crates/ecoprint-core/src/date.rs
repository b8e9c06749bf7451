//! Extended-JSON dates.
//!
//! Documents are plain JSON, which has no date type. Timestamps are therefore
//! wrapped as `{"$date": "<RFC 3339>"}`, the same shape MongoDB's extended JSON
//! uses. The string is always UTC with microsecond precision and a `Z` suffix,
//! so lexical order of the wrapper equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, ser::SerializeMap};
use serde_json::Value;

/// The single key of a date wrapper object.
pub const DATE_KEY: &str = "$date";

pub fn encode(dt: &DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Wrap `dt` as an extended-JSON date value.
pub fn to_value(dt: &DateTime<Utc>) -> Value {
  let mut map = serde_json::Map::with_capacity(1);
  map.insert(DATE_KEY.to_owned(), Value::String(encode(dt)));
  Value::Object(map)
}

/// Unwrap an extended-JSON date. Returns `None` for anything that is not a
/// single-key `$date` object holding a valid RFC 3339 string.
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
  let map = value.as_object()?;
  if map.len() != 1 {
    return None;
  }
  let raw = map.get(DATE_KEY)?.as_str()?;
  DateTime::parse_from_rfc3339(raw)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

pub fn is_date(value: &Value) -> bool { from_value(value).is_some() }

/// Rewrite every date wrapper inside `value` into the canonical form produced
/// by [`to_value`]. RFC 3339 admits offsets and any fraction width; only the
/// canonical text sorts chronologically.
pub fn canonicalize(value: &mut Value) {
  if let Some(dt) = from_value(value) {
    *value = to_value(&dt);
    return;
  }
  match value {
    Value::Array(items) => items.iter_mut().for_each(canonicalize),
    Value::Object(map) => map.values_mut().for_each(canonicalize),
    _ => {}
  }
}

// ─── serde `with` adapter ────────────────────────────────────────────────────

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  let mut map = serializer.serialize_map(Some(1))?;
  map.serialize_entry(DATE_KEY, &encode(dt))?;
  map.end()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  struct Wrapper {
    #[serde(rename = "$date")]
    date: DateTime<Utc>,
  }

  Ok(Wrapper::deserialize(deserializer)?.date)
}
