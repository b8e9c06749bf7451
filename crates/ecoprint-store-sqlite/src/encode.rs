//! Encoding helpers between document-store concepts and SQLite.
//!
//! Collection tables are named `"<database>.<collection>"`; index names are
//! prefixed the same way because SQLite index names are global to a schema.
//! Field paths are only ever spliced into SQL after passing [`json_path`],
//! which admits nothing but `[A-Za-z0-9_]` segments joined by dots.

use chrono::{DateTime, Utc};
use ecoprint_core::{
  Namespace,
  index::{IndexKey, IndexModel, SortOrder},
  schema::Validator,
};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Names ───────────────────────────────────────────────────────────────────

/// Database and collection names: non-empty, `[A-Za-z0-9_-]` only.
pub fn check_name(name: &str) -> Result<()> {
  let ok = !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
  if ok { Ok(()) } else { Err(Error::InvalidName(name.to_owned())) }
}

pub fn check_namespace(ns: &Namespace) -> Result<()> {
  check_name(&ns.database)?;
  check_name(&ns.collection)
}

fn quote_ident(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn table_name(ns: &Namespace) -> String {
  quote_ident(&format!("{}.{}", ns.database, ns.collection))
}

pub fn index_name(ns: &Namespace, index: &str) -> String {
  quote_ident(&format!("{}.{}.{}", ns.database, ns.collection, index))
}

// ─── Field paths ─────────────────────────────────────────────────────────────

/// Turn a dotted field path into a SQLite JSON path (`a.b` → `$.a.b`).
pub fn json_path(field: &str) -> Result<String> {
  let valid = !field.is_empty()
    && field.split('.').all(|seg| {
      !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
  if valid {
    Ok(format!("$.{field}"))
  } else {
    Err(Error::InvalidName(field.to_owned()))
  }
}

/// The expression a field is indexed, sorted and filtered on. Must be
/// byte-identical across all three for SQLite to use the index.
pub fn field_expr(field: &str) -> Result<String> {
  Ok(format!("json_extract(doc, '{}')", json_path(field)?))
}

pub fn key_expr(key: &IndexKey) -> Result<String> {
  let direction = match key.order {
    SortOrder::Ascending => "ASC",
    SortOrder::Descending => "DESC",
  };
  Ok(format!("{} {direction}", field_expr(&key.field)?))
}

// ─── DDL ─────────────────────────────────────────────────────────────────────

pub fn create_table_sql(ns: &Namespace) -> String {
  format!(
    "CREATE TABLE {} (
       seq INTEGER PRIMARY KEY AUTOINCREMENT,
       id  TEXT NOT NULL UNIQUE,
       doc TEXT NOT NULL
     )",
    table_name(ns)
  )
}

pub fn create_index_sql(ns: &Namespace, model: &IndexModel) -> Result<String> {
  if model.keys.is_empty() {
    return Err(Error::EmptyIndex(model.name.clone()));
  }
  let keys = model
    .keys
    .iter()
    .map(key_expr)
    .collect::<Result<Vec<_>>>()?
    .join(", ");
  Ok(format!(
    "CREATE INDEX IF NOT EXISTS {} ON {} ({keys})",
    index_name(ns, &model.name),
    table_name(ns)
  ))
}

// ─── Validators and index models ─────────────────────────────────────────────

pub fn encode_validator(v: &Validator) -> Result<String> {
  Ok(serde_json::to_string(v)?)
}

pub fn decode_validator(s: &str) -> Result<Validator> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_keys(keys: &[IndexKey]) -> Result<String> {
  Ok(serde_json::to_string(keys)?)
}

/// Raw strings read directly from an `indexes` row.
pub struct RawIndex {
  pub name: String,
  pub keys: String,
}

impl RawIndex {
  pub fn into_model(self) -> Result<IndexModel> {
    Ok(IndexModel { name: self.name, keys: serde_json::from_str(&self.keys)? })
  }
}

// ─── Document values ─────────────────────────────────────────────────────────

/// Encode a `_id` value as the text stored in the `id` column. The JSON text
/// keeps the type, so `5` and `"5"` are distinct keys.
pub fn encode_id(id: &Value) -> String { id.to_string() }

/// The `_id` as reported to callers: strings bare, anything else as JSON.
pub fn display_id(id: &Value) -> String {
  match id {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// The SQL value `json_extract` yields for a JSON value, for use as a bound
/// comparison parameter.
pub fn sql_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
  }
}
