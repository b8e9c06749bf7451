//! In-process evaluation of [`JsonSchema`] validators.
//!
//! Evaluation never stops at the first problem: every violation is collected
//! with the dotted path of the offending value, so a rejected write can be
//! reported in full.

use std::fmt;

use serde_json::Value;

use crate::{
  Document, date,
  schema::{BsonType, JsonSchema, Validator},
};

/// What went wrong at a given path.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
  MissingRequired,
  TypeMismatch { expected: BsonType, found: &'static str },
  TooFewItems { min: usize, len: usize },
  TooManyItems { max: usize, len: usize },
  BelowMinimum { min: f64, value: f64 },
  AboveMaximum { max: f64, value: f64 },
  NotInEnum { value: Value },
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
  /// Dotted path from the document root; empty for the root itself.
  pub path: String,
  pub kind: ViolationKind,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let path = if self.path.is_empty() { "(root)" } else { &self.path };
    match &self.kind {
      ViolationKind::MissingRequired => {
        write!(f, "{path}: required field is missing")
      }
      ViolationKind::TypeMismatch { expected, found } => {
        write!(f, "{path}: expected {expected}, found {found}")
      }
      ViolationKind::TooFewItems { min, len } => {
        write!(f, "{path}: expected at least {min} items, found {len}")
      }
      ViolationKind::TooManyItems { max, len } => {
        write!(f, "{path}: expected at most {max} items, found {len}")
      }
      ViolationKind::BelowMinimum { min, value } => {
        write!(f, "{path}: {value} is below the minimum {min}")
      }
      ViolationKind::AboveMaximum { max, value } => {
        write!(f, "{path}: {value} is above the maximum {max}")
      }
      ViolationKind::NotInEnum { value } => {
        write!(f, "{path}: {value} is not an allowed value")
      }
    }
  }
}

// ─── Type matching ───────────────────────────────────────────────────────────

impl BsonType {
  /// Whether `value` is a JSON encoding of this BSON type.
  pub fn matches(self, value: &Value) -> bool {
    match self {
      Self::Double => matches!(value, Value::Number(n) if n.is_f64()),
      Self::Int => value.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
      Self::Long => value.as_i64().is_some(),
      Self::String => value.is_string(),
      Self::Bool => value.is_boolean(),
      Self::Null => value.is_null(),
      Self::Array => value.is_array(),
      Self::Date => date::is_date(value),
      Self::Object => value.is_object() && !date::is_date(value),
    }
  }
}

/// The BSON-ish name of the type `value` actually has.
fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(n) if n.is_f64() => "double",
    Value::Number(_) => "int",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) if date::is_date(value) => "date",
    Value::Object(_) => "object",
  }
}

fn join(path: &str, segment: &str) -> String {
  if path.is_empty() {
    segment.to_owned()
  } else {
    format!("{path}.{segment}")
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

impl JsonSchema {
  /// Check `value` against this schema.
  pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
    let mut out = Vec::new();
    self.check(value, "", &mut out);
    if out.is_empty() { Ok(()) } else { Err(out) }
  }

  fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
    if let Some(expected) = self.bson_type
      && !expected.matches(value)
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::TypeMismatch { expected, found: type_name(value) },
      });
      return;
    }

    if let Some(allowed) = &self.allowed
      && !allowed.contains(value)
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::NotInEnum { value: value.clone() },
      });
    }

    match value {
      Value::Number(n) => {
        if let Some(v) = n.as_f64() {
          self.check_bounds(v, path, out);
        }
      }
      Value::Array(items) => self.check_items(items, path, out),
      Value::Object(map) if !date::is_date(value) => {
        self.check_object(map, path, out);
      }
      _ => {}
    }
  }

  fn check_bounds(&self, value: f64, path: &str, out: &mut Vec<Violation>) {
    if let Some(min) = self.minimum
      && value < min
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::BelowMinimum { min, value },
      });
    }
    if let Some(max) = self.maximum
      && value > max
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::AboveMaximum { max, value },
      });
    }
  }

  fn check_items(&self, items: &[Value], path: &str, out: &mut Vec<Violation>) {
    let len = items.len();
    if let Some(min) = self.min_items
      && len < min
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::TooFewItems { min, len },
      });
    }
    if let Some(max) = self.max_items
      && len > max
    {
      out.push(Violation {
        path: path.to_owned(),
        kind: ViolationKind::TooManyItems { max, len },
      });
    }
    if let Some(schema) = &self.items {
      for (i, item) in items.iter().enumerate() {
        schema.check(item, &join(path, &i.to_string()), out);
      }
    }
  }

  fn check_object(&self, map: &Document, path: &str, out: &mut Vec<Violation>) {
    for field in &self.required {
      if !map.contains_key(field) {
        out.push(Violation {
          path: join(path, field),
          kind: ViolationKind::MissingRequired,
        });
      }
    }
    for (name, schema) in &self.properties {
      if let Some(v) = map.get(name) {
        schema.check(v, &join(path, name), out);
      }
    }
  }
}

impl Validator {
  /// Check a top-level document against the validator.
  pub fn validate_document(&self, doc: &Document) -> Result<(), Vec<Violation>> {
    let mut out = Vec::new();
    let schema = &self.json_schema;
    if let Some(expected) = schema.bson_type
      && expected != BsonType::Object
    {
      out.push(Violation {
        path: String::new(),
        kind: ViolationKind::TypeMismatch { expected, found: "object" },
      });
    } else {
      schema.check_object(doc, "", &mut out);
    }
    if out.is_empty() { Ok(()) } else { Err(out) }
  }
}
