//! Tabular results: an ordered sequence of named-field records.
//!
//! Reports and ad-hoc selects hand these to the presentation layer as-is.
//! Column order and row order are exactly what the engine returned.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer, ser::SerializeMap};

/// Text form of dates in every cell, parameter and form field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Text form of timestamps; what SQL `datetime('now')` produces.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single cell, mirroring the storage classes a SQL engine hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  /// Numeric view of the cell; integers widen to `f64`.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Integer(i) => Some(*i as f64),
      Self::Real(f) => Some(*f),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self { Self::Integer(v.into()) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Integer(v.into()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<NaiveDate> for Value {
  fn from(v: NaiveDate) -> Self { Self::Text(v.format(DATE_FORMAT).to_string()) }
}

impl From<NaiveDateTime> for Value {
  fn from(v: NaiveDateTime) -> Self {
    Self::Text(v.format(DATETIME_FORMAT).to_string())
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One result row. Serialises as a JSON object whose keys keep column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
  fields: Vec<(String, Value)>,
}

impl Record {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, column: impl Into<String>, value: Value) {
    self.fields.push((column.into(), value));
  }

  /// Look up a cell by column name. The first matching column wins.
  pub fn get(&self, column: &str) -> Option<&Value> {
    self
      .fields
      .iter()
      .find(|(name, _)| name == column)
      .map(|(_, v)| v)
  }

  pub fn columns(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|(name, _)| name.as_str())
  }

  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.fields.iter().map(|(_, v)| v)
  }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl FromIterator<(String, Value)> for Record {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    Self { fields: iter.into_iter().collect() }
  }
}

impl Serialize for Record {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.fields.len()))?;
    for (name, value) in &self.fields {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}
