//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as
//! `YYYY-MM-DD HH:MM:SS` text (what `datetime('now')` produces). Enumerations
//! are stored as their display text. Flags are stored as `0`/`1` integers.

use std::{error::Error as StdError, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use intake_core::{
  Value,
  record::{DATE_FORMAT, DATETIME_FORMAT},
};
use rusqlite::{
  Row,
  types::{Type, Value as SqlValue, ValueRef},
};

// ─── Parameters ──────────────────────────────────────────────────────────────

pub fn to_sql(v: Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Real(f) => SqlValue::Real(f),
    Value::Text(s) => SqlValue::Text(s),
  }
}

/// Build a `Vec<Value>` of statement parameters from heterogeneous values.
macro_rules! values {
  ($($v:expr),* $(,)?) => {
    vec![$(::intake_core::Value::from($v)),*]
  };
}
pub(crate) use values;

// ─── Result cells ────────────────────────────────────────────────────────────

pub fn from_sql(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(f) => Value::Real(f),
    ValueRef::Text(t) | ValueRef::Blob(t) => {
      Value::Text(String::from_utf8_lossy(t).into_owned())
    }
  }
}

// ─── Typed columns ───────────────────────────────────────────────────────────

fn conversion_error(
  idx: usize,
  e: impl StdError + Send + Sync + 'static,
) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Decode a text column into one of the closed enumerations.
pub fn text_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: StdError + Send + Sync + 'static,
{
  let raw: String = row.get(idx)?;
  raw.parse().map_err(|e| conversion_error(idx, e))
}

pub fn optional_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
  let raw: Option<String> = row.get(idx)?;
  raw
    .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
    .transpose()
    .map_err(|e| conversion_error(idx, e))
}

pub fn datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
  let raw: String = row.get(idx)?;
  NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}
