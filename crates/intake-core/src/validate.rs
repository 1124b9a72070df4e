//! Client-side validation applied to every input struct before a statement
//! is issued.
//!
//! Input structs implement [`Validate`], which checks and normalises them in
//! one pass (trimming text, upper-casing state codes). The free functions are
//! the field-level rules they are built from.

use chrono::NaiveDate;

use crate::{Error, Result, record::DATE_FORMAT};

/// Form hints that must never be stored as real values.
const HINT_PREFIXES: [&str; 3] = ["e.g.", "i.e.", "Select"];

/// Check and normalise an input, returning the value to persist.
pub trait Validate: Sized {
  fn validate(self) -> Result<Self>;
}

/// A non-empty, non-placeholder text field. Returns the trimmed value.
pub fn required_text(field: &'static str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(field, "a value is required"));
  }
  if HINT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
    return Err(Error::validation(
      field,
      format!("{trimmed:?} looks like placeholder text"),
    ));
  }
  Ok(trimmed.to_owned())
}

/// Parse an optional `YYYY-MM-DD` date. Empty input and `None` (any case)
/// mean "no date".
pub fn optional_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
  let trimmed = value.trim();
  if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
    return Ok(None);
  }
  required_text(field, trimmed)?;
  NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
    .map(Some)
    .map_err(|e| Error::validation(field, format!("expected YYYY-MM-DD: {e}")))
}

pub fn zip_code(value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.len() != 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::validation("zip_code", "expected exactly 5 digits"));
  }
  Ok(trimmed.to_owned())
}

/// Two ASCII letters, stored upper-case.
pub fn state_code(value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.len() != 2 || !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
    return Err(Error::validation("state_code", "expected a 2-letter code"));
  }
  Ok(trimmed.to_ascii_uppercase())
}

pub fn percentage(field: &'static str, value: f64) -> Result<f64> {
  if !value.is_finite() || !(0.0..=100.0).contains(&value) {
    return Err(Error::validation(field, format!("{value} is outside 0..=100")));
  }
  Ok(value)
}

pub fn non_negative(field: &'static str, value: i64) -> Result<i64> {
  if value < 0 {
    return Err(Error::validation(field, format!("{value} is negative")));
  }
  Ok(value)
}

/// A field fixed at creation may be echoed back by a form, but only with its
/// stored value.
pub fn unchanged(field: &'static str, given: Option<&str>, stored: &str) -> Result<()> {
  match given.map(str::trim) {
    Some(given) if given != stored => Err(Error::validation(
      field,
      format!("{field} is fixed at {stored:?}; got {given:?}"),
    )),
    _ => Ok(()),
  }
}

pub fn quarter(value: u8) -> Result<u8> {
  if !(1..=4).contains(&value) {
    return Err(Error::validation("quarter", format!("{value} is not in 1..=4")));
  }
  Ok(value)
}
