//! Error taxonomy shared by every layer of the intake workspace.
//!
//! Validation errors are raised before any statement reaches the database.
//! Everything else is produced by a storage backend, which classifies the
//! engine's failure into one of these kinds and keeps the engine message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database could not be reached, opened, or has gone away.
  #[error("connection error: {0}")]
  Connection(String),

  /// A client-supplied field was missing or malformed.
  #[error("invalid value for '{field}': {reason}")]
  Validation { field: &'static str, reason: String },

  /// A foreign-key reference did not resolve, or a referenced row is still
  /// in use by the engine's constraints.
  #[error("referential integrity violation: {0}")]
  ReferentialIntegrity(String),

  /// A business rule blocks the operation because dependents exist.
  #[error("cannot delete {entity} {id}: {dependents} dependent record(s) exist")]
  Dependency {
    entity:     &'static str,
    id:         i64,
    dependents: i64,
  },

  /// The engine rejected the statement (constraint, syntax, type).
  #[error("statement failed: {0}")]
  Statement(String),

  /// One step of a multi-table delete failed; nothing was removed.
  #[error("cascade delete failed at {step}: {message}")]
  CascadeDelete { step: &'static str, message: String },

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: i64 },
}

impl Error {
  pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Validation { field, reason: reason.into() }
  }

  pub fn not_found(entity: &'static str, id: i64) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
