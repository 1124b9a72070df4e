//! Classification of engine failures into the [`intake_core::Error`]
//! taxonomy.
//!
//! The engine's own message is kept in every variant.

use intake_core::Error;
use rusqlite::{ErrorCode, ffi};

pub(crate) fn classify(e: tokio_rusqlite::Error) -> Error {
  match e {
    tokio_rusqlite::Error::ConnectionClosed => {
      Error::Connection("connection closed".to_string())
    }
    tokio_rusqlite::Error::Close((_, e)) => Error::Connection(e.to_string()),
    tokio_rusqlite::Error::Rusqlite(e) => classify_sqlite(e),
    other => Error::Statement(other.to_string()),
  }
}

pub(crate) fn classify_sqlite(e: rusqlite::Error) -> Error {
  let rusqlite::Error::SqliteFailure(failure, _) = &e else {
    return Error::Statement(e.to_string());
  };

  match failure.code {
    ErrorCode::ConstraintViolation
      if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
    {
      Error::ReferentialIntegrity(e.to_string())
    }
    ErrorCode::CannotOpen
    | ErrorCode::NotADatabase
    | ErrorCode::PermissionDenied
    | ErrorCode::DatabaseBusy
    | ErrorCode::DatabaseLocked
    | ErrorCode::DatabaseCorrupt
    | ErrorCode::SystemIoFailure => Error::Connection(e.to_string()),
    _ => Error::Statement(e.to_string()),
  }
}
