//! Core types and trait definitions for the immigrant-integration case store.
//!
//! This crate is deliberately free of database dependencies. It holds the
//! entity types of both schemas, their validated input structs, the tabular
//! result types, the report catalogue and the error taxonomy.

pub mod dashboard;
pub mod desktop;
pub mod error;
pub mod record;
pub mod report;
pub mod repository;
pub mod validate;

pub use error::{Error, Result};
pub use record::{Record, Value};
pub use report::Report;
pub use repository::Repository;
pub use validate::Validate;
