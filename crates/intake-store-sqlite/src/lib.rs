//! SQLite backend for the intake case store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. A [`ConnectionProvider`] owns the one
//! connection, [`Database`] executes statements on it, and [`SqliteStore`]
//! hands out the entity repositories and the analytics set built on top.

mod encode;
mod error;
mod lookup;
mod maintenance;
mod repos;
mod schema;
mod store;

pub mod analytics;
pub mod config;
pub mod connection;
pub mod db;

pub use analytics::Analytics;
pub use config::DbConfig;
pub use connection::ConnectionProvider;
pub use db::{Database, FromRow};
pub use lookup::{LookupCache, LookupTables};
pub use maintenance::SequenceTable;
pub use repos::{
  CommunityRepository, CountryRepository, CustodyRepository, ImmigrantRepository,
  LegalRepository, ServiceProviderRepository,
};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
