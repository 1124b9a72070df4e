//! The `Repository` trait shared by every entity repository.
//!
//! Storage backends implement it once per entity. Front-ends depend on this
//! abstraction and on the typed inputs in [`crate::dashboard`] and
//! [`crate::desktop`], never on query text.

use std::future::Future;

use crate::Result;

/// Create/read/update/delete access to one entity table.
///
/// `create` and `update` validate their input before issuing any statement.
/// `update` replaces every editable field; there is no partial merge.
/// Deletes are physical.
pub trait Repository: Send + Sync {
  /// Stored row.
  type Entity: Send;
  /// Input for `create`.
  type New: Send;
  /// Editable fields for `update`.
  type Changes: Send;
  /// Optional single-column equality filter for `list`.
  type Filter: Default + Send;

  /// Human-readable entity name used in errors.
  const ENTITY: &'static str;

  /// Insert a row and return its generated id.
  fn create(&self, input: Self::New) -> impl Future<Output = Result<i64>> + Send + '_;

  fn list(
    &self,
    filter: Self::Filter,
  ) -> impl Future<Output = Result<Vec<Self::Entity>>> + Send + '_;

  /// Fetch one row; `Error::NotFound` if the id is unknown.
  fn get(&self, id: i64) -> impl Future<Output = Result<Self::Entity>> + Send + '_;

  fn update(
    &self,
    id: i64,
    changes: Self::Changes,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn delete(&self, id: i64) -> impl Future<Output = Result<()>> + Send + '_;
}
