//! One [`Repository`](intake_core::Repository) implementation per entity.

mod community;
mod country;
mod custody;
mod immigrant;
mod legal;
mod provider;

pub use community::CommunityRepository;
pub use country::CountryRepository;
pub use custody::CustodyRepository;
pub use immigrant::ImmigrantRepository;
pub use legal::LegalRepository;
pub use provider::ServiceProviderRepository;

use intake_core::Value;

/// Append an optional single-column equality filter and an ordering to a
/// base `SELECT`.
fn filtered(
  base: &str,
  column: &str,
  value: Option<Value>,
  order_by: &str,
) -> (String, Vec<Value>) {
  match value {
    Some(v) => (format!("{base} WHERE {column} = ?1 ORDER BY {order_by}"), vec![v]),
    None => (format!("{base} ORDER BY {order_by}"), Vec::new()),
  }
}
