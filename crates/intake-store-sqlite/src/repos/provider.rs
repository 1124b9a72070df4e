use intake_core::{
  Error, Repository, Result, Validate,
  dashboard::{NewServiceProvider, ServiceProvider, ServiceProviderChanges, ServiceProviderFilter},
};
use rusqlite::Row;

use crate::{
  db::{Database, FromRow},
  encode::values,
};

const COLUMNS: &str = "p.provider_id, p.name, p.provider_type, p.community_id, p.zip_code, \
                       p.capacity_per_week, p.accepts_pro_bono";

impl FromRow for ServiceProvider {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(ServiceProvider {
      provider_id:       row.get(0)?,
      name:              row.get(1)?,
      provider_type:     row.get(2)?,
      community_id:      row.get(3)?,
      zip_code:          row.get(4)?,
      capacity_per_week: row.get(5)?,
      accepts_pro_bono:  row.get(6)?,
    })
  }
}

#[derive(Clone)]
pub struct ServiceProviderRepository {
  db: Database,
}

impl ServiceProviderRepository {
  pub fn new(db: Database) -> Self { Self { db } }
}

impl Repository for ServiceProviderRepository {
  type Entity = ServiceProvider;
  type New = NewServiceProvider;
  type Changes = ServiceProviderChanges;
  type Filter = ServiceProviderFilter;

  const ENTITY: &'static str = "service provider";

  /// Fails with `ReferentialIntegrity` if the community does not exist.
  async fn create(&self, input: NewServiceProvider) -> Result<i64> {
    let p = input.validate()?;
    self
      .db
      .insert(
        "INSERT INTO service_providers
           (name, provider_type, community_id, zip_code, capacity_per_week, accepts_pro_bono)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        values![
          p.name,
          p.provider_type,
          p.community_id,
          p.zip_code,
          p.capacity_per_week,
          p.accepts_pro_bono,
        ],
      )
      .await
  }

  /// Ordered by the community's state, then provider name.
  async fn list(&self, filter: ServiceProviderFilter) -> Result<Vec<ServiceProvider>> {
    let provider_type = filter
      .provider_type
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty());
    let (sql, params) = super::filtered(
      &format!(
        "SELECT {COLUMNS} FROM service_providers p
         JOIN communities c ON c.community_id = p.community_id"
      ),
      "p.provider_type",
      provider_type.map(Into::into),
      "c.state_code, p.name",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<ServiceProvider> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM service_providers p WHERE p.provider_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  async fn update(&self, id: i64, changes: ServiceProviderChanges) -> Result<()> {
    let p = changes.validate()?;
    let touched = self
      .db
      .execute_affected(
        "UPDATE service_providers
         SET name = ?1, provider_type = ?2, capacity_per_week = ?3, accepts_pro_bono = ?4
         WHERE provider_id = ?5",
        values![p.name, p.provider_type, p.capacity_per_week, p.accepts_pro_bono, id],
      )
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let touched = self
      .db
      .execute_affected("DELETE FROM service_providers WHERE provider_id = ?1", values![id])
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }
}
