use std::sync::Arc;

use intake_core::{
  Error, Repository, Result, Validate,
  desktop::{Country, CountryDetails, CountryFilter},
};
use rusqlite::Row;
use tracing::warn;

use crate::{
  db::{Database, FromRow},
  encode::values,
  lookup::LookupCache,
};

const COLUMNS: &str = "country_id, country_name, region, population_migrants, major_language";

impl FromRow for Country {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Country {
      country_id:          row.get(0)?,
      country_name:        row.get(1)?,
      region:              row.get(2)?,
      population_migrants: row.get(3)?,
      major_language:      row.get(4)?,
    })
  }
}

#[derive(Clone)]
pub struct CountryRepository {
  db:      Database,
  lookups: Arc<LookupCache>,
}

impl CountryRepository {
  pub fn new(db: Database, lookups: Arc<LookupCache>) -> Self { Self { db, lookups } }

  /// Number of immigrants that reference the country.
  pub async fn dependents(&self, id: i64) -> Result<i64> {
    Ok(
      self
        .db
        .select_one_as::<i64>(
          "SELECT COUNT(*) FROM immigrants WHERE country_id = ?1",
          values![id],
        )
        .await?
        .unwrap_or(0),
    )
  }
}

impl Repository for CountryRepository {
  type Entity = Country;
  type New = CountryDetails;
  type Changes = CountryDetails;
  type Filter = CountryFilter;

  const ENTITY: &'static str = "country";

  /// A duplicate `country_name` is rejected by the engine's unique index.
  async fn create(&self, input: CountryDetails) -> Result<i64> {
    let c = input.validate()?;
    let id = self
      .db
      .insert(
        "INSERT INTO country_of_origin
           (country_name, region, population_migrants, major_language)
         VALUES (?1, ?2, ?3, ?4)",
        values![c.country_name, c.region, c.population_migrants, c.major_language],
      )
      .await?;
    self.lookups.invalidate().await;
    Ok(id)
  }

  async fn list(&self, filter: CountryFilter) -> Result<Vec<Country>> {
    let region = filter.region.map(|r| r.trim().to_owned()).filter(|r| !r.is_empty());
    let (sql, params) = super::filtered(
      &format!("SELECT {COLUMNS} FROM country_of_origin"),
      "region",
      region.map(Into::into),
      "country_id",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<Country> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM country_of_origin WHERE country_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  async fn update(&self, id: i64, changes: CountryDetails) -> Result<()> {
    let c = changes.validate()?;
    let touched = self
      .db
      .execute_affected(
        "UPDATE country_of_origin
         SET country_name = ?1, region = ?2, population_migrants = ?3, major_language = ?4
         WHERE country_id = ?5",
        values![c.country_name, c.region, c.population_migrants, c.major_language, id],
      )
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    self.lookups.invalidate().await;
    Ok(())
  }

  /// Refused with [`Error::Dependency`] while any immigrant still references
  /// the country; nothing is deleted in that case.
  async fn delete(&self, id: i64) -> Result<()> {
    let dependents = self.dependents(id).await?;
    if dependents > 0 {
      warn!(country_id = id, dependents, "refusing to delete referenced country");
      return Err(Error::Dependency { entity: Self::ENTITY, id, dependents });
    }

    let touched = self
      .db
      .execute_affected("DELETE FROM country_of_origin WHERE country_id = ?1", values![id])
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    self.lookups.invalidate().await;
    Ok(())
  }
}
