use intake_core::{
  Error, Repository, Result, Validate,
  dashboard::{Community, CommunityChanges, CommunityFilter, NewCommunity},
};
use rusqlite::Row;

use crate::{
  db::{Database, FromRow},
  encode::{datetime, values},
};

const COLUMNS: &str = "community_id, name, zip_code, state_code, population, \
                       foreign_born_pct, rural_flag, created_at";

impl FromRow for Community {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Community {
      community_id:     row.get(0)?,
      name:             row.get(1)?,
      zip_code:         row.get(2)?,
      state_code:       row.get(3)?,
      population:       row.get(4)?,
      foreign_born_pct: row.get(5)?,
      rural:            row.get(6)?,
      created_at:       datetime(row, 7)?,
    })
  }
}

#[derive(Clone)]
pub struct CommunityRepository {
  db: Database,
}

impl CommunityRepository {
  pub fn new(db: Database) -> Self { Self { db } }
}

impl Repository for CommunityRepository {
  type Entity = Community;
  type New = NewCommunity;
  type Changes = CommunityChanges;
  type Filter = CommunityFilter;

  const ENTITY: &'static str = "community";

  async fn create(&self, input: NewCommunity) -> Result<i64> {
    let c = input.validate()?;
    self
      .db
      .insert(
        "INSERT INTO communities
           (name, zip_code, state_code, population, foreign_born_pct, rural_flag)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        values![c.name, c.zip_code, c.state_code, c.population, c.foreign_born_pct, c.rural],
      )
      .await
  }

  async fn list(&self, filter: CommunityFilter) -> Result<Vec<Community>> {
    let state = filter
      .state_code
      .map(|s| s.trim().to_ascii_uppercase())
      .filter(|s| !s.is_empty());
    let (sql, params) = super::filtered(
      &format!("SELECT {COLUMNS} FROM communities"),
      "state_code",
      state.map(Into::into),
      "state_code, zip_code",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<Community> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM communities WHERE community_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  /// Zip and state are fixed; echoing different ones back is rejected.
  async fn update(&self, id: i64, changes: CommunityChanges) -> Result<()> {
    let stored = self.get(id).await?;
    changes.check_fixed(&stored)?;
    let c = changes.validate()?;

    let touched = self
      .db
      .execute_affected(
        "UPDATE communities
         SET name = ?1, population = ?2, foreign_born_pct = ?3, rural_flag = ?4
         WHERE community_id = ?5",
        values![c.name, c.population, c.foreign_born_pct, c.rural, id],
      )
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }

  /// Fails with `ReferentialIntegrity` while providers or intake cases still
  /// point at the community.
  async fn delete(&self, id: i64) -> Result<()> {
    let touched = self
      .db
      .execute_affected("DELETE FROM communities WHERE community_id = ?1", values![id])
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }
}
