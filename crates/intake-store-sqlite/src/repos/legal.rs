use std::sync::Arc;

use intake_core::{
  Error, Repository, Result, Validate,
  desktop::{LegalChanges, LegalFilter, LegalRepresentation, NewLegalRepresentation},
};
use rusqlite::Row;

use crate::{
  db::{Database, FromRow},
  encode::{optional_date, text_enum, values},
  lookup::LookupCache,
};

const COLUMNS: &str = "legal_id, case_id, representation_status, attorney_name, organization, \
                       hearing_date";

impl FromRow for LegalRepresentation {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(LegalRepresentation {
      legal_id:              row.get(0)?,
      case_id:               row.get(1)?,
      representation_status: text_enum(row, 2)?,
      attorney_name:         row.get(3)?,
      organization:          row.get(4)?,
      hearing_date:          optional_date(row, 5)?,
    })
  }
}

#[derive(Clone)]
pub struct LegalRepository {
  db:      Database,
  lookups: Arc<LookupCache>,
}

impl LegalRepository {
  pub fn new(db: Database, lookups: Arc<LookupCache>) -> Self { Self { db, lookups } }
}

impl Repository for LegalRepository {
  type Entity = LegalRepresentation;
  type New = NewLegalRepresentation;
  type Changes = LegalChanges;
  type Filter = LegalFilter;

  const ENTITY: &'static str = "legal representation";

  async fn create(&self, input: NewLegalRepresentation) -> Result<i64> {
    let NewLegalRepresentation { case_id, details: d } = input.validate()?;
    let id = self
      .db
      .insert(
        "INSERT INTO legal_representation
           (case_id, representation_status, attorney_name, organization, hearing_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        values![
          case_id,
          d.representation_status.as_ref(),
          d.attorney_name,
          d.organization,
          d.hearing_date,
        ],
      )
      .await?;
    self.lookups.invalidate().await;
    Ok(id)
  }

  async fn list(&self, filter: LegalFilter) -> Result<Vec<LegalRepresentation>> {
    let (sql, params) = super::filtered(
      &format!("SELECT {COLUMNS} FROM legal_representation"),
      "representation_status",
      filter.representation_status.map(|s| s.as_ref().into()),
      "legal_id",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<LegalRepresentation> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM legal_representation WHERE legal_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  /// The case id is fixed; echoing a different one back is rejected.
  async fn update(&self, id: i64, changes: LegalChanges) -> Result<()> {
    let stored = self.get(id).await?;
    changes.check_case_id(&stored.case_id)?;
    let d = changes.validate()?.details;

    let touched = self
      .db
      .execute_affected(
        "UPDATE legal_representation
         SET representation_status = ?1, attorney_name = ?2, organization = ?3,
             hearing_date = ?4
         WHERE legal_id = ?5",
        values![
          d.representation_status.as_ref(),
          d.attorney_name,
          d.organization,
          d.hearing_date,
          id,
        ],
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
      .execute_affected("DELETE FROM legal_representation WHERE legal_id = ?1", values![id])
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    self.lookups.invalidate().await;
    Ok(())
  }
}
