use std::sync::Arc;

use intake_core::{
  Error, Repository, Result, Validate,
  desktop::{CustodyChanges, CustodyFilter, CustodyStatus, NewCustodyStatus},
};
use rusqlite::Row;

use crate::{
  db::{Database, FromRow},
  encode::{optional_date, text_enum, values},
  lookup::LookupCache,
};

const COLUMNS: &str = "custody_id, case_id, custody_type, detention_facility, release_date, \
                       custody_outcome";

impl FromRow for CustodyStatus {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(CustodyStatus {
      custody_id:         row.get(0)?,
      case_id:            row.get(1)?,
      custody_type:       text_enum(row, 2)?,
      detention_facility: row.get(3)?,
      release_date:       optional_date(row, 4)?,
      custody_outcome:    text_enum(row, 5)?,
    })
  }
}

#[derive(Clone)]
pub struct CustodyRepository {
  db:      Database,
  lookups: Arc<LookupCache>,
}

impl CustodyRepository {
  pub fn new(db: Database, lookups: Arc<LookupCache>) -> Self { Self { db, lookups } }
}

impl Repository for CustodyRepository {
  type Entity = CustodyStatus;
  type New = NewCustodyStatus;
  type Changes = CustodyChanges;
  type Filter = CustodyFilter;

  const ENTITY: &'static str = "custody status";

  async fn create(&self, input: NewCustodyStatus) -> Result<i64> {
    let NewCustodyStatus { case_id, details: d } = input.validate()?;
    let id = self
      .db
      .insert(
        "INSERT INTO custody_status
           (case_id, custody_type, detention_facility, release_date, custody_outcome)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        values![
          case_id,
          d.custody_type.as_ref(),
          d.detention_facility,
          d.release_date,
          d.custody_outcome.as_ref(),
        ],
      )
      .await?;
    self.lookups.invalidate().await;
    Ok(id)
  }

  async fn list(&self, filter: CustodyFilter) -> Result<Vec<CustodyStatus>> {
    let (sql, params) = super::filtered(
      &format!("SELECT {COLUMNS} FROM custody_status"),
      "custody_type",
      filter.custody_type.map(|t| t.as_ref().into()),
      "custody_id",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<CustodyStatus> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM custody_status WHERE custody_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  /// The case id is fixed; echoing a different one back is rejected.
  async fn update(&self, id: i64, changes: CustodyChanges) -> Result<()> {
    let stored = self.get(id).await?;
    changes.check_case_id(&stored.case_id)?;
    let d = changes.validate()?.details;

    let touched = self
      .db
      .execute_affected(
        "UPDATE custody_status
         SET custody_type = ?1, detention_facility = ?2, release_date = ?3,
             custody_outcome = ?4
         WHERE custody_id = ?5",
        values![
          d.custody_type.as_ref(),
          d.detention_facility,
          d.release_date,
          d.custody_outcome.as_ref(),
          id,
        ],
      )
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }

  /// Fails with `ReferentialIntegrity` while an immigrant points at the row.
  async fn delete(&self, id: i64) -> Result<()> {
    let touched = self
      .db
      .execute_affected("DELETE FROM custody_status WHERE custody_id = ?1", values![id])
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    self.lookups.invalidate().await;
    Ok(())
  }
}
