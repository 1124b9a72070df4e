use std::sync::Arc;

use intake_core::{
  Error, Record, Repository, Result, Validate, Value,
  desktop::{Enrollment, EnrollmentIds, Immigrant, ImmigrantChanges, ImmigrantFilter, NewImmigrant},
};
use rusqlite::{Row, params};
use tracing::{error, info};

use crate::{
  db::{Database, FromRow},
  encode::{to_sql, values},
  lookup::LookupCache,
};

const COLUMNS: &str = "immigrant_id, case_id, age, gender, country_id, custody_id, legal_id, \
                       arrival_year";

/// Tables cleared when an immigrant is deleted, in order. The immigrant's
/// custody and legal references are deferred, so the dependents can go first.
const CASCADE_STEPS: [(&str, &str); 3] = [
  ("custody_status", "DELETE FROM custody_status WHERE case_id = ?1"),
  ("legal_representation", "DELETE FROM legal_representation WHERE case_id = ?1"),
  ("immigrants", "DELETE FROM immigrants WHERE case_id = ?1"),
];

impl FromRow for Immigrant {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Immigrant {
      immigrant_id: row.get(0)?,
      case_id:      row.get(1)?,
      age:          row.get(2)?,
      gender:       row.get(3)?,
      country_id:   row.get(4)?,
      custody_id:   row.get(5)?,
      legal_id:     row.get(6)?,
      arrival_year: row.get(7)?,
    })
  }
}

#[derive(Clone)]
pub struct ImmigrantRepository {
  db:      Database,
  lookups: Arc<LookupCache>,
}

impl ImmigrantRepository {
  pub fn new(db: Database, lookups: Arc<LookupCache>) -> Self { Self { db, lookups } }

  async fn ensure_case_id_free(&self, case_id: &str) -> Result<()> {
    let taken = self
      .db
      .select_one_as::<i64>(
        "SELECT COUNT(*) FROM immigrants WHERE case_id = ?1",
        values![case_id],
      )
      .await?
      .unwrap_or(0);
    if taken > 0 {
      return Err(Error::validation(
        "case_id",
        format!("case id {case_id:?} is already in use"),
      ));
    }
    Ok(())
  }

  /// Create the custody record, the legal record and the immigrant that
  /// points at both, all under the enrollment's case id. Either every row is
  /// written or none is.
  pub async fn enroll(&self, enrollment: Enrollment) -> Result<EnrollmentIds> {
    let e = enrollment.validate()?;
    self.ensure_case_id_free(&e.case_id).await?;

    let ids = self
      .db
      .transaction(move |tx| {
        tx.execute(
          "INSERT INTO custody_status
             (case_id, custody_type, detention_facility, release_date, custody_outcome)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            e.case_id,
            e.custody.custody_type.as_ref(),
            e.custody.detention_facility,
            to_sql(Value::from(e.custody.release_date)),
            e.custody.custody_outcome.as_ref(),
          ],
        )?;
        let custody_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO legal_representation
             (case_id, representation_status, attorney_name, organization, hearing_date)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            e.case_id,
            e.legal.representation_status.as_ref(),
            e.legal.attorney_name,
            e.legal.organization,
            to_sql(Value::from(e.legal.hearing_date)),
          ],
        )?;
        let legal_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO immigrants
             (case_id, age, gender, country_id, custody_id, legal_id, arrival_year)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            e.case_id,
            e.age,
            e.gender,
            e.country_id,
            custody_id,
            legal_id,
            e.arrival_year,
          ],
        )?;
        let immigrant_id = tx.last_insert_rowid();

        Ok(EnrollmentIds { immigrant_id, custody_id, legal_id })
      })
      .await?;

    self.lookups.invalidate().await;
    info!(immigrant_id = ids.immigrant_id, "enrolled case");
    Ok(ids)
  }

  /// Every immigrant with the names behind its references resolved. Rows
  /// whose custody or legal record is missing still appear, with nulls.
  pub async fn roster(&self) -> Result<Vec<Record>> {
    self
      .db
      .select(
        "SELECT i.immigrant_id, i.case_id, i.age, i.gender, c.country_name,
                cs.custody_type, lr.representation_status, i.arrival_year
         FROM immigrants i
         LEFT JOIN country_of_origin c     ON c.country_id = i.country_id
         LEFT JOIN custody_status cs       ON cs.custody_id = i.custody_id
         LEFT JOIN legal_representation lr ON lr.legal_id = i.legal_id
         ORDER BY i.immigrant_id",
        [],
      )
      .await
  }
}

impl Repository for ImmigrantRepository {
  type Entity = Immigrant;
  type New = NewImmigrant;
  type Changes = ImmigrantChanges;
  type Filter = ImmigrantFilter;

  const ENTITY: &'static str = "immigrant";

  /// Rejects a case id that is already taken. Unknown country, custody or
  /// legal ids fail with `ReferentialIntegrity`.
  async fn create(&self, input: NewImmigrant) -> Result<i64> {
    let i = input.validate()?;
    self.ensure_case_id_free(&i.case_id).await?;
    self
      .db
      .insert(
        "INSERT INTO immigrants
           (case_id, age, gender, country_id, custody_id, legal_id, arrival_year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        values![
          i.case_id,
          i.age,
          i.gender,
          i.country_id,
          i.custody_id,
          i.legal_id,
          i.arrival_year,
        ],
      )
      .await
  }

  async fn list(&self, filter: ImmigrantFilter) -> Result<Vec<Immigrant>> {
    let (sql, params) = super::filtered(
      &format!("SELECT {COLUMNS} FROM immigrants"),
      "country_id",
      filter.country_id.map(Into::into),
      "immigrant_id",
    );
    self.db.select_as(sql, params).await
  }

  async fn get(&self, id: i64) -> Result<Immigrant> {
    self
      .db
      .select_one_as(
        format!("SELECT {COLUMNS} FROM immigrants WHERE immigrant_id = ?1"),
        values![id],
      )
      .await?
      .ok_or_else(|| Error::not_found(Self::ENTITY, id))
  }

  /// The case id is fixed; echoing a different one back is rejected.
  async fn update(&self, id: i64, changes: ImmigrantChanges) -> Result<()> {
    let stored = self.get(id).await?;
    changes.check_case_id(&stored.case_id)?;
    let i = changes.validate()?;

    let touched = self
      .db
      .execute_affected(
        "UPDATE immigrants
         SET age = ?1, gender = ?2, country_id = ?3, custody_id = ?4, legal_id = ?5,
             arrival_year = ?6
         WHERE immigrant_id = ?7",
        values![i.age, i.gender, i.country_id, i.custody_id, i.legal_id, i.arrival_year, id],
      )
      .await?;
    if touched == 0 {
      return Err(Error::not_found(Self::ENTITY, id));
    }
    Ok(())
  }

  /// Removes the immigrant together with every custody and legal record filed
  /// under its case id, in one transaction. If any step fails nothing is
  /// removed and the failing step is named in [`Error::CascadeDelete`].
  async fn delete(&self, id: i64) -> Result<()> {
    let case_id = self.get(id).await?.case_id;

    let outcome = self
      .db
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (step, sql) in CASCADE_STEPS {
          if let Err(e) = tx.execute(sql, [&case_id]) {
            return Ok(Err((step, e)));
          }
        }
        if let Err(e) = tx.commit() {
          return Ok(Err(("commit", e)));
        }
        Ok(Ok(()))
      })
      .await?;

    if let Err((step, e)) = outcome {
      error!(immigrant_id = id, step, error = %e, "cascade delete rolled back");
      return Err(Error::CascadeDelete { step, message: e.to_string() });
    }

    self.lookups.invalidate().await;
    info!(immigrant_id = id, "deleted immigrant and its case records");
    Ok(())
  }
}
