//! [`LookupCache`] — name-to-id tables used by forms that let users pick a
//! country, custody record or legal record by label instead of by id.
//!
//! The tables are loaded on first use and dropped whenever a repository
//! writes to one of the source tables.

use std::{collections::BTreeMap, sync::Arc};

use intake_core::Result;
use rusqlite::Row;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::{Database, FromRow};

/// A snapshot of the three lookup tables, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct LookupTables {
  /// `country_id -> country_name`
  pub countries: BTreeMap<i64, String>,
  /// `custody_id -> case_id`
  pub custody:   BTreeMap<i64, String>,
  /// `legal_id -> case_id`
  pub legal:     BTreeMap<i64, String>,
}

impl LookupTables {
  /// Highest id whose label matches. Case ids may repeat across records;
  /// the most recent one wins.
  fn find(map: &BTreeMap<i64, String>, label: &str) -> Option<i64> {
    let label = label.trim();
    map.iter().rev().find(|(_, v)| v.as_str() == label).map(|(id, _)| *id)
  }
}

struct Label(i64, String);

fn pairs(rows: Vec<Label>) -> BTreeMap<i64, String> {
  rows.into_iter().map(|Label(id, s)| (id, s)).collect()
}

impl FromRow for Label {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> { Ok(Label(row.get(0)?, row.get(1)?)) }
}

pub struct LookupCache {
  db:     Database,
  tables: RwLock<Option<Arc<LookupTables>>>,
}

impl LookupCache {
  pub fn new(db: Database) -> Self { Self { db, tables: RwLock::new(None) } }

  /// Drop the cached tables; the next lookup reloads them.
  pub async fn invalidate(&self) {
    if self.tables.write().await.take().is_some() {
      debug!("lookup tables invalidated");
    }
  }

  /// Current tables, loading them if nothing is cached.
  pub async fn tables(&self) -> Result<Arc<LookupTables>> {
    if let Some(tables) = self.tables.read().await.as_ref() {
      return Ok(tables.clone());
    }

    let mut slot = self.tables.write().await;
    if let Some(tables) = slot.as_ref() {
      return Ok(tables.clone());
    }
    let tables = Arc::new(self.load().await?);
    *slot = Some(tables.clone());
    Ok(tables)
  }

  async fn load(&self) -> Result<LookupTables> {
    let countries = self
      .db
      .select_as::<Label>("SELECT country_id, country_name FROM country_of_origin", [])
      .await?;
    let custody = self
      .db
      .select_as::<Label>("SELECT custody_id, case_id FROM custody_status", [])
      .await?;
    let legal = self
      .db
      .select_as::<Label>("SELECT legal_id, case_id FROM legal_representation", [])
      .await?;

    let tables = LookupTables {
      countries: pairs(countries),
      custody:   pairs(custody),
      legal:     pairs(legal),
    };
    debug!(
      countries = tables.countries.len(),
      custody = tables.custody.len(),
      legal = tables.legal.len(),
      "loaded lookup tables"
    );
    Ok(tables)
  }

  pub async fn country_id(&self, name: &str) -> Result<Option<i64>> {
    Ok(LookupTables::find(&self.tables().await?.countries, name))
  }

  pub async fn custody_id(&self, case_id: &str) -> Result<Option<i64>> {
    Ok(LookupTables::find(&self.tables().await?.custody, case_id))
  }

  pub async fn legal_id(&self, case_id: &str) -> Result<Option<i64>> {
    Ok(LookupTables::find(&self.tables().await?.legal, case_id))
  }

  /// `(id, name)` for every country, sorted by name, for pick lists.
  pub async fn countries(&self) -> Result<Vec<(i64, String)>> {
    let tables = self.tables().await?;
    let mut out: Vec<_> = tables.countries.iter().map(|(id, n)| (*id, n.clone())).collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(out)
  }
}
