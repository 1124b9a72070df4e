//! Explicit maintenance operations. Nothing here runs implicitly.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use intake_core::Result;

use crate::{db::Database, encode::values};

/// Desktop tables whose auto-increment counter can be resynchronised.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SequenceTable {
  Immigrants,
  CustodyStatus,
  LegalRepresentation,
  CountryOfOrigin,
}

impl SequenceTable {
  pub const ALL: [SequenceTable; 4] = [
    SequenceTable::Immigrants,
    SequenceTable::CustodyStatus,
    SequenceTable::LegalRepresentation,
    SequenceTable::CountryOfOrigin,
  ];

  pub fn table(self) -> &'static str {
    match self {
      Self::Immigrants => "immigrants",
      Self::CustodyStatus => "custody_status",
      Self::LegalRepresentation => "legal_representation",
      Self::CountryOfOrigin => "country_of_origin",
    }
  }

  pub fn id_column(self) -> &'static str {
    match self {
      Self::Immigrants => "immigrant_id",
      Self::CustodyStatus => "custody_id",
      Self::LegalRepresentation => "legal_id",
      Self::CountryOfOrigin => "country_id",
    }
  }
}

/// Reset `table`'s auto-increment counter to its current highest id, so the
/// next insert reuses the ids freed by deleting the newest rows. Returns the
/// id the next insert will receive.
pub async fn resync_sequence(db: &Database, table: SequenceTable) -> Result<i64> {
  let (name, id) = (table.table(), table.id_column());

  let max = db
    .select_one_as::<i64>(format!("SELECT COALESCE(MAX({id}), 0) FROM {name}"), [])
    .await?
    .unwrap_or(0);

  // A table that has never had a row has no sqlite_sequence entry; inserting
  // one with seq = 0 is equivalent.
  let touched = db
    .execute_affected("UPDATE sqlite_sequence SET seq = ?1 WHERE name = ?2", values![max, name])
    .await?;
  if touched == 0 && max > 0 {
    db.execute("INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)", values![name, max])
      .await?;
  }

  info!(table = name, next_id = max + 1, "resynchronised id sequence");
  Ok(max + 1)
}
