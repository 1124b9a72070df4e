//! Dashboard schema: communities and the service providers that serve them.
//!
//! Intake cases, appointments, demographics and quarterly statistics belong
//! to the same schema but are read-only here; only the analytics queries
//! touch them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  validate::{self, Validate},
};

// ─── Community ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
  pub community_id:     i64,
  pub name:             String,
  pub zip_code:         String,
  pub state_code:       String,
  pub population:       i64,
  pub foreign_born_pct: f64,
  pub rural:            bool,
  /// Assigned by the database on insert.
  pub created_at:       NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommunity {
  pub name:             String,
  pub zip_code:         String,
  pub state_code:       String,
  pub population:       i64,
  pub foreign_born_pct: f64,
  pub rural:            bool,
}

impl Validate for NewCommunity {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      name:             validate::required_text("name", &self.name)?,
      zip_code:         validate::zip_code(&self.zip_code)?,
      state_code:       validate::state_code(&self.state_code)?,
      population:       validate::non_negative("population", self.population)?,
      foreign_born_pct: validate::percentage("foreign_born_pct", self.foreign_born_pct)?,
      rural:            self.rural,
    })
  }
}

/// The editable fields of a community. Zip and state are fixed at creation;
/// a form may echo them back, but only unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityChanges {
  pub name:             String,
  #[serde(default)]
  pub zip_code:         Option<String>,
  #[serde(default)]
  pub state_code:       Option<String>,
  pub population:       i64,
  pub foreign_born_pct: f64,
  pub rural:            bool,
}

impl CommunityChanges {
  /// Reject an echoed zip or state that differs from the stored community.
  /// State codes compare case-insensitively.
  pub fn check_fixed(&self, stored: &Community) -> Result<()> {
    validate::unchanged("zip_code", self.zip_code.as_deref(), &stored.zip_code)?;
    let state = self.state_code.as_deref().map(str::to_ascii_uppercase);
    validate::unchanged("state_code", state.as_deref(), &stored.state_code)
  }
}

impl Validate for CommunityChanges {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      name:             validate::required_text("name", &self.name)?,
      population:       validate::non_negative("population", self.population)?,
      foreign_born_pct: validate::percentage("foreign_born_pct", self.foreign_born_pct)?,
      ..self
    })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityFilter {
  /// Two-letter state code; matched case-insensitively.
  pub state_code: Option<String>,
}

// ─── Service provider ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProvider {
  pub provider_id:       i64,
  pub name:              String,
  /// Free-text category, e.g. `legal_aid`, `ESL`, `workforce`.
  pub provider_type:     String,
  pub community_id:      i64,
  pub zip_code:          String,
  pub capacity_per_week: i64,
  pub accepts_pro_bono:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceProvider {
  pub name:              String,
  pub provider_type:     String,
  pub community_id:      i64,
  pub zip_code:          String,
  pub capacity_per_week: i64,
  pub accepts_pro_bono:  bool,
}

impl Validate for NewServiceProvider {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      name:              validate::required_text("name", &self.name)?,
      provider_type:     validate::required_text("provider_type", &self.provider_type)?,
      community_id:      self.community_id,
      zip_code:          validate::zip_code(&self.zip_code)?,
      capacity_per_week: validate::non_negative("capacity_per_week", self.capacity_per_week)?,
      accepts_pro_bono:  self.accepts_pro_bono,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProviderChanges {
  pub name:              String,
  pub provider_type:     String,
  pub capacity_per_week: i64,
  pub accepts_pro_bono:  bool,
}

impl Validate for ServiceProviderChanges {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      name:              validate::required_text("name", &self.name)?,
      provider_type:     validate::required_text("provider_type", &self.provider_type)?,
      capacity_per_week: validate::non_negative("capacity_per_week", self.capacity_per_week)?,
      accepts_pro_bono:  self.accepts_pro_bono,
    })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceProviderFilter {
  pub provider_type: Option<String>,
}
