//! Desktop schema: immigrants, their custody and legal records, and the
//! countries they come from.
//!
//! Custody and legal records are tied to an immigrant by the free-text
//! `case_id`, not by a foreign key. The immigrant row additionally points at
//! one custody and one legal record by id.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Result,
  validate::{self, Validate},
};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
pub enum CustodyType {
  Detained,
  #[serde(rename = "Never Detained")]
  #[strum(serialize = "Never Detained")]
  NeverDetained,
  Released,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
pub enum CustodyOutcome {
  Pending,
  Resolved,
  #[serde(rename = "Awaiting Hearing")]
  #[strum(serialize = "Awaiting Hearing")]
  AwaitingHearing,
  #[serde(rename = "Asylum Granted")]
  #[strum(serialize = "Asylum Granted")]
  AsylumGranted,
  Removed,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
pub enum RepresentationStatus {
  #[serde(rename = "Has a lawyer")]
  #[strum(serialize = "Has a lawyer")]
  HasLawyer,
  #[serde(rename = "No lawyer")]
  #[strum(serialize = "No lawyer")]
  NoLawyer,
}

/// Form dates arrive as `YYYY-MM-DD`, as an empty string, or as `None`.
fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
  match Option::<String>::deserialize(d)? {
    Some(raw) => validate::optional_date("date", &raw).map_err(serde::de::Error::custom),
    None => Ok(None),
  }
}

// ─── Country of origin ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
  pub country_id:          i64,
  /// Unique across the table.
  pub country_name:        String,
  pub region:              String,
  pub population_migrants: i64,
  pub major_language:      String,
}

/// Every country field is editable, so the same shape serves create and
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetails {
  pub country_name:        String,
  pub region:              String,
  pub population_migrants: i64,
  pub major_language:      String,
}

impl Validate for CountryDetails {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      country_name:        validate::required_text("country_name", &self.country_name)?,
      region:              validate::required_text("region", &self.region)?,
      population_migrants: validate::non_negative(
        "population_migrants",
        self.population_migrants,
      )?,
      major_language:      validate::required_text("major_language", &self.major_language)?,
    })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryFilter {
  pub region: Option<String>,
}

// ─── Custody status ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyStatus {
  pub custody_id:         i64,
  pub case_id:            String,
  pub custody_type:       CustodyType,
  pub detention_facility: String,
  pub release_date:       Option<NaiveDate>,
  pub custody_outcome:    CustodyOutcome,
}

/// The editable part of a custody record; everything except its case id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyDetails {
  pub custody_type:       CustodyType,
  pub detention_facility: String,
  #[serde(default, deserialize_with = "lenient_date")]
  pub release_date:       Option<NaiveDate>,
  pub custody_outcome:    CustodyOutcome,
}

impl Validate for CustodyDetails {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      detention_facility: validate::required_text(
        "detention_facility",
        &self.detention_facility,
      )?,
      ..self
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustodyStatus {
  pub case_id: String,
  #[serde(flatten)]
  pub details: CustodyDetails,
}

impl Validate for NewCustodyStatus {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      case_id: validate::required_text("case_id", &self.case_id)?,
      details: self.details.validate()?,
    })
  }
}

/// Update payload for a custody record. An echoed `case_id` must match the
/// stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyChanges {
  #[serde(default)]
  pub case_id: Option<String>,
  #[serde(flatten)]
  pub details: CustodyDetails,
}

impl CustodyChanges {
  pub fn check_case_id(&self, stored: &str) -> Result<()> {
    validate::unchanged("case_id", self.case_id.as_deref(), stored)
  }
}

impl From<CustodyDetails> for CustodyChanges {
  fn from(details: CustodyDetails) -> Self { Self { case_id: None, details } }
}

impl Validate for CustodyChanges {
  fn validate(self) -> Result<Self> {
    Ok(Self { details: self.details.validate()?, ..self })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustodyFilter {
  pub custody_type: Option<CustodyType>,
}

// ─── Legal representation ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalRepresentation {
  pub legal_id:              i64,
  pub case_id:               String,
  pub representation_status: RepresentationStatus,
  pub attorney_name:         String,
  pub organization:          String,
  pub hearing_date:          Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDetails {
  pub representation_status: RepresentationStatus,
  pub attorney_name:         String,
  pub organization:          String,
  #[serde(default, deserialize_with = "lenient_date")]
  pub hearing_date:          Option<NaiveDate>,
}

impl Validate for LegalDetails {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      attorney_name: validate::required_text("attorney_name", &self.attorney_name)?,
      organization:  validate::required_text("organization", &self.organization)?,
      ..self
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLegalRepresentation {
  pub case_id: String,
  #[serde(flatten)]
  pub details: LegalDetails,
}

impl Validate for NewLegalRepresentation {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      case_id: validate::required_text("case_id", &self.case_id)?,
      details: self.details.validate()?,
    })
  }
}

/// Update payload for a legal record; same case-id rule as
/// [`CustodyChanges`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalChanges {
  #[serde(default)]
  pub case_id: Option<String>,
  #[serde(flatten)]
  pub details: LegalDetails,
}

impl LegalChanges {
  pub fn check_case_id(&self, stored: &str) -> Result<()> {
    validate::unchanged("case_id", self.case_id.as_deref(), stored)
  }
}

impl From<LegalDetails> for LegalChanges {
  fn from(details: LegalDetails) -> Self { Self { case_id: None, details } }
}

impl Validate for LegalChanges {
  fn validate(self) -> Result<Self> {
    Ok(Self { details: self.details.validate()?, ..self })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegalFilter {
  pub representation_status: Option<RepresentationStatus>,
}

// ─── Immigrant ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Immigrant {
  pub immigrant_id: i64,
  /// Unique; shared with the immigrant's custody and legal records.
  pub case_id:      String,
  pub age:          i64,
  pub gender:       String,
  pub country_id:   i64,
  pub custody_id:   Option<i64>,
  pub legal_id:     Option<i64>,
  pub arrival_year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImmigrant {
  pub case_id:      String,
  pub age:          i64,
  pub gender:       String,
  pub country_id:   i64,
  pub custody_id:   Option<i64>,
  pub legal_id:     Option<i64>,
  pub arrival_year: i64,
}

impl Validate for NewImmigrant {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      case_id:      validate::required_text("case_id", &self.case_id)?,
      age:          validate::non_negative("age", self.age)?,
      gender:       validate::required_text("gender", &self.gender)?,
      arrival_year: validate::non_negative("arrival_year", self.arrival_year)?,
      ..self
    })
  }
}

/// Full replacement of an immigrant's editable fields.
///
/// `case_id` may be echoed back by a form; it must then match the stored
/// value, since the case id links the custody and legal records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmigrantChanges {
  #[serde(default)]
  pub case_id:      Option<String>,
  pub age:          i64,
  pub gender:       String,
  pub country_id:   i64,
  pub custody_id:   Option<i64>,
  pub legal_id:     Option<i64>,
  pub arrival_year: i64,
}

impl ImmigrantChanges {
  /// Reject an attempt to change the immutable case id.
  pub fn check_case_id(&self, stored: &str) -> Result<()> {
    validate::unchanged("case_id", self.case_id.as_deref(), stored)
  }
}

impl Validate for ImmigrantChanges {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      age: validate::non_negative("age", self.age)?,
      gender: validate::required_text("gender", &self.gender)?,
      arrival_year: validate::non_negative("arrival_year", self.arrival_year)?,
      ..self
    })
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImmigrantFilter {
  pub country_id: Option<i64>,
}

/// An immigrant together with the custody and legal records opened for the
/// same case, created in one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
  pub case_id:      String,
  pub age:          i64,
  pub gender:       String,
  pub country_id:   i64,
  pub arrival_year: i64,
  pub custody:      CustodyDetails,
  pub legal:        LegalDetails,
}

impl Validate for Enrollment {
  fn validate(self) -> Result<Self> {
    Ok(Self {
      case_id:      validate::required_text("case_id", &self.case_id)?,
      age:          validate::non_negative("age", self.age)?,
      gender:       validate::required_text("gender", &self.gender)?,
      country_id:   self.country_id,
      arrival_year: validate::non_negative("arrival_year", self.arrival_year)?,
      custody:      self.custody.validate()?,
      legal:        self.legal.validate()?,
    })
  }
}

/// Ids assigned by [`Enrollment`] creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentIds {
  pub immigrant_id: i64,
  pub custody_id:   i64,
  pub legal_id:     i64,
}
