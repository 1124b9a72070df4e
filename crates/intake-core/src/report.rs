//! Catalogue of the fixed analytical reports.
//!
//! Front-ends use this to build menus and help text; the SQL behind each
//! report lives in the storage backend.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which of the two independent schemas a report reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Schema {
  Dashboard,
  Desktop,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Report {
  CapacityBelowThreshold,
  AttendanceVsNoCar,
  MedianCaseDuration,
  OpenCasesOlderThan,
  QuarterlyTotals,
  LawyerRateByCustody,
  TopDetentionCountries,
  AverageAgeByOutcome,
  TopLawyerCountries,
  ArrivalYearDistribution,
}

impl Report {
  pub const ALL: [Report; 10] = [
    Report::CapacityBelowThreshold,
    Report::AttendanceVsNoCar,
    Report::MedianCaseDuration,
    Report::OpenCasesOlderThan,
    Report::QuarterlyTotals,
    Report::LawyerRateByCustody,
    Report::TopDetentionCountries,
    Report::AverageAgeByOutcome,
    Report::TopLawyerCountries,
    Report::ArrivalYearDistribution,
  ];

  pub fn schema(self) -> Schema {
    match self {
      Self::CapacityBelowThreshold
      | Self::AttendanceVsNoCar
      | Self::MedianCaseDuration
      | Self::OpenCasesOlderThan
      | Self::QuarterlyTotals => Schema::Dashboard,
      _ => Schema::Desktop,
    }
  }

  /// Names of the scalar parameters the report takes, in binding order.
  pub fn params(self) -> &'static [&'static str] {
    match self {
      Self::CapacityBelowThreshold => &["threshold"],
      Self::AttendanceVsNoCar => &["year"],
      Self::OpenCasesOlderThan => &["min_days"],
      Self::QuarterlyTotals => &["fiscal_year", "quarter"],
      _ => &[],
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::CapacityBelowThreshold => "Capacity per 1,000 residents below threshold",
      Self::AttendanceVsNoCar => "Attendance vs no-car rate",
      Self::MedianCaseDuration => "Median closed-case duration by case type",
      Self::OpenCasesOlderThan => "Open cases older than N days",
      Self::QuarterlyTotals => "Quarterly totals by case type",
      Self::LawyerRateByCustody => "Percentage with lawyers by custody type",
      Self::TopDetentionCountries => "Top 5 countries by detention rate",
      Self::AverageAgeByOutcome => "Average age by custody outcome",
      Self::TopLawyerCountries => "Top 5 countries with immigrants that have lawyers",
      Self::ArrivalYearDistribution => "Percentage of immigrants by arrival year",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Self::CapacityBelowThreshold => {
        "Weekly provider capacity per 1,000 residents for each community, \
         keeping only communities below the threshold."
      }
      Self::AttendanceVsNoCar => {
        "Share of appointments attended per zip code next to the share of \
         households without a car for the chosen survey year."
      }
      Self::MedianCaseDuration => {
        "Median number of days between opening and closing a case, per case \
         type."
      }
      Self::OpenCasesOlderThan => {
        "Cases still open after at least the given number of days, oldest \
         first."
      }
      Self::QuarterlyTotals => {
        "Receipts, approvals, denials and pending counts per case type for one \
         fiscal quarter."
      }
      Self::LawyerRateByCustody => {
        "Percentage of immigrants that have lawyers, by custody type: \
         Detained, Released and Never Detained."
      }
      Self::TopDetentionCountries => {
        "The five countries with the most detained immigrants and their \
         detention rate."
      }
      Self::AverageAgeByOutcome => {
        "Average immigrant age for each custody outcome."
      }
      Self::TopLawyerCountries => {
        "The five countries with the most immigrants that have lawyers and \
         their lawyer rate."
      }
      Self::ArrivalYearDistribution => {
        "Number and percentage of immigrants arriving in each year."
      }
    }
  }
}
