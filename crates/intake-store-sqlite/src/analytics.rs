//! [`Analytics`] — the ten fixed aggregate reports.
//!
//! Each method is one statement and returns its rows as [`Record`]s with
//! snake_case column names. The first five read the dashboard tables, the
//! last five the desktop tables. See [`intake_core::Report`] for titles and
//! descriptions.

use intake_core::{Error, Record, Result, validate};
use tracing::debug;

use crate::{db::Database, encode::values};

// ─── Dashboard ───────────────────────────────────────────────────────────────

const CAPACITY_BELOW_THRESHOLD: &str = "
SELECT c.zip_code,
       c.population,
       COALESCE(SUM(p.capacity_per_week), 0) AS weekly_capacity,
       ROUND(COALESCE(SUM(p.capacity_per_week), 0) * 1000.0
             / NULLIF(c.population, 0), 3) AS capacity_per_1000
FROM communities c
LEFT JOIN service_providers p ON p.community_id = c.community_id
GROUP BY c.community_id, c.zip_code, c.population
HAVING ROUND(COALESCE(SUM(p.capacity_per_week), 0) * 1000.0
             / NULLIF(c.population, 0), 3) < ?1
ORDER BY capacity_per_1000 ASC, c.zip_code";

const ATTENDANCE_VS_NO_CAR: &str = "
SELECT c.zip_code,
       ROUND(AVG(CASE WHEN a.attended_flag = 1 THEN 1.0 ELSE 0.0 END), 3) AS attendance_rate,
       d.no_car_pct
FROM intake_cases ic
JOIN appointments a ON a.case_id = ic.case_id
JOIN communities c  ON c.community_id = ic.community_id
JOIN demographics d ON d.zip_code = c.zip_code AND d.year = ?1
GROUP BY c.zip_code, d.no_car_pct
ORDER BY attendance_rate ASC, c.zip_code";

const MEDIAN_DURATION_NATIVE: &str = "
SELECT case_type,
       median(CAST(julianday(date_closed) - julianday(date_opened) AS INTEGER)) AS median_days
FROM intake_cases
WHERE date_closed IS NOT NULL
GROUP BY case_type
ORDER BY median_days DESC";

/// Average of the middle one or two durations per case type.
const MEDIAN_DURATION_RANKED: &str = "
WITH durations AS (
  SELECT case_type,
         CAST(julianday(date_closed) - julianday(date_opened) AS INTEGER) AS dd
  FROM intake_cases
  WHERE date_closed IS NOT NULL
),
ranked AS (
  SELECT case_type, dd,
         ROW_NUMBER() OVER (PARTITION BY case_type ORDER BY dd) AS rn,
         COUNT(*)     OVER (PARTITION BY case_type)             AS cnt
  FROM durations
)
SELECT case_type, AVG(dd) AS median_days
FROM ranked
WHERE rn IN ((cnt + 1) / 2, (cnt + 2) / 2)
GROUP BY case_type
ORDER BY median_days DESC";

const OPEN_CASES_OLDER_THAN: &str = "
SELECT ic.case_id,
       ic.case_type,
       sp.name AS provider_name,
       c.zip_code,
       CAST(julianday(date('now')) - julianday(ic.date_opened) AS INTEGER) AS days_open
FROM intake_cases ic
JOIN service_providers sp ON sp.provider_id = ic.provider_id
JOIN communities c        ON c.community_id = ic.community_id
WHERE ic.status = 'open'
  AND CAST(julianday(date('now')) - julianday(ic.date_opened) AS INTEGER) >= ?1
ORDER BY days_open DESC, ic.case_id";

const QUARTERLY_TOTALS: &str = "
SELECT case_type, receipts, approvals, denials, pending_begin, pending_end, completed
FROM case_stats_quarterly
WHERE fiscal_year = ?1 AND quarter_num = ?2
ORDER BY case_type";

// ─── Desktop ─────────────────────────────────────────────────────────────────

const LAWYER_RATE_BY_CUSTODY: &str = "
SELECT cs.custody_type,
       ROUND(SUM(l.representation_status = 'Has a lawyer') * 100.0 / COUNT(*), 1)
         AS pct_with_lawyer
FROM immigrants i
JOIN custody_status cs       ON cs.custody_id = i.custody_id
JOIN legal_representation l  ON l.legal_id = i.legal_id
GROUP BY cs.custody_type
ORDER BY pct_with_lawyer DESC, cs.custody_type";

const TOP_DETENTION_COUNTRIES: &str = "
SELECT c.country_name,
       COUNT(*) AS total_immigrants,
       SUM(cs.custody_type = 'Detained') AS total_detained,
       ROUND(SUM(cs.custody_type = 'Detained') * 100.0 / COUNT(*), 1) AS detention_rate
FROM immigrants i
JOIN country_of_origin c ON c.country_id = i.country_id
JOIN custody_status cs   ON cs.custody_id = i.custody_id
GROUP BY c.country_name
ORDER BY total_detained DESC, c.country_name
LIMIT 5";

const AVERAGE_AGE_BY_OUTCOME: &str = "
SELECT cs.custody_outcome, ROUND(AVG(i.age), 1) AS average_age
FROM immigrants i
JOIN custody_status cs ON cs.custody_id = i.custody_id
GROUP BY cs.custody_outcome
ORDER BY average_age DESC, cs.custody_outcome";

const TOP_LAWYER_COUNTRIES: &str = "
SELECT c.country_name,
       COUNT(*) AS total_immigrants,
       SUM(l.representation_status = 'Has a lawyer') AS with_lawyer,
       ROUND(SUM(l.representation_status = 'Has a lawyer') * 100.0 / COUNT(*), 1) AS lawyer_rate
FROM immigrants i
JOIN country_of_origin c    ON c.country_id = i.country_id
JOIN legal_representation l ON l.legal_id = i.legal_id
GROUP BY c.country_name
ORDER BY with_lawyer DESC, c.country_name
LIMIT 5";

const ARRIVAL_YEAR_DISTRIBUTION: &str = "
SELECT arrival_year,
       COUNT(*) AS total_arrivals,
       ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM immigrants), 1) AS arrival_pct
FROM immigrants
GROUP BY arrival_year
ORDER BY arrival_year";

// ─── Runner ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Analytics {
  db: Database,
}

impl Analytics {
  pub fn new(db: Database) -> Self { Self { db } }

  /// Communities whose weekly capacity per 1,000 residents is below
  /// `threshold`. Communities with no population are left out.
  pub async fn capacity_below_threshold(&self, threshold: f64) -> Result<Vec<Record>> {
    self.db.select(CAPACITY_BELOW_THRESHOLD, values![threshold]).await
  }

  pub async fn attendance_vs_no_car(&self, year: i32) -> Result<Vec<Record>> {
    self.db.select(ATTENDANCE_VS_NO_CAR, values![year]).await
  }

  /// Uses the engine's `median()` when it is available and the ranked
  /// fallback otherwise; both produce the same columns.
  pub async fn median_case_duration(&self) -> Result<Vec<Record>> {
    match self.db.select(MEDIAN_DURATION_NATIVE, []).await {
      Err(Error::Statement(msg)) if msg.contains("no such function") => {
        debug!("median() unavailable; using ranked fallback");
        self.db.select(MEDIAN_DURATION_RANKED, []).await
      }
      other => other,
    }
  }

  pub async fn open_cases_older_than(&self, min_days: i64) -> Result<Vec<Record>> {
    let min_days = validate::non_negative("min_days", min_days)?;
    self.db.select(OPEN_CASES_OLDER_THAN, values![min_days]).await
  }

  /// Fails with `Validation` unless `quarter` is 1 to 4.
  pub async fn quarterly_totals(&self, fiscal_year: i32, quarter: u8) -> Result<Vec<Record>> {
    let quarter = validate::quarter(quarter)?;
    self
      .db
      .select(QUARTERLY_TOTALS, values![fiscal_year, i64::from(quarter)])
      .await
  }

  pub async fn lawyer_rate_by_custody(&self) -> Result<Vec<Record>> {
    self.db.select(LAWYER_RATE_BY_CUSTODY, []).await
  }

  pub async fn top_detention_countries(&self) -> Result<Vec<Record>> {
    self.db.select(TOP_DETENTION_COUNTRIES, []).await
  }

  pub async fn average_age_by_outcome(&self) -> Result<Vec<Record>> {
    self.db.select(AVERAGE_AGE_BY_OUTCOME, []).await
  }

  pub async fn top_lawyer_countries(&self) -> Result<Vec<Record>> {
    self.db.select(TOP_LAWYER_COUNTRIES, []).await
  }

  pub async fn arrival_year_distribution(&self) -> Result<Vec<Record>> {
    self.db.select(ARRIVAL_YEAR_DISTRIBUTION, []).await
  }
}
