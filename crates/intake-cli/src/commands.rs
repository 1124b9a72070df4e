//! Subcommand definitions and their execution against a [`SqliteStore`].
//!
//! Every command produces one JSON document on stdout. Entity inputs and
//! list filters are passed as JSON objects using the field names of the
//! `intake_core` input types.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use intake_core::{Report, Repository};
use intake_store_sqlite::{SequenceTable, SqliteStore};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value as Json, json};
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Dashboard communities.
  #[command(subcommand)]
  Community(EntityAction),
  /// Dashboard service providers.
  #[command(subcommand)]
  Provider(EntityAction),
  /// Desktop countries of origin.
  #[command(subcommand)]
  Country(EntityAction),
  /// Desktop custody records.
  #[command(subcommand)]
  Custody(EntityAction),
  /// Desktop legal representation records.
  #[command(subcommand)]
  Legal(EntityAction),
  /// Desktop immigrants.
  #[command(subcommand)]
  Immigrant(EntityAction),

  /// Create an immigrant with its custody and legal records in one step.
  Enroll {
    /// Enrollment as a JSON object.
    json: String,
  },
  /// Immigrants joined with country, custody type and representation.
  Roster,
  /// Resolve labels to ids the way the desktop pick lists do.
  #[command(subcommand)]
  Lookup(LookupAction),

  /// List the available reports.
  Reports,
  /// Run one report.
  Report(ReportArgs),

  /// Reset id counters to each table's highest id.
  ResyncIds {
    /// One of: immigrants, custody_status, legal_representation,
    /// country_of_origin. Every desktop table when omitted.
    table: Option<SequenceTable>,
  },
}

#[derive(Subcommand, Debug)]
pub enum EntityAction {
  /// List rows, optionally filtered.
  List {
    /// Filter as a JSON object, e.g. '{"state_code":"TX"}'.
    #[arg(long, default_value = "{}")]
    filter: String,
  },
  Get { id: i64 },
  /// Create a row from a JSON object; prints the new id.
  Create { json: String },
  /// Replace a row's editable fields from a JSON object.
  Update { id: i64, json: String },
  Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum LookupAction {
  /// Every country as `[id, name]`, sorted by name.
  Countries,
  Country { name: String },
  Custody { case_id: String },
  Legal { case_id: String },
}

#[derive(Args, Debug)]
pub struct ReportArgs {
  /// Report name, as printed by `intake reports`.
  pub name: Report,

  #[arg(long, default_value_t = 0.5)]
  pub threshold: f64,

  /// Survey year for the no-car share.
  #[arg(long, default_value_t = 2024)]
  pub year: i32,

  #[arg(long, default_value_t = 30)]
  pub min_days: i64,

  #[arg(long, default_value_t = 2025)]
  pub fiscal_year: i32,

  #[arg(long, default_value_t = 3)]
  pub quarter: u8,
}

// ─── Execution ───────────────────────────────────────────────────────────────

pub async fn run(store: &SqliteStore, command: Command) -> Result<Json> {
  match command {
    Command::Community(action) => entity(store.communities(), action).await,
    Command::Provider(action) => entity(store.providers(), action).await,
    Command::Country(action) => entity(store.countries(), action).await,
    Command::Custody(action) => entity(store.custody(), action).await,
    Command::Legal(action) => entity(store.legal(), action).await,
    Command::Immigrant(action) => entity(store.immigrants(), action).await,

    Command::Enroll { json } => {
      let ids = store.immigrants().enroll(parse("enrollment", &json)?).await?;
      Ok(serde_json::to_value(ids)?)
    }
    Command::Roster => Ok(serde_json::to_value(store.immigrants().roster().await?)?),
    Command::Lookup(action) => lookup(store, action).await,

    Command::Reports => Ok(catalogue()),
    Command::Report(args) => report(store, args).await,

    Command::ResyncIds { table: Some(table) } => resync(store, table).await,
    Command::ResyncIds { table: None } => {
      let mut out = Vec::with_capacity(SequenceTable::ALL.len());
      for table in SequenceTable::ALL {
        out.push(resync(store, table).await?);
      }
      Ok(Json::Array(out))
    }
  }
}

async fn resync(store: &SqliteStore, table: SequenceTable) -> Result<Json> {
  let next_id = store.resync_sequence(table).await?;
  Ok(json!({ "table": table.to_string(), "next_id": next_id }))
}

fn parse<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
  serde_json::from_str(raw).with_context(|| format!("invalid {what} JSON"))
}

async fn entity<R>(repo: R, action: EntityAction) -> Result<Json>
where
  R: Repository,
  R::Entity: Serialize,
  R::New: DeserializeOwned,
  R::Changes: DeserializeOwned,
  R::Filter: DeserializeOwned,
{
  debug!(entity = R::ENTITY, ?action, "running entity command");
  let out = match action {
    EntityAction::List { filter } => {
      serde_json::to_value(repo.list(parse("filter", &filter)?).await?)?
    }
    EntityAction::Get { id } => serde_json::to_value(repo.get(id).await?)?,
    EntityAction::Create { json } => {
      let id = repo.create(parse(R::ENTITY, &json)?).await?;
      json!({ "id": id })
    }
    EntityAction::Update { id, json } => {
      repo.update(id, parse(R::ENTITY, &json)?).await?;
      json!({ "updated": id })
    }
    EntityAction::Delete { id } => {
      repo.delete(id).await?;
      json!({ "deleted": id })
    }
  };
  Ok(out)
}

async fn lookup(store: &SqliteStore, action: LookupAction) -> Result<Json> {
  let lookups = store.lookups();
  let out = match action {
    LookupAction::Countries => serde_json::to_value(lookups.countries().await?)?,
    LookupAction::Country { name } => json!({ "country_id": lookups.country_id(&name).await? }),
    LookupAction::Custody { case_id } => {
      json!({ "custody_id": lookups.custody_id(&case_id).await? })
    }
    LookupAction::Legal { case_id } => json!({ "legal_id": lookups.legal_id(&case_id).await? }),
  };
  Ok(out)
}

fn catalogue() -> Json {
  Report::ALL
    .iter()
    .map(|r| {
      json!({
        "name": r.to_string(),
        "schema": r.schema(),
        "params": r.params(),
        "title": r.title(),
        "description": r.description(),
      })
    })
    .collect()
}

async fn report(store: &SqliteStore, args: ReportArgs) -> Result<Json> {
  let analytics = store.analytics();
  let rows = match args.name {
    Report::CapacityBelowThreshold => analytics.capacity_below_threshold(args.threshold).await?,
    Report::AttendanceVsNoCar => analytics.attendance_vs_no_car(args.year).await?,
    Report::MedianCaseDuration => analytics.median_case_duration().await?,
    Report::OpenCasesOlderThan => analytics.open_cases_older_than(args.min_days).await?,
    Report::QuarterlyTotals => {
      analytics.quarterly_totals(args.fiscal_year, args.quarter).await?
    }
    Report::LawyerRateByCustody => analytics.lawyer_rate_by_custody().await?,
    Report::TopDetentionCountries => analytics.top_detention_countries().await?,
    Report::AverageAgeByOutcome => analytics.average_age_by_outcome().await?,
    Report::TopLawyerCountries => analytics.top_lawyer_countries().await?,
    Report::ArrivalYearDistribution => analytics.arrival_year_distribution().await?,
  };
  Ok(json!({
    "report": args.name.to_string(),
    "schema": args.name.schema(),
    "title": args.name.title(),
    "rows": rows,
  }))
}
