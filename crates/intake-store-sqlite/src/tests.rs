//! Integration tests for `SqliteStore` against in-memory databases.

use chrono::NaiveDate;
use intake_core::{
  Error, Record, Repository,
  dashboard::{CommunityChanges, CommunityFilter, NewCommunity, NewServiceProvider,
    ServiceProviderFilter},
  desktop::{
    CountryDetails, CustodyChanges, CustodyDetails, CustodyFilter, CustodyOutcome, CustodyType,
    Enrollment, ImmigrantChanges, ImmigrantFilter, LegalChanges, LegalDetails, NewCustodyStatus,
    NewImmigrant, NewLegalRepresentation, RepresentationStatus,
  },
};
use uuid::Uuid;

use crate::{DbConfig, SequenceTable, SqliteStore, encode::values};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn f64_at(row: &Record, column: &str) -> f64 {
  row
    .get(column)
    .and_then(|v| v.as_f64())
    .unwrap_or_else(|| panic!("no numeric {column} in {row:?}"))
}

fn i64_at(row: &Record, column: &str) -> i64 {
  row
    .get(column)
    .and_then(|v| v.as_i64())
    .unwrap_or_else(|| panic!("no integer {column} in {row:?}"))
}

fn str_at<'a>(row: &'a Record, column: &str) -> &'a str {
  row
    .get(column)
    .and_then(|v| v.as_str())
    .unwrap_or_else(|| panic!("no text {column} in {row:?}"))
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn community(name: &str, zip: &str, state: &str, population: i64) -> NewCommunity {
  NewCommunity {
    name:             name.into(),
    zip_code:         zip.into(),
    state_code:       state.into(),
    population,
    foreign_born_pct: 18.5,
    rural:            false,
  }
}

fn provider(community_id: i64, name: &str, kind: &str, capacity: i64) -> NewServiceProvider {
  NewServiceProvider {
    name: name.into(),
    provider_type: kind.into(),
    community_id,
    zip_code: "78207".into(),
    capacity_per_week: capacity,
    accepts_pro_bono: true,
  }
}

fn country(name: &str) -> CountryDetails {
  CountryDetails {
    country_name:        name.into(),
    region:              "Central America".into(),
    population_migrants: 1_200_000,
    major_language:      "Spanish".into(),
  }
}

fn custody_details(kind: CustodyType, outcome: CustodyOutcome) -> CustodyDetails {
  CustodyDetails {
    custody_type:       kind,
    detention_facility: "South Texas ICE Processing Center".into(),
    release_date:       NaiveDate::from_ymd_opt(2024, 3, 1),
    custody_outcome:    outcome,
  }
}

fn legal_details(status: RepresentationStatus) -> LegalDetails {
  LegalDetails {
    representation_status: status,
    attorney_name:         "Maria Lopez".into(),
    organization:          "RAICES".into(),
    hearing_date:          None,
  }
}

fn enrollment(case_id: &str, country_id: i64, arrival_year: i64) -> Enrollment {
  Enrollment {
    case_id: case_id.into(),
    age: 34,
    gender: "F".into(),
    country_id,
    arrival_year,
    custody: custody_details(CustodyType::Detained, CustodyOutcome::Pending),
    legal: legal_details(RepresentationStatus::HasLawyer),
  }
}

// ─── Communities ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_community_is_listed_with_fresh_id() {
  let s = store().await;
  let repo = s.communities();

  let first = repo.create(community("Westside", "78207", "tx", 52_000)).await.unwrap();
  let second = repo.create(community("Eastside", "78202", "TX", 21_000)).await.unwrap();
  assert_ne!(first, second);

  let all = repo.list(CommunityFilter::default()).await.unwrap();
  assert_eq!(all.len(), 2);
  let westside = all.iter().find(|c| c.community_id == first).unwrap();
  assert_eq!(westside.name, "Westside");
  assert_eq!(westside.state_code, "TX");
  assert_eq!(westside.population, 52_000);
  assert!(!westside.rural);

  // Ordered by state, then zip.
  assert_eq!(all[0].zip_code, "78202");
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
  let s = store().await;
  let repo = s.communities();

  let first = repo.create(community("Westside", "78207", "TX", 100)).await.unwrap();
  repo.delete(first).await.unwrap();
  let second = repo.create(community("Westside", "78207", "TX", 100)).await.unwrap();
  assert!(second > first);
}

#[tokio::test]
async fn community_list_filters_by_state() {
  let s = store().await;
  let repo = s.communities();
  repo.create(community("Westside", "78207", "TX", 100)).await.unwrap();
  repo.create(community("Little Haiti", "33137", "FL", 100)).await.unwrap();

  let florida = repo
    .list(CommunityFilter { state_code: Some("fl".into()) })
    .await
    .unwrap();
  assert_eq!(florida.len(), 1);
  assert_eq!(florida[0].name, "Little Haiti");
}

#[tokio::test]
async fn invalid_community_never_reaches_the_database() {
  let s = store().await;
  let repo = s.communities();

  let bad_pct = NewCommunity { foreign_born_pct: 140.0, ..community("X", "78207", "TX", 1) };
  assert!(matches!(
    repo.create(bad_pct).await,
    Err(Error::Validation { field: "foreign_born_pct", .. })
  ));
  let bad_zip = community("X", "782", "TX", 1);
  assert!(matches!(
    repo.create(bad_zip).await,
    Err(Error::Validation { field: "zip_code", .. })
  ));
  assert!(repo.list(CommunityFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_is_idempotent() {
  let s = store().await;
  let repo = s.communities();
  let id = repo.create(community("Westside", "78207", "TX", 100)).await.unwrap();

  let changes = CommunityChanges {
    name:             "West Side".into(),
    zip_code:         None,
    state_code:       None,
    population:       150,
    foreign_born_pct: 22.0,
    rural:            true,
  };
  repo.update(id, changes.clone()).await.unwrap();
  let once = repo.get(id).await.unwrap();
  repo.update(id, changes).await.unwrap();
  let twice = repo.get(id).await.unwrap();

  assert_eq!(once, twice);
  assert_eq!(twice.name, "West Side");
  assert!(twice.rural);
  assert_eq!(twice.zip_code, "78207");
}

#[tokio::test]
async fn missing_rows_are_not_found() {
  let s = store().await;
  assert!(matches!(
    s.communities().get(99).await,
    Err(Error::NotFound { entity: "community", id: 99 })
  ));
  assert!(matches!(s.countries().delete(99).await, Err(Error::NotFound { .. })));
  let changes = LegalChanges::from(legal_details(RepresentationStatus::NoLawyer));
  assert!(matches!(s.legal().update(99, changes).await, Err(Error::NotFound { .. })));
}

// ─── Service providers ───────────────────────────────────────────────────────

#[tokio::test]
async fn provider_needs_existing_community() {
  let s = store().await;
  assert!(matches!(
    s.providers().create(provider(42, "Ghost", "ESL", 5)).await,
    Err(Error::ReferentialIntegrity(_))
  ));
}

#[tokio::test]
async fn community_in_use_cannot_be_deleted() {
  let s = store().await;
  let cid = s.communities().create(community("Westside", "78207", "TX", 100)).await.unwrap();
  s.providers().create(provider(cid, "Casa", "legal_aid", 5)).await.unwrap();

  assert!(matches!(
    s.communities().delete(cid).await,
    Err(Error::ReferentialIntegrity(_))
  ));
  assert!(s.communities().get(cid).await.is_ok());
}

#[tokio::test]
async fn providers_filter_by_type_and_order_by_state_then_name() {
  let s = store().await;
  let tx = s.communities().create(community("Westside", "78207", "TX", 100)).await.unwrap();
  let fl = s.communities().create(community("Little Haiti", "33137", "FL", 100)).await.unwrap();
  let repo = s.providers();
  repo.create(provider(tx, "Zeta Legal", "legal_aid", 5)).await.unwrap();
  repo.create(provider(tx, "Alpha Legal", "legal_aid", 5)).await.unwrap();
  repo.create(provider(fl, "Sant La", "legal_aid", 5)).await.unwrap();
  repo.create(provider(tx, "Words First", "ESL", 5)).await.unwrap();

  let legal = repo
    .list(ServiceProviderFilter { provider_type: Some("legal_aid".into()) })
    .await
    .unwrap();
  let names: Vec<_> = legal.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Sant La", "Alpha Legal", "Zeta Legal"]);
}

// ─── Countries ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn country_in_use_is_blocked_with_dependency_error() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();

  match s.countries().delete(cid).await {
    Err(Error::Dependency { entity: "country", id, dependents }) => {
      assert_eq!(id, cid);
      assert_eq!(dependents, 1);
    }
    other => panic!("expected dependency error, got {other:?}"),
  }
  assert!(s.countries().get(cid).await.is_ok());
  assert_eq!(s.immigrants().list(ImmigrantFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreferenced_country_is_deleted() {
  let s = store().await;
  let cid = s.countries().create(country("Guatemala")).await.unwrap();
  s.countries().delete(cid).await.unwrap();
  assert!(matches!(s.countries().get(cid).await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_country_name_is_a_statement_error() {
  let s = store().await;
  s.countries().create(country("Honduras")).await.unwrap();
  assert!(matches!(
    s.countries().create(country("Honduras")).await,
    Err(Error::Statement(_))
  ));
}

// ─── Custody and legal records ───────────────────────────────────────────────

#[tokio::test]
async fn custody_round_trips_enums_and_dates() {
  let s = store().await;
  let repo = s.custody();
  let id = repo
    .create(NewCustodyStatus {
      case_id: "A-100".into(),
      details: custody_details(CustodyType::NeverDetained, CustodyOutcome::AsylumGranted),
    })
    .await
    .unwrap();

  let stored = repo.get(id).await.unwrap();
  assert_eq!(stored.case_id, "A-100");
  assert_eq!(stored.custody_type, CustodyType::NeverDetained);
  assert_eq!(stored.custody_outcome, CustodyOutcome::AsylumGranted);
  assert_eq!(stored.release_date, NaiveDate::from_ymd_opt(2024, 3, 1));

  let detained = repo
    .list(CustodyFilter { custody_type: Some(CustodyType::Detained) })
    .await
    .unwrap();
  assert!(detained.is_empty());
}

#[tokio::test]
async fn legal_update_replaces_every_editable_field() {
  let s = store().await;
  let repo = s.legal();
  let id = repo
    .create(NewLegalRepresentation {
      case_id: "A-100".into(),
      details: legal_details(RepresentationStatus::NoLawyer),
    })
    .await
    .unwrap();

  let changes = LegalDetails {
    representation_status: RepresentationStatus::HasLawyer,
    attorney_name:         "Ana Ruiz".into(),
    organization:          "Catholic Charities".into(),
    hearing_date:          NaiveDate::from_ymd_opt(2025, 6, 2),
  };
  repo.update(id, changes.clone().into()).await.unwrap();

  let stored = repo.get(id).await.unwrap();
  assert_eq!(stored.case_id, "A-100");
  assert_eq!(stored.representation_status, changes.representation_status);
  assert_eq!(stored.attorney_name, "Ana Ruiz");
  assert_eq!(stored.hearing_date, changes.hearing_date);
}

// ─── Immigrants ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enrollment_links_all_three_records() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  let ids = s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();

  let immigrant = s.immigrants().get(ids.immigrant_id).await.unwrap();
  assert_eq!(immigrant.custody_id, Some(ids.custody_id));
  assert_eq!(immigrant.legal_id, Some(ids.legal_id));
  assert_eq!(s.custody().get(ids.custody_id).await.unwrap().case_id, "A-100");
  assert_eq!(s.legal().get(ids.legal_id).await.unwrap().case_id, "A-100");

  let roster = s.immigrants().roster().await.unwrap();
  assert_eq!(roster.len(), 1);
  assert_eq!(str_at(&roster[0], "country_name"), "Honduras");
  assert_eq!(str_at(&roster[0], "custody_type"), "Detained");
  assert_eq!(str_at(&roster[0], "representation_status"), "Has a lawyer");
}

#[tokio::test]
async fn failed_enrollment_leaves_nothing_behind() {
  let s = store().await;
  assert!(matches!(
    s.immigrants().enroll(enrollment("A-100", 77, 2021)).await,
    Err(Error::ReferentialIntegrity(_))
  ));
  assert!(s.custody().list(CustodyFilter::default()).await.unwrap().is_empty());
  assert!(s.immigrants().list(ImmigrantFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_case_id_is_rejected_before_insert() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();

  let again = NewImmigrant {
    case_id:      " A-100 ".into(),
    age:          20,
    gender:       "M".into(),
    country_id:   cid,
    custody_id:   None,
    legal_id:     None,
    arrival_year: 2022,
  };
  assert!(matches!(
    s.immigrants().create(again).await,
    Err(Error::Validation { field: "case_id", .. })
  ));
}

#[tokio::test]
async fn immigrant_update_keeps_case_id() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  let ids = s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();
  let repo = s.immigrants();

  let changes = ImmigrantChanges {
    case_id:      Some("A-100".into()),
    age:          35,
    gender:       "F".into(),
    country_id:   cid,
    custody_id:   Some(ids.custody_id),
    legal_id:     Some(ids.legal_id),
    arrival_year: 2020,
  };
  repo.update(ids.immigrant_id, changes.clone()).await.unwrap();
  assert_eq!(repo.get(ids.immigrant_id).await.unwrap().age, 35);

  let moved = ImmigrantChanges { case_id: Some("B-200".into()), ..changes };
  assert!(matches!(
    repo.update(ids.immigrant_id, moved).await,
    Err(Error::Validation { field: "case_id", .. })
  ));
  assert_eq!(repo.get(ids.immigrant_id).await.unwrap().case_id, "A-100");
}

#[tokio::test]
async fn custody_and_legal_updates_keep_case_id() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  let ids = s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();

  let custody = CustodyChanges {
    case_id: Some("A-100".into()),
    details: custody_details(CustodyType::Released, CustodyOutcome::Resolved),
  };
  s.custody().update(ids.custody_id, custody).await.unwrap();
  let moved = CustodyChanges {
    case_id: Some("B-200".into()),
    details: custody_details(CustodyType::Detained, CustodyOutcome::Removed),
  };
  assert!(matches!(
    s.custody().update(ids.custody_id, moved).await,
    Err(Error::Validation { field: "case_id", .. })
  ));
  let stored = s.custody().get(ids.custody_id).await.unwrap();
  assert_eq!(stored.case_id, "A-100");
  assert_eq!(stored.custody_type, CustodyType::Released);

  let moved = LegalChanges {
    case_id: Some("B-200".into()),
    details: legal_details(RepresentationStatus::NoLawyer),
  };
  assert!(matches!(
    s.legal().update(ids.legal_id, moved).await,
    Err(Error::Validation { field: "case_id", .. })
  ));
  let stored = s.legal().get(ids.legal_id).await.unwrap();
  assert_eq!(stored.case_id, "A-100");
  assert_eq!(stored.representation_status, RepresentationStatus::HasLawyer);
}

#[tokio::test]
async fn community_update_keeps_zip_and_state() {
  let s = store().await;
  let repo = s.communities();
  let id = repo.create(community("Westside", "78207", "TX", 100)).await.unwrap();

  let echoed = CommunityChanges {
    name:             "West Side".into(),
    zip_code:         Some("78207".into()),
    state_code:       Some("tx".into()),
    population:       150,
    foreign_born_pct: 22.0,
    rural:            false,
  };
  repo.update(id, echoed.clone()).await.unwrap();

  let moved = CommunityChanges {
    name: "Midtown".into(),
    zip_code: Some("10001".into()),
    state_code: Some("NY".into()),
    ..echoed
  };
  assert!(matches!(
    repo.update(id, moved).await,
    Err(Error::Validation { field: "zip_code", .. })
  ));
  let stored = repo.get(id).await.unwrap();
  assert_eq!(stored.name, "West Side");
  assert_eq!((stored.zip_code.as_str(), stored.state_code.as_str()), ("78207", "TX"));
}

#[tokio::test]
async fn immigrant_delete_cascades_by_case_id_only() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  let doomed = s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();
  let kept = s.immigrants().enroll(enrollment("B-200", cid, 2022)).await.unwrap();
  // A second custody record filed under the doomed case.
  s.custody()
    .create(NewCustodyStatus {
      case_id: "A-100".into(),
      details: custody_details(CustodyType::Released, CustodyOutcome::Resolved),
    })
    .await
    .unwrap();

  s.immigrants().delete(doomed.immigrant_id).await.unwrap();

  let custody = s.custody().list(CustodyFilter::default()).await.unwrap();
  assert_eq!(custody.len(), 1);
  assert_eq!(custody[0].custody_id, kept.custody_id);
  let legal = s.legal().list(Default::default()).await.unwrap();
  assert_eq!(legal.len(), 1);
  assert_eq!(legal[0].legal_id, kept.legal_id);
  let immigrants = s.immigrants().list(ImmigrantFilter::default()).await.unwrap();
  assert_eq!(immigrants.len(), 1);
  assert_eq!(immigrants[0].immigrant_id, kept.immigrant_id);
}

#[tokio::test]
async fn failed_cascade_step_rolls_back_earlier_steps() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  let ids = s.immigrants().enroll(enrollment("A-100", cid, 2021)).await.unwrap();

  s.database()
    .execute(
      "CREATE TRIGGER legal_locked BEFORE DELETE ON legal_representation
       BEGIN SELECT RAISE(ABORT, 'legal records are locked'); END",
      [],
    )
    .await
    .unwrap();

  match s.immigrants().delete(ids.immigrant_id).await {
    Err(Error::CascadeDelete { step, message }) => {
      assert_eq!(step, "legal_representation");
      assert!(message.contains("locked"));
    }
    other => panic!("expected cascade failure, got {other:?}"),
  }

  // The custody delete ran first and must have been rolled back.
  assert!(s.custody().get(ids.custody_id).await.is_ok());
  assert!(s.legal().get(ids.legal_id).await.is_ok());
  assert!(s.immigrants().get(ids.immigrant_id).await.is_ok());
}

#[tokio::test]
async fn immigrants_filter_by_country() {
  let s = store().await;
  let hn = s.countries().create(country("Honduras")).await.unwrap();
  let gt = s.countries().create(country("Guatemala")).await.unwrap();
  s.immigrants().enroll(enrollment("A-100", hn, 2021)).await.unwrap();
  s.immigrants().enroll(enrollment("B-200", gt, 2021)).await.unwrap();
  s.immigrants().enroll(enrollment("C-300", gt, 2022)).await.unwrap();

  let from_gt = s
    .immigrants()
    .list(ImmigrantFilter { country_id: Some(gt) })
    .await
    .unwrap();
  assert_eq!(from_gt.len(), 2);
  assert!(from_gt.iter().all(|i| i.country_id == gt));
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookups_follow_writes() {
  let s = store().await;
  let hn = s.countries().create(country("Honduras")).await.unwrap();
  assert_eq!(s.lookups().country_id("Honduras").await.unwrap(), Some(hn));
  assert_eq!(s.lookups().country_id("Guatemala").await.unwrap(), None);

  let gt = s.countries().create(country("Guatemala")).await.unwrap();
  assert_eq!(s.lookups().country_id("Guatemala").await.unwrap(), Some(gt));

  let names: Vec<_> = s
    .lookups()
    .countries()
    .await
    .unwrap()
    .into_iter()
    .map(|(_, name)| name)
    .collect();
  assert_eq!(names, ["Guatemala", "Honduras"]);

  let ids = s.immigrants().enroll(enrollment("A-100", hn, 2021)).await.unwrap();
  assert_eq!(s.lookups().custody_id("A-100").await.unwrap(), Some(ids.custody_id));
  assert_eq!(s.lookups().legal_id("A-100").await.unwrap(), Some(ids.legal_id));

  s.immigrants().delete(ids.immigrant_id).await.unwrap();
  assert_eq!(s.lookups().custody_id("A-100").await.unwrap(), None);
}

// ─── Analytics: dashboard ────────────────────────────────────────────────────

#[tokio::test]
async fn capacity_per_thousand_respects_threshold() {
  let s = store().await;
  let cid = s.communities().create(community("Westside", "78207", "TX", 1000)).await.unwrap();
  s.providers().create(provider(cid, "Casa", "legal_aid", 1)).await.unwrap();
  s.providers().create(provider(cid, "Words First", "ESL", 1)).await.unwrap();

  let below_five = s.analytics().capacity_below_threshold(5.0).await.unwrap();
  assert_eq!(below_five.len(), 1);
  assert_eq!(str_at(&below_five[0], "zip_code"), "78207");
  assert_eq!(i64_at(&below_five[0], "weekly_capacity"), 2);
  assert_eq!(f64_at(&below_five[0], "capacity_per_1000"), 2.0);

  assert!(s.analytics().capacity_below_threshold(1.0).await.unwrap().is_empty());
}

#[tokio::test]
async fn communities_without_providers_have_zero_capacity() {
  let s = store().await;
  s.communities().create(community("Eastside", "78202", "TX", 500)).await.unwrap();
  let rows = s.analytics().capacity_below_threshold(0.5).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(f64_at(&rows[0], "capacity_per_1000"), 0.0);
}

async fn seed_case(
  s: &SqliteStore,
  community_id: i64,
  provider_id: Option<i64>,
  case_type: &str,
  opened: &str,
  closed: Option<&str>,
) -> i64 {
  let status = if closed.is_some() { "closed" } else { "open" };
  s.database()
    .insert(
      "INSERT INTO intake_cases
         (case_type, community_id, provider_id, status, date_opened, date_closed)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      values![case_type, community_id, provider_id, status, opened, closed],
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn median_duration_uses_middle_values() {
  let s = store().await;
  let cid = s.communities().create(community("Westside", "78207", "TX", 100)).await.unwrap();
  for closed in ["2024-01-11", "2024-01-21", "2024-01-31"] {
    seed_case(&s, cid, None, "asylum", "2024-01-01", Some(closed)).await;
  }
  for closed in ["2024-02-11", "2024-02-21"] {
    seed_case(&s, cid, None, "visa", "2024-02-01", Some(closed)).await;
  }
  // Open cases do not count.
  seed_case(&s, cid, None, "visa", "2024-02-01", None).await;

  let rows = s.analytics().median_case_duration().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(str_at(&rows[0], "case_type"), "asylum");
  assert_eq!(f64_at(&rows[0], "median_days"), 20.0);
  assert_eq!(str_at(&rows[1], "case_type"), "visa");
  assert_eq!(f64_at(&rows[1], "median_days"), 15.0);
}

#[tokio::test]
async fn open_cases_older_than_threshold() {
  let s = store().await;
  let cid = s.communities().create(community("Westside", "78207", "TX", 100)).await.unwrap();
  let pid = s.providers().create(provider(cid, "Casa", "legal_aid", 5)).await.unwrap();

  let old = seed_case(&s, cid, Some(pid), "asylum", "2000-01-01", None).await;
  s.database()
    .execute(
      "INSERT INTO intake_cases (case_type, community_id, provider_id, date_opened)
       VALUES ('visa', ?1, ?2, date('now', '-5 days'))",
      values![cid, pid],
    )
    .await
    .unwrap();
  seed_case(&s, cid, Some(pid), "asylum", "2000-01-01", Some("2000-02-01")).await;

  let rows = s.analytics().open_cases_older_than(30).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(i64_at(&rows[0], "case_id"), old);
  assert_eq!(str_at(&rows[0], "provider_name"), "Casa");
  assert!(i64_at(&rows[0], "days_open") > 30);

  assert!(matches!(
    s.analytics().open_cases_older_than(-1).await,
    Err(Error::Validation { field: "min_days", .. })
  ));
}

#[tokio::test]
async fn attendance_is_reported_next_to_no_car_share() {
  let s = store().await;
  let cid = s.communities().create(community("Westside", "78207", "TX", 100)).await.unwrap();
  let case = seed_case(&s, cid, None, "asylum", "2024-01-01", None).await;
  for attended in [1, 1, 1, 0] {
    s.database()
      .execute(
        "INSERT INTO appointments (case_id, scheduled_at, attended_flag)
         VALUES (?1, '2024-03-01 10:00:00', ?2)",
        values![case, attended],
      )
      .await
      .unwrap();
  }
  s.database()
    .execute(
      "INSERT INTO demographics (zip_code, year, no_car_pct) VALUES ('78207', 2024, 12.5)",
      [],
    )
    .await
    .unwrap();

  let rows = s.analytics().attendance_vs_no_car(2024).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(f64_at(&rows[0], "attendance_rate"), 0.75);
  assert_eq!(f64_at(&rows[0], "no_car_pct"), 12.5);

  assert!(s.analytics().attendance_vs_no_car(2019).await.unwrap().is_empty());
}

#[tokio::test]
async fn quarterly_totals_check_the_quarter() {
  let s = store().await;
  for (kind, receipts) in [("N-400", 900), ("I-589", 300)] {
    s.database()
      .execute(
        "INSERT INTO case_stats_quarterly
           (fiscal_year, quarter_num, case_type, receipts, approvals, denials,
            pending_begin, pending_end, completed)
         VALUES (2025, 3, ?1, ?2, 10, 2, 50, 60, 12)",
        values![kind, receipts],
      )
      .await
      .unwrap();
  }

  let rows = s.analytics().quarterly_totals(2025, 3).await.unwrap();
  let kinds: Vec<_> = rows.iter().map(|r| str_at(r, "case_type")).collect();
  assert_eq!(kinds, ["I-589", "N-400"]);
  assert_eq!(i64_at(&rows[1], "receipts"), 900);

  assert!(s.analytics().quarterly_totals(2025, 2).await.unwrap().is_empty());
  assert!(matches!(
    s.analytics().quarterly_totals(2025, 5).await,
    Err(Error::Validation { field: "quarter", .. })
  ));
}

// ─── Analytics: desktop ──────────────────────────────────────────────────────

#[tokio::test]
async fn arrival_year_distribution_splits_evenly() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();
  for (case, year) in [("A-1", 2021), ("A-2", 2020), ("A-3", 2021), ("A-4", 2020)] {
    s.immigrants().enroll(enrollment(case, cid, year)).await.unwrap();
  }

  let rows = s.analytics().arrival_year_distribution().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(i64_at(&rows[0], "arrival_year"), 2020);
  assert_eq!(i64_at(&rows[1], "arrival_year"), 2021);
  for row in &rows {
    assert_eq!(i64_at(row, "total_arrivals"), 2);
    assert_eq!(f64_at(row, "arrival_pct"), 50.0);
  }
}

#[tokio::test]
async fn desktop_reports_group_by_custody_and_country() {
  let s = store().await;
  let hn = s.countries().create(country("Honduras")).await.unwrap();
  let gt = s.countries().create(country("Guatemala")).await.unwrap();

  s.immigrants().enroll(enrollment("A-1", hn, 2021)).await.unwrap();
  s.immigrants().enroll(enrollment("A-2", hn, 2021)).await.unwrap();
  let mut released = enrollment("B-1", gt, 2022);
  released.age = 20;
  released.custody = custody_details(CustodyType::Released, CustodyOutcome::Resolved);
  released.legal = legal_details(RepresentationStatus::NoLawyer);
  s.immigrants().enroll(released).await.unwrap();

  let by_custody = s.analytics().lawyer_rate_by_custody().await.unwrap();
  assert_eq!(by_custody.len(), 2);
  assert_eq!(str_at(&by_custody[0], "custody_type"), "Detained");
  assert_eq!(f64_at(&by_custody[0], "pct_with_lawyer"), 100.0);
  assert_eq!(f64_at(&by_custody[1], "pct_with_lawyer"), 0.0);

  let detention = s.analytics().top_detention_countries().await.unwrap();
  assert_eq!(str_at(&detention[0], "country_name"), "Honduras");
  assert_eq!(i64_at(&detention[0], "total_detained"), 2);
  assert_eq!(f64_at(&detention[0], "detention_rate"), 100.0);
  assert_eq!(i64_at(&detention[1], "total_detained"), 0);

  let ages = s.analytics().average_age_by_outcome().await.unwrap();
  assert_eq!(str_at(&ages[0], "custody_outcome"), "Pending");
  assert_eq!(f64_at(&ages[0], "average_age"), 34.0);
  assert_eq!(f64_at(&ages[1], "average_age"), 20.0);

  let lawyers = s.analytics().top_lawyer_countries().await.unwrap();
  assert_eq!(str_at(&lawyers[0], "country_name"), "Honduras");
  assert_eq!(i64_at(&lawyers[0], "with_lawyer"), 2);
  assert_eq!(f64_at(&lawyers[1], "lawyer_rate"), 0.0);
}

#[tokio::test]
async fn top_countries_are_capped_at_five() {
  let s = store().await;
  for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].into_iter().enumerate() {
    let cid = s.countries().create(country(name)).await.unwrap();
    s.immigrants().enroll(enrollment(&format!("C-{i}"), cid, 2021)).await.unwrap();
  }
  assert_eq!(s.analytics().top_detention_countries().await.unwrap().len(), 5);
  assert_eq!(s.analytics().top_lawyer_countries().await.unwrap().len(), 5);
}

// ─── Executor and connection ─────────────────────────────────────────────────

#[tokio::test]
async fn select_keeps_column_and_row_order() {
  let s = store().await;
  let rows = s
    .database()
    .select("SELECT 2 AS b, 'x' AS a UNION ALL SELECT 1, 'y'", [])
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["b", "a"]);
  assert_eq!(i64_at(&rows[0], "b"), 2);
  assert_eq!(str_at(&rows[1], "a"), "y");
}

#[tokio::test]
async fn execute_returns_id_only_for_inserts() {
  let s = store().await;
  let id = s
    .database()
    .execute(
      "INSERT INTO country_of_origin (country_name, region, major_language)
       VALUES ('Haiti', 'Caribbean', 'Haitian Creole')",
      [],
    )
    .await
    .unwrap();
  assert!(id.is_some());
  let none = s
    .database()
    .execute("UPDATE country_of_origin SET region = 'Caribbean'", [])
    .await
    .unwrap();
  assert_eq!(none, None);
}

#[tokio::test]
async fn replace_and_with_insert_report_their_ids() {
  let s = store().await;
  let db = s.database();
  let replaced = db
    .insert(
      "REPLACE INTO country_of_origin (country_id, country_name, region, major_language)
       VALUES (7, 'Haiti', 'Caribbean', 'Haitian Creole')",
      [],
    )
    .await
    .unwrap();
  assert_eq!(replaced, 7);

  let with_insert = db
    .insert(
      "WITH src(name) AS (SELECT 'Cuba')
       INSERT INTO country_of_origin (country_name, region, major_language)
       SELECT name, 'Caribbean', 'Spanish' FROM src",
      [],
    )
    .await
    .unwrap();
  assert_eq!(with_insert, 8);

  assert!(matches!(
    db.insert("DELETE FROM country_of_origin WHERE country_id = 7", []).await,
    Err(Error::Statement(_))
  ));
}

#[tokio::test]
async fn malformed_sql_is_a_statement_error() {
  let s = store().await;
  assert!(matches!(
    s.database().select("SELEC nothing", []).await,
    Err(Error::Statement(_))
  ));
}

#[tokio::test]
async fn closed_connection_is_reopened() {
  let path = std::env::temp_dir().join(format!("intake-{}.db", Uuid::new_v4()));
  let config = DbConfig { name: path.display().to_string(), ..DbConfig::default() };
  let s = SqliteStore::open(config).await.unwrap();
  let cid = s.countries().create(country("Honduras")).await.unwrap();

  // Close the shared handle behind the provider's back.
  let raw = s.database().provider().connection().await.unwrap();
  raw.close().await.unwrap();

  assert_eq!(s.countries().get(cid).await.unwrap().country_name, "Honduras");

  s.close().await.unwrap();
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

#[tokio::test]
async fn closed_in_memory_database_is_not_reopened_empty() {
  let s = store().await;
  let cid = s.countries().create(country("Honduras")).await.unwrap();

  let raw = s.database().provider().connection().await.unwrap();
  raw.close().await.unwrap();
  assert!(matches!(s.countries().get(cid).await, Err(Error::Connection(_))));

  s.close().await.unwrap();
  assert!(matches!(
    s.countries().list(Default::default()).await,
    Err(Error::Connection(_))
  ));
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn resync_sequence_reuses_freed_ids() {
  let s = store().await;
  let repo = s.countries();
  let first = repo.create(country("Honduras")).await.unwrap();
  let second = repo.create(country("Guatemala")).await.unwrap();
  repo.delete(second).await.unwrap();

  let next = s.resync_sequence(SequenceTable::CountryOfOrigin).await.unwrap();
  assert_eq!(next, first + 1);
  assert_eq!(repo.create(country("El Salvador")).await.unwrap(), second);

  assert_eq!(s.resync_sequence(SequenceTable::Immigrants).await.unwrap(), 1);
}
