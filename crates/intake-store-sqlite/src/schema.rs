//! SQL schema for the intake SQLite store.
//!
//! Executed on every freshly opened connection. `PRAGMA foreign_keys` is a
//! per-connection setting, so it has to run each time; the tables are created
//! with `IF NOT EXISTS` and are left alone when already present.

/// Full schema DDL for both the dashboard and the desktop tables.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ─── Dashboard schema ───────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS communities (
    community_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL,
    zip_code         TEXT    NOT NULL CHECK (length(zip_code) = 5),
    state_code       TEXT    NOT NULL CHECK (length(state_code) = 2),
    population       INTEGER NOT NULL DEFAULT 0 CHECK (population >= 0),
    foreign_born_pct REAL    NOT NULL DEFAULT 0
                             CHECK (foreign_born_pct BETWEEN 0 AND 100),
    rural_flag       INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT    NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS service_providers (
    provider_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT    NOT NULL,
    provider_type     TEXT    NOT NULL,   -- free text: legal_aid, ESL, ...
    community_id      INTEGER NOT NULL REFERENCES communities(community_id),
    zip_code          TEXT    NOT NULL,
    capacity_per_week INTEGER NOT NULL DEFAULT 0 CHECK (capacity_per_week >= 0),
    accepts_pro_bono  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS intake_cases (
    case_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    case_type    TEXT    NOT NULL,
    community_id INTEGER NOT NULL REFERENCES communities(community_id),
    provider_id  INTEGER REFERENCES service_providers(provider_id),
    status       TEXT    NOT NULL DEFAULT 'open',   -- 'open' | 'closed'
    date_opened  TEXT    NOT NULL,                  -- YYYY-MM-DD
    date_closed  TEXT
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id        INTEGER NOT NULL REFERENCES intake_cases(case_id),
    scheduled_at   TEXT    NOT NULL,
    attended_flag  INTEGER NOT NULL DEFAULT 0
);

-- ACS survey figures per zip and year.
CREATE TABLE IF NOT EXISTS demographics (
    zip_code   TEXT    NOT NULL,
    year       INTEGER NOT NULL,
    no_car_pct REAL    CHECK (no_car_pct BETWEEN 0 AND 100),
    PRIMARY KEY (zip_code, year)
);

CREATE TABLE IF NOT EXISTS case_stats_quarterly (
    fiscal_year   INTEGER NOT NULL,
    quarter_num   INTEGER NOT NULL CHECK (quarter_num BETWEEN 1 AND 4),
    case_type     TEXT    NOT NULL,
    receipts      INTEGER,
    approvals     INTEGER,
    denials       INTEGER,
    pending_begin INTEGER,
    pending_end   INTEGER,
    completed     INTEGER,
    PRIMARY KEY (fiscal_year, quarter_num, case_type)
);

-- ─── Desktop schema ─────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS country_of_origin (
    country_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    country_name        TEXT    NOT NULL UNIQUE,
    region              TEXT    NOT NULL,
    population_migrants INTEGER NOT NULL DEFAULT 0 CHECK (population_migrants >= 0),
    major_language      TEXT    NOT NULL
);

-- case_id is free text; it is not a foreign key to immigrants.case_id.
CREATE TABLE IF NOT EXISTS custody_status (
    custody_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id            TEXT    NOT NULL,
    custody_type       TEXT    NOT NULL
                       CHECK (custody_type IN ('Detained', 'Never Detained', 'Released')),
    detention_facility TEXT    NOT NULL,
    release_date       TEXT,
    custody_outcome    TEXT    NOT NULL
                       CHECK (custody_outcome IN ('Pending', 'Resolved', 'Awaiting Hearing',
                                                  'Asylum Granted', 'Removed'))
);

CREATE TABLE IF NOT EXISTS legal_representation (
    legal_id              INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id               TEXT    NOT NULL,
    representation_status TEXT    NOT NULL
                          CHECK (representation_status IN ('Has a lawyer', 'No lawyer')),
    attorney_name         TEXT    NOT NULL,
    organization          TEXT    NOT NULL,
    hearing_date          TEXT
);

-- The custody and legal references are checked at commit so the cascading
-- delete can remove the dependents before the immigrant row.
CREATE TABLE IF NOT EXISTS immigrants (
    immigrant_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id      TEXT    NOT NULL UNIQUE,
    age          INTEGER NOT NULL CHECK (age >= 0),
    gender       TEXT    NOT NULL,
    country_id   INTEGER NOT NULL REFERENCES country_of_origin(country_id),
    custody_id   INTEGER REFERENCES custody_status(custody_id)
                 DEFERRABLE INITIALLY DEFERRED,
    legal_id     INTEGER REFERENCES legal_representation(legal_id)
                 DEFERRABLE INITIALLY DEFERRED,
    arrival_year INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS providers_community_idx ON service_providers(community_id);
CREATE INDEX IF NOT EXISTS cases_community_idx     ON intake_cases(community_id);
CREATE INDEX IF NOT EXISTS appointments_case_idx   ON appointments(case_id);
CREATE INDEX IF NOT EXISTS custody_case_idx        ON custody_status(case_id);
CREATE INDEX IF NOT EXISTS legal_case_idx          ON legal_representation(case_id);
CREATE INDEX IF NOT EXISTS immigrants_country_idx  ON immigrants(country_id);

PRAGMA user_version = 1;
";
