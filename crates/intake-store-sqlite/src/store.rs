//! [`SqliteStore`] — the entry point front-ends hold on to.

use std::sync::Arc;

use intake_core::Result;

use crate::{
  analytics::Analytics,
  config::DbConfig,
  connection::ConnectionProvider,
  db::Database,
  lookup::LookupCache,
  maintenance::{self, SequenceTable},
  repos::{
    CommunityRepository, CountryRepository, CustodyRepository, ImmigrantRepository,
    LegalRepository, ServiceProviderRepository,
  },
};

/// Every repository and the analytics set, built over one shared
/// [`Database`].
///
/// Cloning is cheap; clones share the connection and the lookup cache.
#[derive(Clone)]
pub struct SqliteStore {
  db:      Database,
  lookups: Arc<LookupCache>,
}

impl SqliteStore {
  /// Build a store without touching the database. The connection opens on
  /// the first statement.
  pub fn new(config: DbConfig) -> Self {
    let db = Database::new(ConnectionProvider::new(config));
    let lookups = Arc::new(LookupCache::new(db.clone()));
    Self { db, lookups }
  }

  /// Build a store and open the connection now, so configuration problems
  /// surface immediately.
  pub async fn open(config: DbConfig) -> Result<Self> {
    let store = Self::new(config);
    store.db.provider().connection().await?;
    Ok(store)
  }

  /// Open a private in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> { Self::open(DbConfig::in_memory()).await }

  pub fn database(&self) -> &Database { &self.db }

  pub fn lookups(&self) -> &LookupCache { &self.lookups }

  // ─── Dashboard ───────────────────────────────────────────────────────────

  pub fn communities(&self) -> CommunityRepository { CommunityRepository::new(self.db.clone()) }

  pub fn providers(&self) -> ServiceProviderRepository {
    ServiceProviderRepository::new(self.db.clone())
  }

  // ─── Desktop ─────────────────────────────────────────────────────────────

  pub fn countries(&self) -> CountryRepository {
    CountryRepository::new(self.db.clone(), self.lookups.clone())
  }

  pub fn custody(&self) -> CustodyRepository {
    CustodyRepository::new(self.db.clone(), self.lookups.clone())
  }

  pub fn legal(&self) -> LegalRepository {
    LegalRepository::new(self.db.clone(), self.lookups.clone())
  }

  pub fn immigrants(&self) -> ImmigrantRepository {
    ImmigrantRepository::new(self.db.clone(), self.lookups.clone())
  }

  // ─── Reports and maintenance ─────────────────────────────────────────────

  pub fn analytics(&self) -> Analytics { Analytics::new(self.db.clone()) }

  pub async fn resync_sequence(&self, table: SequenceTable) -> Result<i64> {
    maintenance::resync_sequence(&self.db, table).await
  }

  pub async fn close(&self) -> Result<()> { self.db.close().await }
}
