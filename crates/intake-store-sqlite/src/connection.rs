//! [`ConnectionProvider`] — lazily opens and caches the process's single
//! database connection.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use intake_core::{Error, Result};

use crate::{
  config::{DbConfig, Location},
  schema::SCHEMA,
};

/// Owns the configuration and the one live connection built from it.
///
/// The first call to [`connection`](Self::connection) opens the database and
/// runs schema initialisation; later calls hand out clones of the same
/// handle. After [`invalidate`](Self::invalidate) the next call reopens.
///
/// An in-memory database is never reopened: its contents die with the
/// connection, so a fresh empty one would silently replace them. Once an
/// in-memory connection is gone every call fails with
/// [`Error::Connection`].
pub struct ConnectionProvider {
  config: DbConfig,
  slot:   Mutex<Option<tokio_rusqlite::Connection>>,
  opened: AtomicBool,
}

impl ConnectionProvider {
  pub fn new(config: DbConfig) -> Self {
    Self { config, slot: Mutex::new(None), opened: AtomicBool::new(false) }
  }

  /// Return the cached connection, opening it on first use.
  pub async fn connection(&self) -> Result<tokio_rusqlite::Connection> {
    let mut slot = self.slot.lock().await;
    if let Some(conn) = slot.as_ref() {
      return Ok(conn.clone());
    }
    if self.opened.load(Ordering::Acquire) && self.config.location() == Location::Memory {
      warn!("in-memory database was closed; refusing to reopen it empty");
      return Err(Error::Connection(
        "in-memory database was closed and its contents are gone".to_string(),
      ));
    }
    let conn = self.open().await?;
    self.opened.store(true, Ordering::Release);
    *slot = Some(conn.clone());
    Ok(conn)
  }

  /// Forget the cached connection so the next caller reopens it.
  pub async fn invalidate(&self) {
    if self.slot.lock().await.take().is_some() {
      debug!(database = %self.config.name, "dropped cached connection");
    }
  }

  /// Close the cached connection, if any.
  pub async fn close(&self) -> Result<()> {
    let Some(conn) = self.slot.lock().await.take() else {
      return Ok(());
    };
    conn
      .close()
      .await
      .map_err(|e| Error::Connection(e.to_string()))?;
    info!(database = %self.config.name, "closed database");
    Ok(())
  }

  async fn open(&self) -> Result<tokio_rusqlite::Connection> {
    let location = self.config.location();
    let conn = match &location {
      Location::Memory => tokio_rusqlite::Connection::open_in_memory().await,
      Location::File(path) => tokio_rusqlite::Connection::open(path).await,
    }
    .map_err(|e| Error::Connection(format!("failed to open {location:?}: {e}")))?;

    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(|e| Error::Connection(format!("schema initialisation failed: {e}")))?;

    info!(
      host = %self.config.host,
      port = self.config.port,
      user = %self.config.user,
      location = ?location,
      "opened database"
    );
    Ok(conn)
  }
}
