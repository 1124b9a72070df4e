//! [`Database`] — the query executor every repository is built on.
//!
//! Statements run on the connection's dedicated thread via
//! [`tokio_rusqlite`]. Outside [`Database::transaction`] each statement is
//! committed on its own (SQLite autocommit).

use std::sync::Arc;

use intake_core::{Error, Record, Result, Value};
use rusqlite::{OptionalExtension as _, Row, params_from_iter, types::Value as SqlValue};
use tracing::warn;

use crate::{
  connection::ConnectionProvider,
  encode::{from_sql, to_sql},
  error::{classify, classify_sqlite},
};

// ─── Row decoding ────────────────────────────────────────────────────────────

/// Decode a typed value from one result row.
pub trait FromRow: Sized + Send + 'static {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Single-column integer results such as `COUNT(*)` or `MAX(id)`.
impl FromRow for i64 {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> { row.get(0) }
}

// ─── Executor ────────────────────────────────────────────────────────────────

/// Cheap to clone; all clones share one [`ConnectionProvider`].
#[derive(Clone)]
pub struct Database {
  provider: Arc<ConnectionProvider>,
}

impl Database {
  pub fn new(provider: ConnectionProvider) -> Self {
    Self { provider: Arc::new(provider) }
  }

  pub fn provider(&self) -> &ConnectionProvider { &self.provider }

  /// Run `f` on the connection thread. If the cached connection turns out to
  /// be closed, reopen it once and retry. In-memory databases are not
  /// reopened.
  pub(crate) async fn call<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Clone
      + Send
      + 'static,
    R: Send + 'static,
  {
    let conn = self.provider.connection().await?;
    match conn.call(f.clone()).await {
      Err(tokio_rusqlite::Error::ConnectionClosed) => {
        warn!("database connection was closed; reopening");
        self.provider.invalidate().await;
        let conn = self.provider.connection().await?;
        conn.call(f).await.map_err(classify)
      }
      other => other.map_err(classify),
    }
  }

  /// Run a read-only statement and return every row as a [`Record`], in the
  /// order the engine produced them.
  pub async fn select(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<Vec<Record>> {
    let sql = sql.into();
    let params = bind(params);

    self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();

        let rows = stmt
          .query_map(params_from_iter(params.iter()), |row| {
            names
              .iter()
              .enumerate()
              .map(|(i, name)| Ok((name.clone(), from_sql(row.get_ref(i)?))))
              .collect::<rusqlite::Result<Record>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  /// Run a read-only statement and decode every row as `T`.
  pub async fn select_as<T: FromRow>(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<Vec<T>> {
    let sql = sql.into();
    let params = bind(params);

    self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params.iter()), T::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  /// Like [`select_as`](Self::select_as) but for at most one row.
  pub async fn select_one_as<T: FromRow>(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<Option<T>> {
    let sql = sql.into();
    let params = bind(params);

    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, params_from_iter(params.iter()), T::from_row)
            .optional()?,
        )
      })
      .await
  }

  /// Run a mutating statement and commit it. Returns the generated row id
  /// when the statement inserted a row (`INSERT`, `REPLACE`, or either
  /// behind a `WITH` clause) and `None` otherwise.
  ///
  /// An insert is recognised by the connection's last row id moving, so an
  /// insert that reproduces the previous last id reads as `None`.
  pub async fn execute(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<Option<i64>> {
    let sql = sql.into();
    let params = bind(params);

    self
      .call(move |conn| {
        let before = conn.last_insert_rowid();
        let changed = conn.execute(&sql, params_from_iter(params.iter()))?;
        let after = conn.last_insert_rowid();
        Ok((changed > 0 && after != before).then_some(after))
      })
      .await
  }

  /// Run an `INSERT` and return the generated id.
  pub async fn insert(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<i64> {
    self
      .execute(sql, params)
      .await?
      .ok_or_else(|| Error::Statement("statement did not insert a row".to_string()))
  }

  /// Run a mutating statement and return the number of rows it touched.
  pub async fn execute_affected(
    &self,
    sql: impl Into<String>,
    params: impl IntoIterator<Item = Value>,
  ) -> Result<usize> {
    let sql = sql.into();
    let params = bind(params);

    self
      .call(move |conn| Ok(conn.execute(&sql, params_from_iter(params.iter()))?))
      .await
  }

  /// Run `f` inside one transaction. It commits when `f` returns `Ok` and
  /// rolls back otherwise, so no partial effect is ever visible.
  pub async fn transaction<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<R>
      + Clone
      + Send
      + 'static,
    R: Send + 'static,
  {
    let outcome = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping `tx` rolls back.
          Err(e) => Ok(Err(e)),
        }
      })
      .await?;
    outcome.map_err(classify_sqlite)
  }

  /// Close the connection. For a file database the next statement
  /// transparently reopens it; an in-memory database stays closed.
  pub async fn close(&self) -> Result<()> { self.provider.close().await }
}

fn bind(params: impl IntoIterator<Item = Value>) -> Vec<SqlValue> {
  params.into_iter().map(to_sql).collect()
}
