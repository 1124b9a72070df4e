//! Database connection settings.
//!
//! The five fields mirror the environment variables `DB_HOST`, `DB_PORT`,
//! `DB_USER`, `DB_PASSWORD` and `DB_NAME`; every field has a default so an
//! empty environment still yields a usable configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Sentinel database name that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
  pub host:     String,
  pub port:     u16,
  pub user:     String,
  pub password: String,
  /// Database name. Selects the SQLite file `<name>.db`, or is used as a
  /// path verbatim when it has an extension or a directory component.
  pub name:     String,
}

impl Default for DbConfig {
  fn default() -> Self {
    Self {
      host:     "127.0.0.1".to_string(),
      port:     3306,
      user:     "root".to_string(),
      password: String::new(),
      name:     "immigrant_integration".to_string(),
    }
  }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for DbConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DbConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("user", &self.user)
      .field("password", &"<redacted>")
      .field("name", &self.name)
      .finish()
  }
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  Memory,
  File(PathBuf),
}

impl DbConfig {
  pub fn in_memory() -> Self {
    Self { name: IN_MEMORY.to_string(), ..Self::default() }
  }

  pub fn location(&self) -> Location {
    if self.name == IN_MEMORY {
      return Location::Memory;
    }
    let path = PathBuf::from(&self.name);
    if path.extension().is_some() || path.components().count() > 1 {
      Location::File(path)
    } else {
      Location::File(path.with_extension("db"))
    }
  }
}
