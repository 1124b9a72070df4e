//! Layered database settings: built-in defaults, then an optional TOML file,
//! then `DB_*` environment variables.

use std::{collections::HashMap, path::Path};

use config::{Config, ConfigError, Environment, File};
use intake_store_sqlite::DbConfig;

/// Build the [`DbConfig`] for this process.
///
/// A missing file is not an error. `env` replaces the process environment
/// when given, which keeps the layering testable.
pub fn load(
  file: Option<&Path>,
  env: Option<HashMap<String, String>>,
) -> Result<DbConfig, ConfigError> {
  let mut builder = Config::builder();
  if let Some(path) = file {
    builder = builder.add_source(File::from(path).required(false));
  }
  builder
    .add_source(Environment::with_prefix("DB").try_parsing(true).source(env))
    .build()?
    .try_deserialize()
}
