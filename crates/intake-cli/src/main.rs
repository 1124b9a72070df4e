//! `intake` — command-line front-end for the immigrant-integration case
//! store.
//!
//! # Usage
//!
//! ```
//! intake community list --filter '{"state_code":"TX"}'
//! intake country create '{"country_name":"Honduras","region":"Central America",
//!                         "population_migrants":1000,"major_language":"Spanish"}'
//! intake report capacity-below-threshold --threshold 0.5
//! intake resync-ids immigrants
//! intake resync-ids
//! ```
//!
//! Database settings come from `DB_HOST`, `DB_PORT`, `DB_USER`,
//! `DB_PASSWORD` and `DB_NAME` (a `.env` file is honoured), layered over an
//! optional TOML file given with `--config`.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use intake_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "intake", version, about = "Immigrant-integration case store")]
struct Cli {
  /// Optional TOML file with `host`, `port`, `user`, `password`, `name`.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is fine.
  dotenvy::dotenv().ok();

  // Logs go to stderr so stdout stays pure JSON.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let db_config = settings::load(cli.config.as_deref(), None)
    .context("failed to load database settings")?;
  tracing::debug!(?db_config, "loaded database settings");

  let store = SqliteStore::open(db_config)
    .await
    .context("failed to open database")?;

  let result = commands::run(&store, cli.command).await;
  store.close().await.context("failed to close database")?;

  println!("{}", serde_json::to_string_pretty(&result?)?);
  Ok(())
}
