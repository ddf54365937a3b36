//! `factbook` binary.
//!
//! Reads `factbook.toml` (or the path given with `--config`), opens the SQLite
//! archive and runs one pipeline stage.
//!
//! ```sh
//! factbook run
//! factbook ingest --year 1995 --year 2005
//! factbook query --field Population --entity "United States" --sub total
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use factbook_cli::{DirSource, Pipeline, Settings};
use factbook_core::{store::CanonicalQuery, validate::CheckOutcome};
use factbook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "World Factbook archive pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "factbook.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Seed canonical entities from the code-stable editions.
  Bootstrap,
  /// Parse and persist years, one transaction per year.
  Ingest {
    /// Year to ingest; repeatable. Defaults to every year on disk.
    #[arg(long = "year")]
    years: Vec<i32>,
  },
  /// Rebuild the field name mappings.
  Canonicalize,
  /// Rebuild sub-values.
  Decompose {
    #[arg(long = "year")]
    years: Vec<i32>,
  },
  /// Classify canonical entities.
  Classify,
  /// Run the advisory validator.
  Validate,
  /// Print one canonical field for one entity, ordered by year.
  Query {
    /// Canonical field name.
    #[arg(long)]
    field:        String,
    /// Canonical entity name.
    #[arg(long)]
    entity:       String,
    /// Print the numeric series of one sub-value instead.
    #[arg(long)]
    sub:          Option<String>,
    /// Include raw names consolidated under the field.
    #[arg(long)]
    consolidated: bool,
  },
  /// bootstrap, ingest, canonicalize, decompose, validate.
  Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let db_path = expand_tilde(&settings.database);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;
  let source = DirSource::new(expand_tilde(&settings.raw_dir));
  let pipeline = Pipeline::new(store, source, settings)?;

  match cli.command {
    Command::Bootstrap => {
      pipeline.bootstrap().await?;
    }
    Command::Ingest { years } => {
      let report = pipeline.ingest(&years).await?;
      if !report.failed.is_empty() {
        anyhow::bail!("ingest failed for {:?}", report.failed);
      }
    }
    Command::Canonicalize => {
      pipeline.canonicalize().await?;
    }
    Command::Decompose { years } => {
      pipeline.decompose(&years).await?;
    }
    Command::Classify => {
      pipeline.classify().await?;
    }
    Command::Validate => print_outcomes(&pipeline.validate().await?),
    Command::Query { field, entity, sub, consolidated } => {
      let points = pipeline
        .query(CanonicalQuery {
          field,
          entity,
          sub_field: sub,
          include_consolidated: consolidated,
        })
        .await?;
      for point in points {
        println!("{}", serde_json::to_string(&point)?);
      }
    }
    Command::Run => print_outcomes(&pipeline.run().await?),
  }

  Ok(())
}

/// Checks are advisory: failures are printed, never turned into an error.
fn print_outcomes(outcomes: &[CheckOutcome]) {
  for outcome in outcomes {
    let verdict = if outcome.passed { "PASS" } else { "FAIL" };
    println!("{verdict}  {:<28} {}", outcome.name, outcome.detail);
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
