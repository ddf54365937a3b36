//! Run settings: an optional TOML file layered under `FACTBOOK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use factbook_canon::RuleSet;
use factbook_core::validate::ValidationConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite file.
  pub database:        PathBuf,
  /// Local mirror written by the fetcher, one directory per year.
  pub raw_dir:         PathBuf,
  /// Concurrent year workers during ingest.
  pub workers:         usize,
  /// Max chars captured by the whole-document fallback.
  pub fallback_cap:    usize,
  /// Max chars of a decomposed text value.
  pub text_value_cap:  usize,
  /// Editions whose field names are treated as already canonical.
  pub modern_years:    Vec<i32>,
  /// Code-stable editions used to seed canonical entities.
  pub bootstrap_years: Vec<i32>,
  /// JSON file extending the built-in rule tables.
  pub rules:           Option<PathBuf>,
  pub validation:      ValidationConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database:        PathBuf::from("factbook.db"),
      raw_dir:         PathBuf::from("raw"),
      workers:         4,
      fallback_cap:    100_000,
      text_value_cap:  4_000,
      modern_years:    vec![2024, 2025],
      bootstrap_years: vec![2025],
      rules:           None,
      validation:      ValidationConfig::default(),
    }
  }
}

impl Settings {
  /// Load `path` if it exists, then apply `FACTBOOK_*` overrides
  /// (`FACTBOOK_VALIDATION__MIN_ENTITIES` for nested keys).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("FACTBOOK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  /// The built-in rule tables, extended by the configured rules file.
  pub fn rule_set(&self) -> anyhow::Result<RuleSet> {
    let builtin = RuleSet::builtin();
    let Some(path) = &self.rules else {
      return Ok(builtin);
    };
    let json = std::fs::read_to_string(path)
      .with_context(|| format!("reading rules file {}", path.display()))?;
    let extra = RuleSet::from_json(&json)
      .with_context(|| format!("parsing rules file {}", path.display()))?;
    Ok(builtin.extend(extra))
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.workers, 4);
    assert_eq!(settings.bootstrap_years, vec![2025]);
    assert_eq!(settings.validation.min_entities, 180);
  }

  #[test]
  fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      "database = \"archive.db\"\nworkers = 2\nmodern_years = [2020]\n\n[validation]\nmin_entities = 5"
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.database, PathBuf::from("archive.db"));
    assert_eq!(settings.workers, 2);
    assert_eq!(settings.modern_years, vec![2020]);
    assert_eq!(settings.validation.min_entities, 5);
    assert_eq!(settings.validation.max_entity_delta, 10);
    assert_eq!(settings.fallback_cap, 100_000);
  }

  #[test]
  fn rules_file_extends_builtins() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"renames": {{"Odd name": "Climate"}}}}"#).unwrap();

    let settings = Settings { rules: Some(file.path().to_path_buf()), ..Settings::default() };
    let rules = settings.rule_set().unwrap();
    assert_eq!(rules.renames.get("Odd name").map(String::as_str), Some("Climate"));
    assert!(rules.renames.len() > 1);
  }
}
