//! Validator vocabulary: per-check verdicts and the thresholds that drive them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One named, advisory verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
  pub name:   String,
  pub passed: bool,
  pub detail: String,
}

impl CheckOutcome {
  pub fn pass(name: &str, detail: impl Into<String>) -> Self {
    Self {
      name:   name.to_string(),
      passed: true,
      detail: detail.into(),
    }
  }

  pub fn fail(name: &str, detail: impl Into<String>) -> Self {
    Self {
      name:   name.to_string(),
      passed: false,
      detail: detail.into(),
    }
  }

  pub fn from_failures(name: &str, ok_detail: &str, failures: Vec<String>) -> Self {
    if failures.is_empty() {
      Self::pass(name, ok_detail)
    } else {
      Self::fail(name, failures.join("; "))
    }
  }
}

/// Thresholds and ground-truth benchmarks used by the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
  pub min_entities:              u64,
  pub min_sections_per_entity:   f64,
  pub min_fields_per_entity:     f64,
  pub max_entity_delta:          u64,
  /// Fractional change in field count between consecutive years.
  pub max_field_delta:           f64,
  pub max_empty_ratio:           f64,
  pub min_completeness:          f64,
  /// Expected US population in millions, by year.
  pub us_population_millions:    BTreeMap<i32, f64>,
  pub us_population_tolerance:   f64,
  pub china_population_range:    (f64, f64),
  /// Years where the source format changes; large deltas there are expected.
  pub era_boundaries:            Vec<i32>,
}

impl Default for ValidationConfig {
  fn default() -> Self {
    let us_population_millions = [
      (2000, 275.0),
      (2005, 295.0),
      (2010, 310.0),
      (2015, 321.0),
      (2020, 332.0),
      (2025, 338.0),
    ]
    .into_iter()
    .collect();

    Self {
      min_entities: 180,
      min_sections_per_entity: 3.0,
      min_fields_per_entity: 10.0,
      max_entity_delta: 10,
      max_field_delta: 0.15,
      max_empty_ratio: 0.05,
      min_completeness: 0.5,
      us_population_millions,
      us_population_tolerance: 10.0,
      china_population_range: (1.1e9, 1.5e9),
      era_boundaries: vec![
        1991, 1992, 1993, 1995, 1996, 1997, 1999, 2000, 2001, 2002, 2009, 2015,
        2018, 2021,
      ],
    }
  }
}
