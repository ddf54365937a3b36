//! Curated rule tables shared by the resolver, classifier and canonicalizer.
//!
//! A [`RuleSet`] is immutable configuration: built once per run (from the
//! built-in tables, optionally extended by a JSON rules file) and passed by
//! reference into every constructor that needs it.

use std::collections::{BTreeMap, BTreeSet};

use factbook_core::entity::EntityType;
use serde::{Deserialize, Serialize};

use crate::{error::Result, tables};

/// Empirical cut-offs for the noise heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseThresholds {
  /// Alphabetic names this short are noise regardless of usage.
  pub max_short_len:        usize,
  /// `avdp.`, `c.i.f.` and other abbreviations up to this length.
  pub max_abbreviation_len: usize,
  pub max_code_len:         usize,
  pub max_code_uses:        u64,
  pub max_lowercase_uses:   u64,
  /// Lower-case names first seen up to this year are noise at any usage.
  pub lowercase_era_end:    i32,
  pub min_prose_len:        usize,
  pub max_prose_uses:       u64,
  pub min_list_len:         usize,
  pub max_list_uses:        u64,
  /// Names last seen up to this year count as legacy.
  pub legacy_last_year:     i32,
  pub max_party_uses:       u64,
  pub max_legacy_uses:      u64,
  pub max_legacy_len:       usize,
  pub max_gov_body_uses:    u64,
}

impl Default for NoiseThresholds {
  fn default() -> Self {
    Self {
      max_short_len:        2,
      max_abbreviation_len: 6,
      max_code_len:         4,
      max_code_uses:        5,
      max_lowercase_uses:   10,
      lowercase_era_end:    1998,
      min_prose_len:        80,
      max_prose_uses:       3,
      min_list_len:         40,
      max_list_uses:        3,
      legacy_last_year:     2001,
      max_party_uses:       10,
      max_legacy_uses:      5,
      max_legacy_len:       40,
      max_gov_body_uses:    100,
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
  pub renames:                  BTreeMap<String, String>,
  pub consolidation:            BTreeMap<String, String>,
  pub gov_body_keywords:        Vec<String>,
  pub noise_phrases:            Vec<String>,
  pub party_keywords:           Vec<String>,
  pub sub_field_labels:         BTreeSet<String>,
  pub regional_entries:         BTreeSet<String>,
  pub misc_reference:           BTreeSet<String>,
  /// Upper-case retired code → modern code.
  pub code_aliases:             BTreeMap<String, String>,
  /// Lower-case historical name → lower-case canonical name.
  pub name_aliases:             BTreeMap<String, String>,
  pub classification_overrides: BTreeMap<String, EntityType>,
  /// Lower-case power name as written in dependency text → entity code.
  pub administering_powers:     BTreeMap<String, String>,
  /// Canonical code → alternate standard code.
  pub alternate_codes:          BTreeMap<String, String>,
  pub noise:                    Option<NoiseThresholds>,
}

fn pairs(table: &[(&str, &str)]) -> BTreeMap<String, String> {
  table
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn strings<C: FromIterator<String>>(table: &[&str]) -> C {
  table.iter().map(|s| s.to_string()).collect()
}

impl RuleSet {
  /// The curated tables compiled into the binary.
  pub fn builtin() -> Self {
    Self {
      renames:                  pairs(tables::KNOWN_RENAMES),
      consolidation:            pairs(tables::CONSOLIDATION),
      gov_body_keywords:        strings(tables::GOV_BODY_KEYWORDS),
      noise_phrases:            strings(tables::NOISE_PHRASES),
      party_keywords:           strings(tables::PARTY_KEYWORDS),
      sub_field_labels:         strings(tables::SUB_FIELD_LABELS),
      regional_entries:         strings(tables::REGIONAL_ENTRIES),
      misc_reference:           strings(tables::MISC_REFERENCE),
      code_aliases:             pairs(tables::CODE_ALIASES),
      name_aliases:             pairs(tables::NAME_ALIASES),
      classification_overrides: tables::CLASSIFICATION_OVERRIDES
        .iter()
        .map(|(code, ty)| (code.to_string(), *ty))
        .collect(),
      administering_powers:     pairs(tables::ADMINISTERING_POWERS),
      alternate_codes:          BTreeMap::new(),
      noise:                    Some(NoiseThresholds::default()),
    }
  }

  /// Parse a (partial) rule set from JSON. Missing tables are empty.
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  /// Layer `other` over `self`: map entries in `other` win, lists and sets
  /// are unioned, thresholds are replaced when `other` names them.
  pub fn extend(mut self, other: RuleSet) -> Self {
    self.renames.extend(other.renames);
    self.consolidation.extend(other.consolidation);
    union_vec(&mut self.gov_body_keywords, other.gov_body_keywords);
    union_vec(&mut self.noise_phrases, other.noise_phrases);
    union_vec(&mut self.party_keywords, other.party_keywords);
    self.sub_field_labels.extend(other.sub_field_labels);
    self.regional_entries.extend(other.regional_entries);
    self.misc_reference.extend(other.misc_reference);
    self.code_aliases.extend(
      other
        .code_aliases
        .into_iter()
        .map(|(k, v)| (k.to_uppercase(), v.to_uppercase())),
    );
    self.name_aliases.extend(
      other
        .name_aliases
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v.to_lowercase())),
    );
    self.classification_overrides.extend(other.classification_overrides);
    self.administering_powers.extend(other.administering_powers);
    self.alternate_codes.extend(other.alternate_codes);
    if other.noise.is_some() {
      self.noise = other.noise;
    }
    self
  }

  pub fn thresholds(&self) -> NoiseThresholds { self.noise.unwrap_or_default() }
}

fn union_vec(into: &mut Vec<String>, from: Vec<String>) {
  for item in from {
    if !into.contains(&item) {
      into.push(item);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_tables_are_populated() {
    let rules = RuleSet::builtin();
    assert_eq!(
      rules.renames.get("GDP - real growth rate").map(String::as_str),
      Some("Real GDP growth rate")
    );
    assert_eq!(
      rules.consolidation.get("Oil - production").map(String::as_str),
      Some("Petroleum")
    );
    assert_eq!(rules.code_aliases.get("RB").map(String::as_str), Some("RI"));
    assert_eq!(
      rules.classification_overrides.get("HK"),
      Some(&EntityType::SpecialAdmin)
    );
    assert!(rules.sub_field_labels.contains("chief of state"));
  }

  #[test]
  fn extension_overrides_and_unions() {
    let extra = RuleSet::from_json(
      r#"{
        "renames": { "GDP": "Gross domestic product", "Birthrate": "Birth rate" },
        "noise_phrases": ["as follows", "see appendix"],
        "code_aliases": { "zr": "cg" },
        "alternate_codes": { "US": "US", "UK": "GB" },
        "noise": { "max_short_len": 3 }
      }"#,
    )
    .unwrap();
    let rules = RuleSet::builtin().extend(extra);

    assert_eq!(rules.renames["GDP"], "Gross domestic product");
    assert_eq!(rules.renames["Birthrate"], "Birth rate");
    assert_eq!(
      rules.noise_phrases.iter().filter(|p| *p == "as follows").count(),
      1
    );
    assert!(rules.noise_phrases.iter().any(|p| p == "see appendix"));
    assert_eq!(rules.code_aliases["ZR"], "CG");
    assert_eq!(rules.alternate_codes["UK"], "GB");
    assert_eq!(rules.thresholds().max_short_len, 3);
    assert_eq!(rules.thresholds().max_code_uses, 5);
  }

  #[test]
  fn malformed_rules_are_an_error() {
    assert!(RuleSet::from_json(r#"{ "renames": [1, 2] }"#).is_err());
  }
}
