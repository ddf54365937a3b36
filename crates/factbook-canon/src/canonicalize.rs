//! Field name canonicalization: a priority-ordered rule engine evaluated once
//! per distinct raw field name. The first rule that matches wins.

use std::collections::BTreeSet;

use factbook_core::mapping::{FieldNameMapping, FieldNameStats, MappingType};
use regex::Regex;

use crate::{
  error::Result,
  rules::{NoiseThresholds, RuleSet},
  tables::GOV_BODY_CANONICAL,
};

pub struct Canonicalizer {
  rules:        RuleSet,
  thresholds:   NoiseThresholds,
  /// Names published in the modern editions; the identity set.
  modern_names: BTreeSet<String>,
  article:      Regex,
}

impl Canonicalizer {
  pub fn new(rules: RuleSet, modern_names: BTreeSet<String>) -> Result<Self> {
    Ok(Self {
      thresholds: rules.thresholds(),
      rules,
      modern_names,
      article: Regex::new(r"^Articles? \d")?,
    })
  }

  /// Map every distinct name. The output has exactly one row per input row.
  pub fn map_all(&self, stats: &[FieldNameStats]) -> Vec<FieldNameMapping> {
    stats.iter().map(|s| self.map(s)).collect()
  }

  pub fn map(&self, stats: &FieldNameStats) -> FieldNameMapping {
    let name = stats.name.as_str();

    // 1. identity
    if self.modern_names.contains(name) && !self.rules.renames.contains_key(name) {
      return FieldNameMapping::keep(stats, MappingType::Identity);
    }

    // 2. separator punctuation
    if let Some(normalized) = normalize_dashes(name) {
      let dash = FieldNameMapping::keep(stats, MappingType::DashFormat);
      if let Some(canonical) = self.rules.renames.get(&normalized) {
        return dash
          .to(canonical)
          .note(format!("dash -> {normalized} -> {canonical}"));
      }
      if self.modern_names.contains(&normalized) {
        return dash.note(format!("dash -> {normalized}")).to(normalized);
      }
      if let Some(target) = self.rules.consolidation.get(&normalized) {
        return dash
          .consolidated(target)
          .note(format!("dash -> {normalized} (consolidated)"))
          .to(normalized);
      }
    }

    // 3. known rename
    if let Some(canonical) = self.rules.renames.get(name) {
      return FieldNameMapping::keep(stats, MappingType::Rename).to(canonical);
    }

    // 4. consolidation
    if let Some(target) = self.rules.consolidation.get(name) {
      return FieldNameMapping::keep(stats, MappingType::Consolidation).consolidated(target);
    }

    // 5. country-specific bodies, regional entries, reference entries
    if self.is_gov_body(stats) {
      return FieldNameMapping::keep(stats, MappingType::CountrySpecific).to(GOV_BODY_CANONICAL);
    }
    if self.rules.regional_entries.contains(name) {
      return FieldNameMapping::keep(stats, MappingType::CountrySpecific).note("regional sub-entry");
    }
    if self.rules.misc_reference.contains(name) {
      return FieldNameMapping::keep(stats, MappingType::CountrySpecific).note("reference entry");
    }

    // 6. noise
    if self.is_noise(stats) {
      return FieldNameMapping::keep(stats, MappingType::Noise);
    }

    // 7. manual review
    FieldNameMapping::keep(stats, MappingType::Manual)
  }

  fn is_gov_body(&self, stats: &FieldNameStats) -> bool {
    stats.last_year <= self.thresholds.legacy_last_year
      && stats.use_count <= self.thresholds.max_gov_body_uses
      && self
        .rules
        .gov_body_keywords
        .iter()
        .any(|kw| stats.name.contains(kw.as_str()))
  }

  fn is_noise(&self, stats: &FieldNameStats) -> bool {
    let t = &self.thresholds;
    let name = stats.name.as_str();
    let len = name.chars().count();
    let uses = stats.use_count;
    let legacy = stats.last_year <= t.legacy_last_year;
    let lower = name.to_lowercase();
    let starts_lower = name.chars().next().is_some_and(char::is_lowercase);
    let has_letters = name.chars().any(char::is_alphabetic);

    (len <= t.max_short_len && has_letters && name.chars().all(char::is_alphabetic))
      || (name.ends_with('.') && len <= t.max_abbreviation_len)
      || (has_letters
        && !name.chars().any(char::is_lowercase)
        && len <= t.max_code_len
        && uses <= t.max_code_uses)
      || (starts_lower && uses <= t.max_lowercase_uses)
      || (len > t.min_prose_len && uses <= t.max_prose_uses)
      || self.rules.noise_phrases.iter().any(|p| lower.contains(p.as_str()))
      || name.starts_with("with run")
      || name.starts_with("with permanent")
      || self.article.is_match(name)
      || (name.contains(',') && uses <= t.max_list_uses && len > t.min_list_len)
      || self.rules.sub_field_labels.contains(name)
      || (legacy
        && uses <= t.max_party_uses
        && self.rules.party_keywords.iter().any(|kw| lower.contains(kw.as_str())))
      || (starts_lower && stats.first_year <= t.lowercase_era_end)
      || (legacy && uses <= t.max_legacy_uses && len < t.max_legacy_len)
      || name.starts_with("US--")
      || name.starts_with("US as ")
      || (name.contains("includes") && uses <= t.max_legacy_uses)
      || (name.ends_with(')') && legacy && uses <= t.max_list_uses)
  }
}

/// `Economy-overview` / `Economy--overview` → `Economy - overview`.
///
/// Splits at the first `--`, or the first `-` not preceded by a space, with
/// non-empty text on both sides. Returns `None` when there is no such dash.
pub fn normalize_dashes(name: &str) -> Option<String> {
  let mut prev: Option<char> = None;
  for (i, c) in name.char_indices() {
    if c == '-' && i > 0 {
      let rest = &name[i..];
      let width = if rest.starts_with("--") {
        2
      } else if prev != Some(' ') {
        1
      } else {
        prev = Some(c);
        continue;
      };
      let left = name[..i].trim();
      let right = name[i + width..].trim();
      if !right.is_empty() {
        return Some(format!("{left} - {right}"));
      }
    }
    prev = Some(c);
  }
  None
}
