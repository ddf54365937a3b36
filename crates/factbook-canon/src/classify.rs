//! Entity classification from the latest "Dependency status" and
//! "Government type" text, with curated per-code overrides.

use std::collections::BTreeMap;

use factbook_core::{entity::EntityType, store::ClassificationInput};
use regex::Regex;

use crate::{error::Result, rules::RuleSet};

const TERRITORY_KEYWORDS: &[&str] = &[
  "territory",
  "dependency",
  "overseas",
  "unincorporated",
  "self-governing",
  "crown",
  "collectivity",
  "constituent",
  "special municipality",
  "country within",
];

const FREE_ASSOCIATION_KEYWORDS: &[&str] = &["free association", "freely associated"];

const SOVEREIGN_KEYWORDS: &[&str] = &[
  "republic",
  "monarchy",
  "kingdom",
  "democracy",
  "federation",
  "parliamentary",
  "presidential",
  "communist",
  "theocra",
  "socialist",
  "constitutional",
  "emirate",
  "sultanate",
  "oligarch",
  "authoritarian",
  "military",
  "transitional",
  "single-party",
  "dictatorship",
];

/// Reason strings quote at most this much of the source text.
const REASON_QUOTE: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  pub entity_type:     EntityType,
  /// Human-readable provenance of the verdict.
  pub reason:          String,
  /// Code of the administering entity named in the dependency text.
  pub administered_by: Option<String>,
}

pub struct Classifier {
  overrides: BTreeMap<String, EntityType>,
  powers:    BTreeMap<String, String>,
  power:     Regex,
}

impl Classifier {
  pub fn new(rules: &RuleSet) -> Result<Self> {
    let mut names: Vec<&str> = rules.administering_powers.keys().map(String::as_str).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternation = names
      .iter()
      .map(|n| regex::escape(n))
      .collect::<Vec<_>>()
      .join("|");
    Ok(Self {
      overrides: rules.classification_overrides.clone(),
      powers:    rules.administering_powers.clone(),
      power:     Regex::new(&format!(r"(?i)\b(?:of|with|by)\s+(?:the\s+)?({alternation})\b"))?,
    })
  }

  pub fn classify(&self, input: &ClassificationInput) -> Classification {
    let dependency = input.dependency_status.as_deref().unwrap_or_default().trim();
    let government = input.government_type.as_deref().unwrap_or_default().trim();
    let administered_by = self.administering_power(dependency);
    let verdict = |entity_type, reason: String| Classification {
      entity_type,
      reason,
      administered_by: administered_by.clone(),
    };

    if let Some(entity_type) = self.overrides.get(&input.code.to_uppercase()) {
      return verdict(*entity_type, "override".to_string());
    }

    let dep = dependency.to_lowercase();
    if !dep.is_empty() {
      let quoted = format!("dep: {}", quote(dependency));
      if TERRITORY_KEYWORDS.iter().any(|kw| dep.contains(kw)) {
        return verdict(EntityType::Territory, quoted);
      }
      if FREE_ASSOCIATION_KEYWORDS.iter().any(|kw| dep.contains(kw)) {
        return verdict(EntityType::FreelyAssociated, quoted);
      }
      if dep != "none" && dep != "n/a" {
        return verdict(EntityType::Territory, quoted);
      }
    }

    if !government.is_empty() {
      let gov = government.to_lowercase();
      let reason = if SOVEREIGN_KEYWORDS.iter().any(|kw| gov.contains(kw)) {
        format!("gov: {}", quote(government))
      } else {
        format!("gov (default): {}", quote(government))
      };
      return verdict(EntityType::Sovereign, reason);
    }

    verdict(EntityType::Unknown, "no gov/dep data".to_string())
  }

  fn administering_power(&self, dependency: &str) -> Option<String> {
    let caps = self.power.captures(dependency)?;
    self.powers.get(&caps[1].to_lowercase()).cloned()
  }
}

fn quote(text: &str) -> &str {
  match text.char_indices().nth(REASON_QUOTE) {
    Some((i, _)) => &text[..i],
    None => text,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(code: &str, dependency: Option<&str>, government: Option<&str>) -> ClassificationInput {
    ClassificationInput {
      entity_id: 1,
      code: code.to_string(),
      name: code.to_string(),
      dependency_status: dependency.map(str::to_string),
      government_type: government.map(str::to_string),
    }
  }

  fn classifier() -> Classifier { Classifier::new(&RuleSet::builtin()).unwrap() }

  #[test]
  fn overrides_win() {
    let c = classifier().classify(&input("hk", None, Some("presidential limited democracy")));
    assert_eq!(c.entity_type, EntityType::SpecialAdmin);
    assert_eq!(c.reason, "override");
  }

  #[test]
  fn dependency_text_marks_a_territory_and_its_administrator() {
    let c = classifier().classify(&input(
      "gq",
      Some("unincorporated organized territory of the US"),
      None,
    ));
    assert_eq!(c.entity_type, EntityType::Territory);
    assert_eq!(c.administered_by.as_deref(), Some("US"));

    let c = classifier().classify(&input(
      "fp",
      Some("overseas collectivity of France since 2003"),
      None,
    ));
    assert_eq!(c.administered_by.as_deref(), Some("FR"));
  }

  #[test]
  fn free_association() {
    let c = classifier().classify(&input(
      "cw",
      Some("self-governing in free association with New Zealand"),
      None,
    ));
    // "self-governing" is checked first.
    assert_eq!(c.entity_type, EntityType::Territory);
    assert_eq!(c.administered_by.as_deref(), Some("NZ"));

    let c = classifier().classify(&input("xy", Some("in free association with the US"), None));
    assert_eq!(c.entity_type, EntityType::FreelyAssociated);
  }

  #[test]
  fn government_type_marks_a_sovereign() {
    let c = classifier().classify(&input("fr", None, Some("semi-presidential republic")));
    assert_eq!(c.entity_type, EntityType::Sovereign);
    assert!(c.reason.starts_with("gov: "));

    let c = classifier().classify(&input("zz9", Some("none"), Some("transitional government")));
    assert_eq!(c.entity_type, EntityType::Sovereign);
    assert!(c.reason.starts_with("gov: "));

    let c = classifier().classify(&input("zz9", None, Some("in transition")));
    assert!(c.reason.starts_with("gov (default): "));
  }

  #[test]
  fn no_text_is_unknown() {
    let c = classifier().classify(&input("qq", None, None));
    assert_eq!(c.entity_type, EntityType::Unknown);
    assert_eq!(c.administered_by, None);
  }

  #[test]
  fn reasons_are_bounded() {
    let long = "territory ".repeat(20);
    let c = classifier().classify(&input("qq", Some(&long), None));
    assert_eq!(c.reason.chars().count(), "dep: ".len() + REASON_QUOTE);
  }
}
