//! Entity resolution: year-local `(code, name)` → stable cross-year identity.
//!
//! Resolution is an ordered list of pure matchers. Each either declines or
//! answers with a [`Resolution`]; the first answer wins. Nothing here ever
//! reassigns a link: the store only fills links that are still null.

use std::collections::{BTreeMap, HashMap};

use factbook_core::entity::{CanonicalEntity, EntityId, Resolution};
use tracing::debug;

use crate::rules::RuleSet;

/// Shorter side of a containment match must be at least this long.
const MIN_CONTAINMENT_LEN: usize = 4;

struct Known {
  id:   EntityId,
  name: String,
}

/// Lookup tables over the canonical entities, built once per run.
pub struct Resolver {
  known:        Vec<Known>,
  by_code:      HashMap<String, EntityId>,
  by_name:      HashMap<String, Vec<EntityId>>,
  by_bare_name: HashMap<String, Vec<EntityId>>,
  code_aliases: BTreeMap<String, String>,
  name_aliases: BTreeMap<String, String>,
}

/// One resolution request, normalised.
struct Query {
  code: Option<String>,
  name: String,
}

type Matcher = fn(&Resolver, &Query) -> Option<Resolution>;

const MATCHERS: &[(&str, Matcher)] = &[
  ("code", Resolver::match_code),
  ("exact name", Resolver::match_exact),
  ("article-stripped name", Resolver::match_bare),
  ("alias", Resolver::match_alias),
  ("containment", Resolver::match_containment),
];

impl Resolver {
  pub fn new(entities: &[CanonicalEntity], rules: &RuleSet) -> Self {
    let mut resolver = Self {
      known:        Vec::with_capacity(entities.len()),
      by_code:      HashMap::new(),
      by_name:      HashMap::new(),
      by_bare_name: HashMap::new(),
      code_aliases: rules.code_aliases.clone(),
      name_aliases: rules.name_aliases.clone(),
    };
    for entity in entities {
      let name = normalize_name(&entity.name);
      resolver.by_code.insert(entity.code.to_uppercase(), entity.entity_id);
      resolver
        .by_bare_name
        .entry(strip_article(&name).to_string())
        .or_default()
        .push(entity.entity_id);
      resolver.by_name.entry(name.clone()).or_default().push(entity.entity_id);
      resolver.known.push(Known { id: entity.entity_id, name });
    }
    resolver
  }

  /// Resolve one year-local identification. `code` should only be given for
  /// editions whose codes are stable; free-text editions pass `None`.
  pub fn resolve(&self, code: Option<&str>, name: &str) -> Resolution {
    let query = Query {
      code: code
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty()),
      name: normalize_name(name),
    };
    for (label, matcher) in MATCHERS {
      if let Some(resolution) = matcher(self, &query) {
        if let Resolution::Ambiguous(candidates) = &resolution {
          debug!(name, matcher = label, ?candidates, "ambiguous entity resolution");
        }
        return resolution;
      }
    }
    Resolution::Unresolved
  }

  // ── Matchers ──────────────────────────────────────────────────────────

  fn match_code(&self, query: &Query) -> Option<Resolution> {
    let code = query.code.as_deref()?;
    let code = self.code_aliases.get(code).map_or(code, String::as_str);
    self.by_code.get(code).map(|id| Resolution::Resolved(*id))
  }

  fn match_exact(&self, query: &Query) -> Option<Resolution> {
    hits(self.by_name.get(&query.name)?)
  }

  fn match_bare(&self, query: &Query) -> Option<Resolution> {
    hits(self.by_bare_name.get(strip_article(&query.name))?)
  }

  fn match_alias(&self, query: &Query) -> Option<Resolution> {
    let canonical = self.name_aliases.get(&query.name)?;
    hits(self.by_name.get(canonical)?)
  }

  fn match_containment(&self, query: &Query) -> Option<Resolution> {
    let key = query.name.as_str();
    let ids: Vec<EntityId> = self
      .known
      .iter()
      .filter(|k| {
        let (short, long) = if k.name.len() <= key.len() {
          (k.name.as_str(), key)
        } else {
          (key, k.name.as_str())
        };
        short.chars().count() >= MIN_CONTAINMENT_LEN && long.contains(short)
      })
      .map(|k| k.id)
      .collect();
    hits(&ids)
  }
}

fn hits(ids: &[EntityId]) -> Option<Resolution> {
  let mut ids = ids.to_vec();
  ids.sort_unstable();
  ids.dedup();
  match ids.len() {
    0 => None,
    1 => Some(Resolution::Resolved(ids[0])),
    _ => Some(Resolution::Ambiguous(ids)),
  }
}

fn normalize_name(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// `the gambia` / `gambia, the` → `gambia`.
fn strip_article(name: &str) -> &str {
  let name = name.strip_prefix("the ").unwrap_or(name);
  name.strip_suffix(", the").unwrap_or(name)
}

/// Year-local code for a free-text edition: the first two letters of the
/// name, lower-cased. Depends on nothing but the name, so a re-ingest
/// reproduces it whatever the entity table holds.
pub fn name_code(name: &str) -> String {
  let letters: String = name
    .chars()
    .filter(char::is_ascii_alphabetic)
    .take(2)
    .collect();
  if letters.len() == 2 {
    letters.to_lowercase()
  } else {
    name.chars().take(2).collect::<String>().to_lowercase()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use factbook_core::entity::EntityType;

  use super::*;

  fn entity(id: EntityId, code: &str, name: &str) -> CanonicalEntity {
    CanonicalEntity {
      entity_id:       id,
      code:            code.to_string(),
      name:            name.to_string(),
      alternate_code:  None,
      entity_type:     EntityType::Unknown,
      administered_by: None,
      created_at:      Utc::now(),
    }
  }

  fn resolver() -> Resolver {
    let entities = [
      entity(1, "US", "United States"),
      entity(2, "BF", "Bahamas, The"),
      entity(3, "BM", "Myanmar"),
      entity(4, "CG", "Congo, Democratic Republic of the"),
      entity(5, "CF", "Congo, Republic of the"),
      entity(6, "RI", "Serbia"),
      entity(7, "NI", "Nigeria"),
      entity(8, "NG", "Niger"),
    ];
    Resolver::new(&entities, &RuleSet::builtin())
  }

  #[test]
  fn stable_codes_resolve_directly() {
    let r = resolver();
    assert_eq!(r.resolve(Some("us"), "whatever"), Resolution::Resolved(1));
  }

  #[test]
  fn retired_code_follows_its_alias() {
    assert_eq!(resolver().resolve(Some("rb"), "Serbia"), Resolution::Resolved(6));
  }

  #[test]
  fn unknown_code_falls_back_to_the_name() {
    assert_eq!(resolver().resolve(Some("zz"), "Myanmar"), Resolution::Resolved(3));
  }

  #[test]
  fn exact_name_ignores_case_and_spacing() {
    assert_eq!(resolver().resolve(None, "  UNITED   states "), Resolution::Resolved(1));
  }

  #[test]
  fn leading_article_is_stripped() {
    assert_eq!(resolver().resolve(None, "The Bahamas"), Resolution::Resolved(2));
  }

  #[test]
  fn historical_names_use_the_alias_table() {
    let r = resolver();
    assert_eq!(r.resolve(None, "Burma"), Resolution::Resolved(3));
    assert_eq!(r.resolve(None, "Zaire"), Resolution::Resolved(4));
  }

  #[test]
  fn containment_with_one_hit_resolves() {
    assert_eq!(
      resolver().resolve(None, "United States of America"),
      Resolution::Resolved(1)
    );
  }

  #[test]
  fn containment_with_several_hits_is_ambiguous() {
    assert_eq!(resolver().resolve(None, "Congo"), Resolution::Ambiguous(vec![4, 5]));
  }

  #[test]
  fn prefix_names_do_not_collide_on_exact_match() {
    assert_eq!(resolver().resolve(None, "Niger"), Resolution::Resolved(8));
  }

  #[test]
  fn no_match_stays_unresolved() {
    let r = resolver();
    assert_eq!(r.resolve(None, "Atlantis"), Resolution::Unresolved);
    // Too short to trust a containment match.
    assert_eq!(r.resolve(None, "Con"), Resolution::Unresolved);
  }

  #[test]
  fn year_local_codes_come_from_the_name_alone() {
    assert_eq!(name_code("Burma"), "bu");
    assert_eq!(name_code("Virgin Islands"), "vi");
    assert_eq!(name_code("  'Ajman"), "aj");
    assert_eq!(name_code("X"), "x");
  }
}
