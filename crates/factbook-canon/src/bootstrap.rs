//! Seeding canonical entities from the code-stable editions.

use std::collections::BTreeMap;

use factbook_core::entity::NewEntity;

const JUNK_NAMES: &[&str] = &["cia", "unknown", "central intelligence agency"];

fn is_junk(name: &str) -> bool {
  let name = name.trim();
  name.is_empty() || JUNK_NAMES.iter().any(|j| name.eq_ignore_ascii_case(j))
}

/// One entity per distinct (upper-cased) code, named with the best non-junk
/// name seen for it. Longer names win; ties keep the first seen. Codes with
/// only junk names are dropped.
pub fn seed_entities<'a, I>(candidates: I) -> Vec<NewEntity>
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  let mut best: BTreeMap<String, &'a str> = BTreeMap::new();
  for (code, name) in candidates {
    let code = code.trim().to_uppercase();
    if code.is_empty() || is_junk(name) {
      continue;
    }
    let name = name.trim();
    best
      .entry(code)
      .and_modify(|current| {
        if name.chars().count() > current.chars().count() {
          *current = name;
        }
      })
      .or_insert(name);
  }
  best
    .into_iter()
    .map(|(code, name)| NewEntity::new(code, name))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_entity_per_code_with_the_best_name() {
    let seeded = seed_entities([
      ("us", "Unknown"),
      ("us", "United States"),
      ("US", "US"),
      ("bm", "Burma"),
      ("xx", "CIA"),
      ("", "Nowhere"),
    ]);
    assert_eq!(
      seeded,
      vec![NewEntity::new("BM", "Burma"), NewEntity::new("US", "United States")]
    );
  }
}
