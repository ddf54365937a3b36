//! Read-only validator checks.
//!
//! [`Snapshot::load`] gathers every aggregate the checks need in one
//! connection call; the checks themselves are pure functions over it.
//! Outcomes are advisory and never touch the data.

use std::collections::BTreeMap;

use factbook_core::{
  record::Provenance,
  validate::{CheckOutcome, ValidationConfig},
};

use crate::{Result, SqliteStore, encode::decode_provenance};

/// How many offending items a failure detail quotes.
const SAMPLE: usize = 5;

const US_CODE: &str = "US";
const CHINA_CODE: &str = "CH";

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct YearStats {
  pub records:      u64,
  pub sections:     u64,
  pub fields:       u64,
  pub empty_fields: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
  pub years:            BTreeMap<i32, YearStats>,
  /// `(year, provenance tag, records)`.
  pub provenance:       Vec<(i32, String, u64)>,
  pub us_population:    Vec<(i32, f64)>,
  pub china_population: Vec<(i32, f64)>,
  pub fields_without_values: u64,
  pub fragment_overflows: Vec<i64>,
  pub unmapped_names:   Vec<String>,
  pub content_chars:    u64,
  pub fragment_chars:   u64,
}

fn count(n: i64) -> u64 { u64::try_from(n).unwrap_or_default() }

const POPULATION_SQL: &str = "
SELECT r.year, MAX(s.numeric_value)
  FROM sub_values s
  JOIN fields f       ON f.field_id = s.field_id
  JOIN year_records r ON r.record_id = f.record_id
  JOIN entities e     ON e.entity_id = r.entity_id
  LEFT JOIN field_name_mappings m ON m.original_name = f.name
 WHERE e.code = ?1
   AND COALESCE(m.canonical_name, f.name) = 'Population'
   AND s.sub_field = 'total'
   AND s.numeric_value IS NOT NULL
 GROUP BY r.year
 ORDER BY r.year";

impl Snapshot {
  pub(crate) async fn load(store: &SqliteStore) -> Result<Self> {
    let snapshot = store
      .connection()
      .call(|conn| {
        let mut snap = Snapshot::default();

        // ── Per-year structure ──
        let mut stmt = conn.prepare("SELECT year, COUNT(*) FROM year_records GROUP BY year")?;
        for row in stmt.query_map([], |r| Ok((r.get::<_, i32>(0)?, r.get::<_, i64>(1)?)))? {
          let (year, n) = row?;
          snap.years.entry(year).or_default().records = count(n);
        }
        let mut stmt = conn.prepare(
          "SELECT r.year, COUNT(*) FROM sections s
             JOIN year_records r ON r.record_id = s.record_id
            GROUP BY r.year",
        )?;
        for row in stmt.query_map([], |r| Ok((r.get::<_, i32>(0)?, r.get::<_, i64>(1)?)))? {
          let (year, n) = row?;
          snap.years.entry(year).or_default().sections = count(n);
        }
        let mut stmt = conn.prepare(
          "SELECT r.year, COUNT(*), SUM(TRIM(f.content) = '') FROM fields f
             JOIN year_records r ON r.record_id = f.record_id
            GROUP BY r.year",
        )?;
        for row in stmt.query_map([], |r| {
          Ok((r.get::<_, i32>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?))
        })? {
          let (year, n, empty) = row?;
          let stats = snap.years.entry(year).or_default();
          stats.fields = count(n);
          stats.empty_fields = count(empty);
        }

        let mut stmt = conn.prepare(
          "SELECT year, provenance, COUNT(*) FROM year_records
            GROUP BY year, provenance ORDER BY year",
        )?;
        snap.provenance = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, count(r.get(2)?))))?
          .collect::<rusqlite::Result<_>>()?;

        // ── Benchmarks ──
        let mut stmt = conn.prepare(POPULATION_SQL)?;
        snap.us_population = stmt
          .query_map([US_CODE], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<_>>()?;
        snap.china_population = stmt
          .query_map([CHINA_CODE], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<_>>()?;

        // ── Derived-data invariants ──
        snap.fields_without_values = count(conn.query_row(
          "SELECT COUNT(*) FROM fields f
            WHERE NOT EXISTS (SELECT 1 FROM sub_values s WHERE s.field_id = f.field_id)",
          [],
          |r| r.get(0),
        )?);

        let mut stmt = conn.prepare(
          "SELECT f.field_id FROM fields f
             JOIN sub_values s ON s.field_id = f.field_id
            GROUP BY f.field_id
           HAVING SUM(LENGTH(COALESCE(s.source_fragment, ''))) > LENGTH(f.content)
            ORDER BY f.field_id",
        )?;
        snap.fragment_overflows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<_>>()?;

        let mut stmt = conn.prepare(
          "SELECT DISTINCT f.name FROM fields f
             LEFT JOIN field_name_mappings m ON m.original_name = f.name
            WHERE m.original_name IS NULL
            ORDER BY f.name",
        )?;
        snap.unmapped_names = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<_>>()?;

        let (content, fragments): (i64, i64) = conn.query_row(
          "SELECT COALESCE(SUM(LENGTH(f.content)), 0),
                  COALESCE(SUM((SELECT SUM(LENGTH(s.source_fragment))
                                  FROM sub_values s WHERE s.field_id = f.field_id)), 0)
             FROM fields f",
          [],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        snap.content_chars = count(content);
        snap.fragment_chars = count(fragments);

        Ok(snap)
      })
      .await?;
    Ok(snapshot)
  }

  pub(crate) fn checks(
    &self,
    config: &ValidationConfig,
    expected_provenance: &BTreeMap<i32, Provenance>,
  ) -> Result<Vec<CheckOutcome>> {
    Ok(vec![
      self.structural_counts(config),
      self.us_population(config),
      self.china_population(config),
      self.year_over_year_entities(config),
      self.field_count_smoothness(config),
      self.provenance_tags(expected_provenance)?,
      self.empty_content_ratio(config),
      self.subvalue_totality(),
      self.fragment_bound(),
      self.mapping_coverage(),
      self.parse_completeness(config),
    ])
  }

  fn structural_counts(&self, config: &ValidationConfig) -> CheckOutcome {
    let mut failures = Vec::new();
    for (year, stats) in &self.years {
      let per_record = |n: u64| n as f64 / stats.records.max(1) as f64;
      if stats.records < config.min_entities {
        failures.push(format!("{year}: {} entities", stats.records));
      }
      if per_record(stats.sections) < config.min_sections_per_entity {
        failures.push(format!("{year}: {:.1} sections/entity", per_record(stats.sections)));
      }
      if per_record(stats.fields) < config.min_fields_per_entity {
        failures.push(format!("{year}: {:.1} fields/entity", per_record(stats.fields)));
      }
    }
    CheckOutcome::from_failures(
      "structural_counts",
      &format!("{} years meet minimum counts", self.years.len()),
      failures,
    )
  }

  fn us_population(&self, config: &ValidationConfig) -> CheckOutcome {
    let mut failures = Vec::new();
    let mut checked = 0;
    for (year, value) in &self.us_population {
      let Some(expected) = config.us_population_millions.get(year) else { continue };
      checked += 1;
      let millions = value / 1e6;
      if (millions - expected).abs() > config.us_population_tolerance {
        failures.push(format!("{year}: {millions:.1}M, expected {expected:.0}M"));
      }
    }
    CheckOutcome::from_failures(
      "benchmark_us_population",
      &format!("{checked} benchmark years within tolerance"),
      failures,
    )
  }

  fn china_population(&self, config: &ValidationConfig) -> CheckOutcome {
    let (low, high) = config.china_population_range;
    let failures = self
      .china_population
      .iter()
      .filter(|(_, value)| *value < low || *value > high)
      .map(|(year, value)| format!("{year}: {value:.0}"))
      .collect();
    CheckOutcome::from_failures(
      "benchmark_china_population",
      &format!("{} years in range", self.china_population.len()),
      failures,
    )
  }

  fn year_over_year_entities(&self, config: &ValidationConfig) -> CheckOutcome {
    let years: Vec<_> = self.years.iter().collect();
    let failures = years
      .windows(2)
      .filter_map(|pair| {
        let ((a, sa), (b, sb)) = (pair[0], pair[1]);
        let delta = sa.records.abs_diff(sb.records);
        (delta > config.max_entity_delta).then(|| format!("{a}→{b}: {delta}"))
      })
      .collect();
    CheckOutcome::from_failures("year_over_year_entities", "entity counts are smooth", failures)
  }

  fn field_count_smoothness(&self, config: &ValidationConfig) -> CheckOutcome {
    let years: Vec<_> = self.years.iter().collect();
    let mut failures = Vec::new();
    let mut expected_jumps = Vec::new();
    for pair in years.windows(2) {
      let ((a, sa), (b, sb)) = (pair[0], pair[1]);
      if sa.fields == 0 {
        continue;
      }
      let change = sa.fields.abs_diff(sb.fields) as f64 / sa.fields as f64;
      if change <= config.max_field_delta {
        continue;
      }
      let line = format!("{a}→{b}: {:.0}%", change * 100.0);
      if config.era_boundaries.contains(b) {
        expected_jumps.push(line);
      } else {
        failures.push(line);
      }
    }
    let ok = if expected_jumps.is_empty() {
      "field counts are smooth".to_string()
    } else {
      format!("jumps only at era boundaries: {}", expected_jumps.join("; "))
    };
    CheckOutcome::from_failures("field_count_smoothness", &ok, failures)
  }

  fn provenance_tags(&self, expected: &BTreeMap<i32, Provenance>) -> Result<CheckOutcome> {
    let mut failures = Vec::new();
    for (year, tag, records) in &self.provenance {
      let actual = decode_provenance(tag)?;
      if let Some(want) = expected.get(year)
        && *want != actual
      {
        failures.push(format!("{year}: {records} {actual} records, expected {want}"));
      }
    }
    Ok(CheckOutcome::from_failures(
      "provenance_tags",
      "every record carries its era's provenance",
      failures,
    ))
  }

  fn empty_content_ratio(&self, config: &ValidationConfig) -> CheckOutcome {
    let fields: u64 = self.years.values().map(|s| s.fields).sum();
    let empty: u64 = self.years.values().map(|s| s.empty_fields).sum();
    let ratio = empty as f64 / fields.max(1) as f64;
    let detail = format!("{empty}/{fields} empty ({:.2}%)", ratio * 100.0);
    if ratio <= config.max_empty_ratio {
      CheckOutcome::pass("empty_content_ratio", detail)
    } else {
      CheckOutcome::fail("empty_content_ratio", detail)
    }
  }

  fn subvalue_totality(&self) -> CheckOutcome {
    match self.fields_without_values {
      0 => CheckOutcome::pass("subvalue_totality", "every field has a sub-value"),
      n => CheckOutcome::fail("subvalue_totality", format!("{n} fields without sub-values")),
    }
  }

  fn fragment_bound(&self) -> CheckOutcome {
    let failures = sample(&self.fragment_overflows, "fields over bound");
    CheckOutcome::from_failures("fragment_bound", "fragments within content", failures)
  }

  fn mapping_coverage(&self) -> CheckOutcome {
    let failures = sample(&self.unmapped_names, "raw names unmapped");
    CheckOutcome::from_failures("mapping_coverage", "every raw name is mapped", failures)
  }

  fn parse_completeness(&self, config: &ValidationConfig) -> CheckOutcome {
    if self.content_chars == 0 {
      return CheckOutcome::pass("parse_completeness", "no content");
    }
    let ratio = self.fragment_chars as f64 / self.content_chars as f64;
    let detail = format!("{:.1}% of content captured in fragments", ratio * 100.0);
    if ratio >= config.min_completeness {
      CheckOutcome::pass("parse_completeness", detail)
    } else {
      CheckOutcome::fail("parse_completeness", detail)
    }
  }
}

/// One failure line: total count plus the first few offenders.
fn sample<T: std::fmt::Display>(items: &[T], what: &str) -> Vec<String> {
  if items.is_empty() {
    return Vec::new();
  }
  let shown: Vec<String> = items.iter().take(SAMPLE).map(ToString::to_string).collect();
  vec![format!("{} {what} (e.g. {})", items.len(), shown.join(", "))]
}

#[cfg(test)]
mod tests {
  use super::*;

  fn year(records: u64, sections: u64, fields: u64) -> YearStats {
    YearStats { records, sections, fields, empty_fields: 0 }
  }

  fn outcome<'a>(outcomes: &'a [CheckOutcome], name: &str) -> &'a CheckOutcome {
    outcomes.iter().find(|o| o.name == name).unwrap()
  }

  fn healthy() -> Snapshot {
    Snapshot {
      years: [(2019, year(260, 2600, 26000)), (2020, year(262, 2620, 26500))]
        .into_iter()
        .collect(),
      provenance: vec![(2019, "html".into(), 260), (2020, "html".into(), 262)],
      us_population: vec![(2020, 332_639_102.0)],
      china_population: vec![(2020, 1_394_015_977.0)],
      content_chars: 1000,
      fragment_chars: 800,
      ..Snapshot::default()
    }
  }

  fn html_years() -> BTreeMap<i32, Provenance> {
    [(2019, Provenance::Html), (2020, Provenance::Html)].into_iter().collect()
  }

  #[test]
  fn healthy_archive_passes_everything() {
    let outcomes = healthy().checks(&ValidationConfig::default(), &html_years()).unwrap();
    assert_eq!(outcomes.len(), 11);
    for o in &outcomes {
      assert!(o.passed, "{}: {}", o.name, o.detail);
    }
  }

  #[test]
  fn benchmarks_catch_bad_populations() {
    let mut snap = healthy();
    snap.us_population = vec![(2020, 3_326_391.0)];
    snap.china_population = vec![(2020, 13_940.0)];
    let outcomes = snap.checks(&ValidationConfig::default(), &html_years()).unwrap();
    assert!(!outcome(&outcomes, "benchmark_us_population").passed);
    assert!(!outcome(&outcomes, "benchmark_china_population").passed);
  }

  #[test]
  fn field_jumps_at_era_boundaries_are_reported_not_failed() {
    let mut snap = healthy();
    snap.years = [(2008, year(260, 2600, 26000)), (2009, year(262, 2620, 40000))]
      .into_iter()
      .collect();
    snap.provenance.clear();
    let outcomes = snap.checks(&ValidationConfig::default(), &BTreeMap::new()).unwrap();
    let smooth = outcome(&outcomes, "field_count_smoothness");
    assert!(smooth.passed);
    assert!(smooth.detail.contains("2008→2009"));

    snap.years = [(2010, year(260, 2600, 26000)), (2011, year(262, 2620, 40000))]
      .into_iter()
      .collect();
    let outcomes = snap.checks(&ValidationConfig::default(), &BTreeMap::new()).unwrap();
    assert!(!outcome(&outcomes, "field_count_smoothness").passed);
  }

  #[test]
  fn provenance_mismatch_fails() {
    let mut snap = healthy();
    snap.provenance.push((2020, "text".into(), 3));
    let outcomes = snap.checks(&ValidationConfig::default(), &html_years()).unwrap();
    let tags = outcome(&outcomes, "provenance_tags");
    assert!(!tags.passed);
    assert!(tags.detail.contains("expected html"));
  }

  #[test]
  fn derived_invariants() {
    let mut snap = healthy();
    snap.fields_without_values = 2;
    snap.fragment_overflows = vec![7];
    snap.unmapped_names = vec!["Orphan".into()];
    snap.fragment_chars = 100;
    let outcomes = snap.checks(&ValidationConfig::default(), &html_years()).unwrap();
    for name in ["subvalue_totality", "fragment_bound", "mapping_coverage", "parse_completeness"] {
      assert!(!outcome(&outcomes, name).passed, "{name}");
    }
  }

  #[test]
  fn thin_years_fail_structural_counts() {
    let mut snap = healthy();
    snap.years.insert(2021, year(12, 12, 40));
    let outcomes = snap.checks(&ValidationConfig::default(), &BTreeMap::new()).unwrap();
    let counts = outcome(&outcomes, "structural_counts");
    assert!(!counts.passed);
    assert!(counts.detail.contains("2021: 12 entities"));
    assert!(!outcome(&outcomes, "year_over_year_entities").passed);
  }
}
