//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use factbook_core::{
  entity::{EntityType, NewEntity, Resolution},
  mapping::{FieldNameMapping, MappingType},
  parsed::{ParsedField, ParsedSection},
  record::Provenance,
  store::{CanonicalQuery, FactbookStore, NewYearRecord, YearBatch},
  subvalue::SubValue,
  validate::ValidationConfig,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(code: &str, name: &str, resolution: Resolution, fields: &[(&str, &str)]) -> NewYearRecord {
  NewYearRecord {
    code:          code.into(),
    name:          name.into(),
    provenance:    Provenance::Html,
    resolution,
    source_digest: Some(format!("digest-{code}")),
    sections:      vec![ParsedSection {
      title:  Some("People and Society".into()),
      fields: fields.iter().map(|(n, c)| ParsedField::new(*n, *c)).collect(),
    }],
  }
}

fn batch(year: i32, records: Vec<NewYearRecord>) -> YearBatch { YearBatch { year, records } }

fn mapping(original: &str, canonical: &str, mapping_type: MappingType) -> FieldNameMapping {
  FieldNameMapping {
    original_name: original.into(),
    canonical_name: canonical.into(),
    mapping_type,
    consolidated_to: None,
    is_noise: mapping_type == MappingType::Noise,
    first_year: 2005,
    last_year: 2006,
    use_count: 1,
    notes: None,
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_entity_never_rewrites_an_existing_code() {
  let s = store().await;
  let first = s.upsert_entity(NewEntity::new("us", "United States")).await.unwrap();
  let again = s.upsert_entity(NewEntity::new("US", "USA")).await.unwrap();

  assert_eq!(first.entity_id, again.entity_id);
  assert_eq!(again.name, "United States");
  assert_eq!(again.entity_type, EntityType::Unknown);
  assert_eq!(s.list_entities().await.unwrap().len(), 1);
}

#[tokio::test]
async fn classify_sets_type_and_administrator() {
  let s = store().await;
  let us = s.upsert_entity(NewEntity::new("US", "United States")).await.unwrap();
  s.upsert_entity(NewEntity::new("GQ", "Guam")).await.unwrap();

  s.classify_entity("GQ".into(), EntityType::Territory, Some("US".into()))
    .await
    .unwrap();
  s.set_alternate_code("GQ".into(), "GU".into()).await.unwrap();

  let guam = s
    .list_entities()
    .await
    .unwrap()
    .into_iter()
    .find(|e| e.code == "GQ")
    .unwrap();
  assert_eq!(guam.entity_type, EntityType::Territory);
  assert_eq!(guam.administered_by, Some(us.entity_id));
  assert_eq!(guam.alternate_code.as_deref(), Some("GU"));

  assert!(
    s.classify_entity("ZZ".into(), EntityType::Sovereign, None)
      .await
      .is_err()
  );
}

#[tokio::test]
async fn classification_inputs_use_the_latest_year() {
  let s = store().await;
  let gq = s.upsert_entity(NewEntity::new("GQ", "Guam")).await.unwrap();
  let linked = Resolution::Resolved(gq.entity_id);

  s.replace_year(batch(
    2005,
    vec![record("gq", "Guam", linked.clone(), &[("Dependency status", "old text")])],
  ))
  .await
  .unwrap();
  s.replace_year(batch(
    2006,
    vec![record(
      "gq",
      "Guam",
      linked,
      &[("Dependency status", "unincorporated territory of the US")],
    )],
  ))
  .await
  .unwrap();

  let inputs = s.classification_inputs().await.unwrap();
  assert_eq!(inputs.len(), 1);
  assert_eq!(
    inputs[0].dependency_status.as_deref(),
    Some("unincorporated territory of the US")
  );
  assert_eq!(inputs[0].government_type, None);
}

// ─── Year replacement ────────────────────────────────────────────────────────

#[tokio::test]
async fn reingest_is_idempotent() {
  let s = store().await;
  let make = || {
    batch(
      2005,
      vec![
        record("us", "United States", Resolution::Unresolved, &[
          ("Area", "total: 9,826,630 sq km | land: 9,161,923 sq km"),
          ("Climate", "mostly temperate"),
        ]),
        record("ch", "China", Resolution::Unresolved, &[("Climate", "extremely diverse")]),
      ],
    )
  };

  let first = s.replace_year(make()).await.unwrap();
  let contents_before: Vec<_> =
    s.fields_for_year(2005).await.unwrap().into_iter().map(|f| f.content).collect();
  let second = s.replace_year(make()).await.unwrap();
  let contents_after: Vec<_> =
    s.fields_for_year(2005).await.unwrap().into_iter().map(|f| f.content).collect();

  assert_eq!(first.records, 2);
  assert_eq!(first.fields, 3);
  assert_eq!((first.records, first.sections, first.fields), (
    second.records,
    second.sections,
    second.fields
  ));
  assert_eq!(contents_before, contents_after);
  assert_eq!(s.year_records(2005).await.unwrap().len(), 2);
}

#[tokio::test]
async fn links_are_restored_not_reassigned() {
  let s = store().await;
  let us = s.upsert_entity(NewEntity::new("US", "United States")).await.unwrap();
  let uk = s.upsert_entity(NewEntity::new("UK", "United Kingdom")).await.unwrap();

  s.replace_year(batch(
    1995,
    vec![record("", "United States", Resolution::Resolved(us.entity_id), &[])],
  ))
  .await
  .unwrap();

  // A later pass that resolves differently, or not at all, keeps the link.
  let summary = s
    .replace_year(batch(
      1995,
      vec![
        record("", "United States", Resolution::Resolved(uk.entity_id), &[]),
        record("", "Atlantis", Resolution::Ambiguous(vec![us.entity_id, uk.entity_id]), &[]),
      ],
    ))
    .await
    .unwrap();

  assert_eq!(summary.restored_links, 1);
  assert_eq!(summary.linked, 1);
  let records = s.year_records(1995).await.unwrap();
  let usa = records.iter().find(|r| r.name == "United States").unwrap();
  assert_eq!(usa.entity_id, Some(us.entity_id));
  let atlantis = records.iter().find(|r| r.name == "Atlantis").unwrap();
  assert_eq!(atlantis.entity_id, None);
}

#[tokio::test]
async fn failed_replacement_keeps_the_committed_year() {
  let s = store().await;
  let us = s.upsert_entity(NewEntity::new("US", "United States")).await.unwrap();
  s.replace_year(batch(2005, vec![
    record("us", "United States", Resolution::Resolved(us.entity_id), &[
      ("Climate", "mostly temperate"),
    ]),
    record("ch", "China", Resolution::Unresolved, &[("Climate", "extremely diverse")]),
  ]))
  .await
  .unwrap();

  // The second record links to an entity that does not exist, so the write
  // fails after the delete and the first insert have run.
  let result = s
    .replace_year(batch(2005, vec![
      record("us", "United States", Resolution::Unresolved, &[("Climate", "arid")]),
      record("xx", "Nowhere", Resolution::Resolved(9999), &[("Climate", "none")]),
    ]))
    .await;
  assert!(result.is_err());

  let records = s.year_records(2005).await.unwrap();
  let mut names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
  names.sort_unstable();
  assert_eq!(names, vec!["China", "United States"]);
  let usa = records.iter().find(|r| r.code == "us").unwrap();
  assert_eq!(usa.entity_id, Some(us.entity_id));

  let mut contents: Vec<_> =
    s.fields_for_year(2005).await.unwrap().into_iter().map(|f| f.content).collect();
  contents.sort_unstable();
  assert_eq!(contents, vec!["extremely diverse", "mostly temperate"]);
}

#[tokio::test]
async fn replacement_is_scoped_to_one_year() {
  let s = store().await;
  s.replace_year(batch(2005, vec![
    record("us", "United States", Resolution::Unresolved, &[("Climate", "temperate")]),
    record("ch", "China", Resolution::Unresolved, &[("Climate", "diverse")]),
  ]))
  .await
  .unwrap();
  s.replace_year(batch(2006, vec![record(
    "us",
    "United States",
    Resolution::Unresolved,
    &[("Climate", "temperate")],
  )]))
  .await
  .unwrap();

  s.replace_year(batch(2005, vec![record(
    "us",
    "United States",
    Resolution::Unresolved,
    &[("Climate", "temperate")],
  )]))
  .await
  .unwrap();

  assert_eq!(s.year_records(2005).await.unwrap().len(), 1);
  assert_eq!(s.year_records(2006).await.unwrap().len(), 1);
  let years: Vec<_> = s.list_years().await.unwrap().into_iter().map(|y| y.year).collect();
  assert_eq!(years, vec![2005, 2006]);
}

#[tokio::test]
async fn field_content_cannot_be_updated() {
  let s = store().await;
  s.replace_year(batch(2005, vec![record(
    "us",
    "United States",
    Resolution::Unresolved,
    &[("Climate", "temperate")],
  )]))
  .await
  .unwrap();

  let result = s
    .connection()
    .call(|conn| {
      conn.execute("UPDATE fields SET content = 'edited'", [])?;
      Ok(())
    })
    .await;
  assert!(result.is_err());
  assert_eq!(s.fields_for_year(2005).await.unwrap()[0].content, "temperate");
}

// ─── Derived data ────────────────────────────────────────────────────────────

#[tokio::test]
async fn mappings_cover_every_raw_name() {
  let s = store().await;
  s.replace_year(batch(2005, vec![record("us", "United States", Resolution::Unresolved, &[
    ("GDP - real growth rate", "3.2%"),
    ("Climate", "temperate"),
  ])]))
  .await
  .unwrap();
  s.replace_year(batch(2006, vec![record("us", "United States", Resolution::Unresolved, &[
    ("Climate", "temperate"),
  ])]))
  .await
  .unwrap();

  let stats = s.field_name_stats().await.unwrap();
  assert_eq!(stats.len(), 2);
  let climate = stats.iter().find(|st| st.name == "Climate").unwrap();
  assert_eq!((climate.first_year, climate.last_year, climate.use_count), (2005, 2006, 2));
  assert_eq!(s.field_names_in_years(vec![2006]).await.unwrap(), vec!["Climate"]);

  let mappings = vec![
    mapping("Climate", "Climate", MappingType::Identity),
    mapping("GDP - real growth rate", "Real GDP growth rate", MappingType::Rename),
  ];
  assert_eq!(s.replace_field_mappings(mappings.clone()).await.unwrap(), 2);
  assert_eq!(s.field_mappings().await.unwrap(), mappings);

  let outcomes = s
    .run_checks(&ValidationConfig::default(), &BTreeMap::new())
    .await
    .unwrap();
  let coverage = outcomes.iter().find(|o| o.name == "mapping_coverage").unwrap();
  assert!(coverage.passed, "{}", coverage.detail);
}

#[tokio::test]
async fn sub_values_round_trip_and_satisfy_invariants() {
  let s = store().await;
  let content = "total: 9,826,630 sq km | land: 9,161,923 sq km";
  s.replace_year(batch(2005, vec![record("us", "United States", Resolution::Unresolved, &[
    ("Area", content),
  ])]))
  .await
  .unwrap();
  let field = s.fields_for_year(2005).await.unwrap().remove(0);
  assert_eq!(field.canonical_name, None);

  let mut total = SubValue::number("total", 9_826_630.0).units("sq km").rank(Some(4));
  total.source_fragment = Some("9,826,630 sq km".into());
  let mut land = SubValue::number("land", 9_161_923.0).units("sq km");
  land.source_fragment = Some("9,161,923 sq km".into());
  let written = s
    .replace_sub_values(2005, vec![(field.field_id, vec![total.clone(), land.clone()])])
    .await
    .unwrap();
  assert_eq!(written, 2);
  assert_eq!(s.sub_values(field.field_id).await.unwrap(), vec![total, land]);

  // Rebuilding replaces rather than appends.
  s.replace_sub_values(2005, vec![(field.field_id, vec![SubValue::text("value", content)])])
    .await
    .unwrap();
  assert_eq!(s.sub_values(field.field_id).await.unwrap().len(), 1);

  let outcomes = s
    .run_checks(&ValidationConfig::default(), &BTreeMap::new())
    .await
    .unwrap();
  for name in ["subvalue_totality", "fragment_bound"] {
    let o = outcomes.iter().find(|o| o.name == name).unwrap();
    assert!(o.passed, "{name}: {}", o.detail);
  }
}

#[tokio::test]
async fn totality_check_flags_fields_without_values() {
  let s = store().await;
  s.replace_year(batch(2005, vec![record("us", "United States", Resolution::Unresolved, &[
    ("Climate", "temperate"),
  ])]))
  .await
  .unwrap();

  let outcomes = s
    .run_checks(&ValidationConfig::default(), &BTreeMap::new())
    .await
    .unwrap();
  assert_eq!(outcomes.len(), 11);
  let totality = outcomes.iter().find(|o| o.name == "subvalue_totality").unwrap();
  assert!(!totality.passed);
}

// ─── Canonical query ─────────────────────────────────────────────────────────

#[tokio::test]
async fn canonical_series_follows_mappings_and_skips_noise() {
  let s = store().await;
  let us = s.upsert_entity(NewEntity::new("US", "United States")).await.unwrap();
  let linked = Resolution::Resolved(us.entity_id);

  s.replace_year(batch(2005, vec![record("us", "United States", linked.clone(), &[
    ("GDP - real growth rate", "3.2% (2005 est.)"),
    ("km", "3.2%"),
  ])]))
  .await
  .unwrap();
  s.replace_year(batch(2006, vec![record("us", "United States", linked, &[(
    "Real GDP growth rate",
    "2.9% (2006 est.)",
  )])]))
  .await
  .unwrap();
  s.replace_field_mappings(vec![
    mapping("GDP - real growth rate", "Real GDP growth rate", MappingType::Rename),
    mapping("Real GDP growth rate", "Real GDP growth rate", MappingType::Identity),
    mapping("km", "Real GDP growth rate", MappingType::Noise),
  ])
  .await
  .unwrap();

  let query = CanonicalQuery {
    field: "Real GDP growth rate".into(),
    entity: "united states".into(),
    ..CanonicalQuery::default()
  };
  let points = s.canonical_series(&query).await.unwrap();
  let rows: Vec<_> = points.iter().map(|p| (p.year, p.raw_name.as_str())).collect();
  assert_eq!(rows, vec![(2005, "GDP - real growth rate"), (2006, "Real GDP growth rate")]);

  for field in s.fields_for_year(2006).await.unwrap() {
    s.replace_sub_values(2006, vec![(field.field_id, vec![
      SubValue::number("value_2006", 2.9).units("%"),
    ])])
    .await
    .unwrap();
  }
  let series = s
    .canonical_series(&CanonicalQuery {
      sub_field: Some("value_2006".into()),
      ..query
    })
    .await
    .unwrap();
  assert_eq!(series.len(), 1);
  assert_eq!(series[0].year, 2006);
  assert_eq!(series[0].numeric, Some(2.9));
  assert_eq!(series[0].units.as_deref(), Some("%"));
}
