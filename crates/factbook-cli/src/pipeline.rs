//! Pipeline orchestration over any [`FactbookStore`] and [`RawSource`].
//!
//! Bootstrap must run before ingest; every other stage is a derived-data
//! rebuild that can be repeated at will.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use anyhow::Context as _;
use factbook_canon::{
  Canonicalizer, Classifier, Decomposer, Resolver, RuleSet, bootstrap, resolve::name_code,
};
use factbook_core::{
  mapping::MappingType,
  parsed::RawDocument,
  record::Provenance,
  store::{CanonicalQuery, FactbookStore, NewYearRecord, SeriesPoint, YearBatch, YearSummary},
  validate::CheckOutcome,
};
use factbook_parse::{Era, Parsers};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{config::Settings, digest::source_digest, source::RawSource};

/// Outcome of an ingest run. Failed years are logged and skipped.
#[derive(Debug, Default)]
pub struct IngestReport {
  pub committed: Vec<YearSummary>,
  /// Years with no raw documents.
  pub gaps:      Vec<i32>,
  pub failed:    Vec<i32>,
}

pub struct Pipeline<S, R> {
  store:    Arc<S>,
  source:   Arc<R>,
  settings: Settings,
  rules:    RuleSet,
}

impl<S, R> Pipeline<S, R>
where
  S: FactbookStore + 'static,
  R: RawSource + 'static,
{
  pub fn new(store: S, source: R, settings: Settings) -> anyhow::Result<Self> {
    let rules = settings.rule_set()?;
    Ok(Self {
      store: Arc::new(store),
      source: Arc::new(source),
      settings,
      rules,
    })
  }

  pub fn store(&self) -> &S { &self.store }

  // ─── Bootstrap ─────────────────────────────────────────────────────────

  /// Seed canonical entities from the code-stable editions. Existing
  /// entities are never renamed.
  pub async fn bootstrap(&self) -> anyhow::Result<usize> {
    let parsers = Parsers::new(self.settings.fallback_cap)?;
    let mut candidates: Vec<(String, String)> = Vec::new();
    for &year in &self.settings.bootstrap_years {
      let docs = self.source.documents(year)?;
      if docs.is_empty() {
        warn!(year, "bootstrap edition has no documents");
      }
      for doc in &docs {
        let parsed = parsers.parse(doc);
        for entity in parsed.entities {
          if let Some(code) = entity.code.or_else(|| doc.code.clone()) {
            candidates.push((code, entity.name));
          }
        }
      }
    }

    let seeds = bootstrap::seed_entities(candidates.iter().map(|(c, n)| (c.as_str(), n.as_str())));
    let count = seeds.len();
    for seed in seeds {
      self.store.upsert_entity(seed).await?;
    }

    let known: BTreeSet<String> = self
      .store
      .list_entities()
      .await?
      .into_iter()
      .map(|e| e.code)
      .collect();
    for (code, alternate) in &self.rules.alternate_codes {
      if !known.contains(code) {
        debug!(%code, %alternate, "alternate code for unknown entity skipped");
        continue;
      }
      self
        .store
        .set_alternate_code(code.clone(), alternate.clone())
        .await?;
    }

    info!(entities = count, "bootstrap complete");
    Ok(count)
  }

  // ─── Ingest ────────────────────────────────────────────────────────────

  /// Parse and persist `years` (every year in the source when empty), at
  /// most `workers` at a time, one transaction per year.
  pub async fn ingest(&self, years: &[i32]) -> anyhow::Result<IngestReport> {
    let years: BTreeSet<i32> = if years.is_empty() {
      self.source.years()?.into_iter().collect()
    } else {
      years.iter().copied().collect()
    };

    let entities = self.store.list_entities().await?;
    if entities.is_empty() {
      warn!("no canonical entities; run bootstrap first or every link stays null");
    }
    let resolver = Arc::new(Resolver::new(&entities, &self.rules));
    let parsers = Arc::new(Parsers::new(self.settings.fallback_cap)?);
    let sem = Arc::new(Semaphore::new(self.settings.workers.max(1)));

    let mut tasks = JoinSet::new();
    for year in years {
      let store = Arc::clone(&self.store);
      let source = Arc::clone(&self.source);
      let parsers = Arc::clone(&parsers);
      let resolver = Arc::clone(&resolver);
      let sem = Arc::clone(&sem);
      tasks.spawn(async move {
        let _permit = sem.acquire().await;
        let outcome = ingest_year(store, source, parsers, resolver, year).await;
        (year, outcome)
      });
    }

    let mut report = IngestReport::default();
    while let Some(joined) = tasks.join_next().await {
      let (year, outcome) = joined.context("ingest worker panicked")?;
      match outcome {
        Ok(Some(summary)) => {
          info!(
            year,
            entities = summary.records,
            sections = summary.sections,
            fields = summary.fields,
            linked = summary.linked,
            unlinked = summary.records - summary.linked,
            restored = summary.restored_links,
            "year committed"
          );
          report.committed.push(summary);
        }
        Ok(None) => {
          warn!(year, "no raw documents; recorded as a gap");
          report.gaps.push(year);
        }
        Err(e) => {
          warn!(year, error = ?e, "year failed; prior state kept");
          report.failed.push(year);
        }
      }
    }

    report.committed.sort_by_key(|s| s.year);
    report.gaps.sort_unstable();
    report.failed.sort_unstable();
    Ok(report)
  }

  // ─── Derived data ──────────────────────────────────────────────────────

  /// Rebuild the field name mapping table from every raw name in the store.
  pub async fn canonicalize(&self) -> anyhow::Result<usize> {
    let stats = self.store.field_name_stats().await?;
    let modern: BTreeSet<String> = self
      .store
      .field_names_in_years(self.settings.modern_years.clone())
      .await?
      .into_iter()
      .collect();
    if modern.is_empty() {
      warn!(years = ?self.settings.modern_years, "modern editions publish no field names");
    }

    let canonicalizer = Canonicalizer::new(self.rules.clone(), modern)?;
    let mappings = canonicalizer.map_all(&stats);
    let manual = mappings.iter().filter(|m| m.mapping_type == MappingType::Manual).count();
    let written = self.store.replace_field_mappings(mappings).await?;
    info!(names = written, manual, "field name mappings rebuilt");
    Ok(written)
  }

  /// Rebuild the sub-values of `years` (every ingested year when empty).
  pub async fn decompose(&self, years: &[i32]) -> anyhow::Result<usize> {
    let years: Vec<i32> = if years.is_empty() {
      self.store.list_years().await?.into_iter().map(|c| c.year).collect()
    } else {
      years.to_vec()
    };

    let decomposer = Arc::new(Decomposer::new(self.settings.text_value_cap)?);
    let mut total = 0;
    for year in years {
      let fields = self.store.fields_for_year(year).await?;
      let decomposer = Arc::clone(&decomposer);
      let values = tokio::task::spawn_blocking(move || {
        fields
          .into_iter()
          .map(|f| {
            let name = f.canonical_name.as_deref().unwrap_or(&f.raw_name);
            (f.field_id, decomposer.decompose(name, &f.content))
          })
          .collect::<Vec<_>>()
      })
      .await
      .context("decompose worker panicked")?;

      let written = self.store.replace_sub_values(year, values).await?;
      debug!(year, sub_values = written, "sub-values rebuilt");
      total += written;
    }
    info!(sub_values = total, "decomposition complete");
    Ok(total)
  }

  /// Classify every linked entity from its latest dependency and government
  /// text.
  pub async fn classify(&self) -> anyhow::Result<usize> {
    let classifier = Classifier::new(&self.rules)?;
    let inputs = self.store.classification_inputs().await?;
    let mut count = 0;
    for input in &inputs {
      let verdict = classifier.classify(input);
      debug!(
        code = %input.code,
        entity_type = %verdict.entity_type,
        reason = %verdict.reason,
        "classified"
      );
      self
        .store
        .classify_entity(input.code.clone(), verdict.entity_type, verdict.administered_by)
        .await?;
      count += 1;
    }
    info!(entities = count, "classification complete");
    Ok(count)
  }

  // ─── Reads ─────────────────────────────────────────────────────────────

  /// Run every validator check. Failures are logged, never raised.
  pub async fn validate(&self) -> anyhow::Result<Vec<CheckOutcome>> {
    // Expect the family ingest reads each edition in.
    let mut expected: BTreeMap<i32, Provenance> = BTreeMap::new();
    for count in self.store.list_years().await? {
      let hints = self.source.hints(count.year)?;
      expected.insert(count.year, Era::for_edition(count.year, hints).provenance());
    }

    let outcomes = self
      .store
      .run_checks(&self.settings.validation, &expected)
      .await?;
    for outcome in outcomes.iter().filter(|o| !o.passed) {
      warn!(check = %outcome.name, detail = %outcome.detail, "validation check failed");
    }
    Ok(outcomes)
  }

  pub async fn query(&self, query: CanonicalQuery) -> anyhow::Result<Vec<SeriesPoint>> {
    Ok(self.store.canonical_series(&query).await?)
  }

  /// bootstrap, ingest, canonicalize, decompose, validate.
  pub async fn run(&self) -> anyhow::Result<Vec<CheckOutcome>> {
    self.bootstrap().await?;
    let report = self.ingest(&[]).await?;
    if !report.failed.is_empty() {
      warn!(years = ?report.failed, "some years failed to ingest");
    }
    self.canonicalize().await?;
    self.decompose(&[]).await?;
    self.validate().await
  }
}

// ─── Per-year worker ─────────────────────────────────────────────────────────

async fn ingest_year<S, R>(
  store: Arc<S>,
  source: Arc<R>,
  parsers: Arc<Parsers>,
  resolver: Arc<Resolver>,
  year: i32,
) -> anyhow::Result<Option<YearSummary>>
where
  S: FactbookStore,
  R: RawSource + 'static,
{
  let batch = tokio::task::spawn_blocking(move || build_batch(&*source, &parsers, &resolver, year))
    .await
    .context("parse worker panicked")??;
  let Some(batch) = batch else {
    return Ok(None);
  };
  let summary = store
    .replace_year(batch)
    .await
    .with_context(|| format!("writing year {year}"))?;
  Ok(Some(summary))
}

/// Read, parse and resolve one year. `None` when the year has no documents.
fn build_batch<R: RawSource + ?Sized>(
  source: &R,
  parsers: &Parsers,
  resolver: &Resolver,
  year: i32,
) -> anyhow::Result<Option<YearBatch>> {
  let docs = source
    .documents(year)
    .with_context(|| format!("reading raw documents for {year}"))?;
  if docs.is_empty() {
    return Ok(None);
  }

  // One family per edition; a year shipping several is read in only one.
  let era = Era::for_edition(year, docs.iter().filter_map(RawDocument::hint));
  let mut records = Vec::new();
  for doc in &docs {
    if doc.hint().is_some_and(|hint| hint != era.provenance()) {
      debug!(year, file = %doc.file_name, %era, "document outside the edition's format skipped");
      continue;
    }
    let digest = source_digest(&doc.bytes);
    let parsed = parsers.parse_as(era, doc);
    let provenance = parsed.era.provenance();
    // Free-text editions carry no codes worth trusting.
    let stable_codes = provenance != Provenance::Text;

    for entity in parsed.entities {
      let code_hint = if stable_codes { entity.code.as_deref() } else { None };
      let resolution = resolver.resolve(code_hint, &entity.name);
      let code = match entity.code {
        Some(code) if stable_codes => code.to_lowercase(),
        _ => name_code(&entity.name),
      };
      records.push(NewYearRecord {
        code,
        name: entity.name,
        provenance,
        resolution,
        source_digest: Some(digest.clone()),
        sections: entity.sections,
      });
    }
  }
  Ok(Some(YearBatch { year, records }))
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use factbook_core::entity::NewEntity;
  use factbook_store_sqlite::SqliteStore;

  use super::*;

  /// Documents held in memory, keyed by year.
  #[derive(Default)]
  struct MemorySource {
    years: BTreeMap<i32, Vec<RawDocument>>,
  }

  impl MemorySource {
    fn with(mut self, year: i32, file: &str, body: &str) -> Self {
      let doc = RawDocument::new(year, file, body.as_bytes().to_vec());
      self.years.entry(year).or_default().push(doc);
      self
    }

    fn gap(mut self, year: i32) -> Self {
      self.years.entry(year).or_default();
      self
    }
  }

  impl RawSource for MemorySource {
    fn years(&self) -> anyhow::Result<Vec<i32>> { Ok(self.years.keys().copied().collect()) }

    fn documents(&self, year: i32) -> anyhow::Result<Vec<RawDocument>> {
      Ok(self.years.get(&year).cloned().unwrap_or_default())
    }
  }

  const US_2025: &str = r#"{"name":"United States","code":"US","categories":[
    {"title":"Geography","fields":[
      {"name":"Area","content":"<strong>total: </strong>9,833,517 sq km<br><br><strong>land: </strong>9,147,593 sq km"}]},
    {"title":"People and Society","fields":[
      {"name":"Population","content":"<strong>total: </strong>338,016,259 (2025 est.)"}]},
    {"title":"Government","fields":[
      {"name":"Government type","content":"constitutional federal republic"}]}]}"#;

  const FR_2025: &str = r#"{"name":"France","code":"FR","categories":[
    {"title":"Geography","fields":[
      {"name":"Area","content":"<strong>total: </strong>643,801 sq km"}]},
    {"title":"People and Society","fields":[
      {"name":"Population","content":"<strong>total: </strong>68,521,974 (2025 est.)"}]}]}"#;

  const US_2024: &str = r#"{"name":"United States","code":"US","categories":[
    {"title":"People and Society","fields":[
      {"name":"Population","content":"<strong>total: </strong>341,963,408 (2024 est.)"}]}]}"#;

  fn source() -> MemorySource {
    MemorySource::default()
      .with(2025, "us.json", US_2025)
      .with(2025, "fr.json", FR_2025)
      .with(2024, "us.json", US_2024)
      .gap(2023)
  }

  async fn pipeline(source: MemorySource) -> Pipeline<SqliteStore, MemorySource> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let settings = Settings { workers: 2, ..Settings::default() };
    Pipeline::new(store, source, settings).unwrap()
  }

  #[tokio::test]
  async fn bootstrap_seeds_one_entity_per_code() {
    let p = pipeline(source()).await;
    assert_eq!(p.bootstrap().await.unwrap(), 2);
    // Idempotent.
    assert_eq!(p.bootstrap().await.unwrap(), 2);

    let codes: Vec<_> = p
      .store()
      .list_entities()
      .await
      .unwrap()
      .into_iter()
      .map(|e| (e.code, e.name))
      .collect();
    assert_eq!(codes, vec![
      ("FR".to_string(), "France".to_string()),
      ("US".to_string(), "United States".to_string()),
    ]);
  }

  #[tokio::test]
  async fn ingest_links_records_and_records_gaps() {
    let p = pipeline(source()).await;
    p.bootstrap().await.unwrap();

    let report = p.ingest(&[]).await.unwrap();
    assert_eq!(report.gaps, vec![2023]);
    assert!(report.failed.is_empty());
    let years: Vec<_> = report.committed.iter().map(|s| s.year).collect();
    assert_eq!(years, vec![2024, 2025]);
    assert!(report.committed.iter().all(|s| s.linked == s.records));

    let records = p.store().year_records(2025).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.provenance == Provenance::Json));
    assert!(records.iter().all(|r| r.source_digest.as_ref().is_some_and(|d| d.len() == 64)));
  }

  #[tokio::test]
  async fn reingest_restores_links() {
    let p = pipeline(source()).await;
    p.bootstrap().await.unwrap();
    p.ingest(&[2025]).await.unwrap();

    let report = p.ingest(&[2025]).await.unwrap();
    let summary = &report.committed[0];
    assert_eq!(summary.records, 2);
    assert_eq!(summary.restored_links, 2);
  }

  const VIRGIN_1995: &str = "front matter\n____________________________\n\
                              @Virgin Islands:Geography\n Location: Caribbean\n \
                              Climate: subtropical\n";

  #[tokio::test]
  async fn text_edition_links_survive_a_later_exact_match() {
    let source = MemorySource::default().with(1995, "wfb1995.txt", VIRGIN_1995);
    let p = pipeline(source).await;
    let bvi = p
      .store()
      .upsert_entity(NewEntity::new("VI", "British Virgin Islands"))
      .await
      .unwrap();
    p.ingest(&[1995]).await.unwrap();
    let before = p.store().year_records(1995).await.unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].entity_id, Some(bvi.entity_id));

    // A closer name appears; the committed link must not move.
    p.store()
      .upsert_entity(NewEntity::new("VQ", "Virgin Islands"))
      .await
      .unwrap();
    let report = p.ingest(&[1995]).await.unwrap();
    assert_eq!(report.committed[0].restored_links, 1);

    let after = p.store().year_records(1995).await.unwrap();
    assert_eq!(after[0].code, before[0].code);
    assert_eq!(after[0].code, "vi");
    assert_eq!(after[0].entity_id, Some(bvi.entity_id));
  }

  const ARUBA_2001: &str = "@Aruba\n\nAruba    Introduction Top of Page\nBackground: \
                            Discovered and claimed\nfor Spain in 1499.\n\n\
                            Aruba    Geography\nLocation: Caribbean\n";

  #[tokio::test]
  async fn mixed_format_year_is_read_in_one_family() {
    let source = MemorySource::default()
      .with(2001, "geos/aa.html", "<html><body><h1>Aruba</h1></body></html>")
      .with(2001, "wfb2001.txt", ARUBA_2001)
      .with(2022, "geos/us.html", "<html><body><h1>United States</h1></body></html>");
    let p = pipeline(source).await;
    p.ingest(&[]).await.unwrap();

    let records = p.store().year_records(2001).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].provenance, Provenance::Text);
    let markup = p.store().year_records(2022).await.unwrap();
    assert!(markup.iter().all(|r| r.provenance == Provenance::Html));

    // Validation expects the family ingest actually read.
    let outcomes = p.validate().await.unwrap();
    let tags = outcomes.iter().find(|o| o.name == "provenance_tags").unwrap();
    assert!(tags.passed, "{}", tags.detail);
  }

  #[tokio::test]
  async fn derived_stages_feed_the_canonical_query() {
    let p = pipeline(source()).await;
    p.bootstrap().await.unwrap();
    p.ingest(&[]).await.unwrap();

    assert_eq!(p.canonicalize().await.unwrap(), 3);
    let mappings = p.store().field_mappings().await.unwrap();
    assert!(mappings.iter().all(|m| m.mapping_type == MappingType::Identity));

    assert!(p.decompose(&[]).await.unwrap() > 0);

    let series = p
      .query(CanonicalQuery {
        field: "Population".into(),
        entity: "united states".into(),
        sub_field: Some("total".into()),
        include_consolidated: false,
      })
      .await
      .unwrap();
    let points: Vec<_> = series.iter().map(|s| (s.year, s.numeric)).collect();
    assert_eq!(points, vec![(2024, Some(341_963_408.0)), (2025, Some(338_016_259.0))]);
  }

  #[tokio::test]
  async fn classify_marks_entities_with_government_text_sovereign() {
    let p = pipeline(source()).await;
    p.bootstrap().await.unwrap();
    p.ingest(&[]).await.unwrap();
    p.canonicalize().await.unwrap();
    assert_eq!(p.classify().await.unwrap(), 2);

    let types: BTreeMap<_, _> = p
      .store()
      .list_entities()
      .await
      .unwrap()
      .into_iter()
      .map(|e| (e.code, e.entity_type))
      .collect();
    assert_eq!(types["US"].to_string(), "sovereign");
    assert_eq!(types["FR"].to_string(), "unknown");
  }

  #[tokio::test]
  async fn validate_reports_every_check() {
    let p = pipeline(source()).await;
    let outcomes = p.run().await.unwrap();
    assert_eq!(outcomes.len(), 11);
    let by_name: BTreeMap<_, _> = outcomes.iter().map(|o| (o.name.as_str(), o.passed)).collect();
    assert!(by_name["provenance_tags"]);
    assert!(by_name["subvalue_totality"]);
    assert!(by_name["mapping_coverage"]);
    // Two entities is far below the structural minimum.
    assert!(!by_name["structural_counts"]);
  }
}
