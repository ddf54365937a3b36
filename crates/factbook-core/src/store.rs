//! The `FactbookStore` trait and supporting batch/query types.
//!
//! The trait is implemented by storage backends (e.g. `factbook-store-sqlite`).
//! The pipeline in `factbook-cli` depends on this abstraction, not on any
//! concrete backend.

use std::{collections::BTreeMap, future::Future};

use serde::{Deserialize, Serialize};

use crate::{
  entity::{CanonicalEntity, EntityId, EntityType, NewEntity, Resolution},
  mapping::{FieldNameMapping, FieldNameStats},
  parsed::ParsedSection,
  record::{Provenance, YearRecord},
  subvalue::SubValue,
  validate::{CheckOutcome, ValidationConfig},
};

// ─── Ingest batch ────────────────────────────────────────────────────────────

/// One entity of one year, parsed and resolved, ready to persist.
#[derive(Debug, Clone)]
pub struct NewYearRecord {
  pub code:          String,
  pub name:          String,
  pub provenance:    Provenance,
  pub resolution:    Resolution,
  pub source_digest: Option<String>,
  pub sections:      Vec<ParsedSection>,
}

/// Everything one year's ingest writes. Persisted atomically.
#[derive(Debug, Clone)]
pub struct YearBatch {
  pub year:    i32,
  pub records: Vec<NewYearRecord>,
}

/// Counts reported after a year has been committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
  pub year:           i32,
  pub records:        usize,
  pub sections:       usize,
  pub fields:         usize,
  /// Records carrying an entity link after the write.
  pub linked:         usize,
  /// Links carried over from the previous ingest of the same year.
  pub restored_links: usize,
}

// ─── Derived-data inputs ─────────────────────────────────────────────────────

/// A field's content together with its canonical name, for decomposition.
#[derive(Debug, Clone)]
pub struct FieldContent {
  pub field_id:       i64,
  pub raw_name:       String,
  /// `None` when no mapping exists yet.
  pub canonical_name: Option<String>,
  pub content:        String,
}

/// The latest classification-relevant text for one entity.
#[derive(Debug, Clone, Default)]
pub struct ClassificationInput {
  pub entity_id:         EntityId,
  pub code:              String,
  pub name:              String,
  pub dependency_status: Option<String>,
  pub government_type:   Option<String>,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`FactbookStore::canonical_series`].
#[derive(Debug, Clone, Default)]
pub struct CanonicalQuery {
  /// Canonical field name, e.g. `"Population"`.
  pub field:               String,
  /// Canonical entity name, matched case-insensitively.
  pub entity:              String,
  /// Restrict to one sub-value label and return its numeric series.
  pub sub_field:           Option<String>,
  /// Also match raw names consolidated under `field`.
  pub include_consolidated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
  pub year:     i32,
  pub raw_name: String,
  pub content:  String,
  /// Populated when the query named a sub-field.
  pub numeric:  Option<f64>,
  pub units:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
  pub year:       i32,
  pub records:    u64,
  pub provenance: Provenance,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Factbook archive backend.
///
/// Raw content is write-once: the only way to change a year is to replace it
/// entirely with [`replace_year`](Self::replace_year). Derived tables
/// (mappings, sub-values) may be dropped and regenerated at will.
pub trait FactbookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Canonical entities ────────────────────────────────────────────────

  /// Insert the entity if its code is new; otherwise return the existing row
  /// unchanged.
  fn upsert_entity(
    &self,
    entity: NewEntity,
  ) -> impl Future<Output = Result<CanonicalEntity, Self::Error>> + Send + '_;

  fn list_entities(
    &self,
  ) -> impl Future<Output = Result<Vec<CanonicalEntity>, Self::Error>> + Send + '_;

  /// Set the classification and (optionally) the administering entity.
  fn classify_entity(
    &self,
    code: String,
    entity_type: EntityType,
    administered_by: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_alternate_code(
    &self,
    code: String,
    alternate: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Latest "Dependency status" and "Government type" text per entity.
  fn classification_inputs(
    &self,
  ) -> impl Future<Output = Result<Vec<ClassificationInput>, Self::Error>> + Send + '_;

  // ── Per-year raw data ─────────────────────────────────────────────────

  /// Atomically replace one year: snapshot the year's entity links, delete
  /// its rows, insert the batch (restoring snapshotted links before using
  /// the batch's resolutions), commit. Readers never see a partial year.
  fn replace_year(
    &self,
    batch: YearBatch,
  ) -> impl Future<Output = Result<YearSummary, Self::Error>> + Send + '_;

  fn year_records(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Vec<YearRecord>, Self::Error>> + Send + '_;

  fn list_years(
    &self,
  ) -> impl Future<Output = Result<Vec<YearCount>, Self::Error>> + Send + '_;

  // ── Field name canonicalization ───────────────────────────────────────

  /// Every distinct raw field name with first/last year and usage count.
  fn field_name_stats(
    &self,
  ) -> impl Future<Output = Result<Vec<FieldNameStats>, Self::Error>> + Send + '_;

  /// Distinct raw field names published in the given years.
  fn field_names_in_years(
    &self,
    years: Vec<i32>,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Drop and rewrite the whole mapping table.
  fn replace_field_mappings(
    &self,
    mappings: Vec<FieldNameMapping>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn field_mappings(
    &self,
  ) -> impl Future<Output = Result<Vec<FieldNameMapping>, Self::Error>> + Send + '_;

  // ── Sub-values ────────────────────────────────────────────────────────

  fn fields_for_year(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Vec<FieldContent>, Self::Error>> + Send + '_;

  /// Drop and rewrite the sub-values of every field of `year`.
  fn replace_sub_values(
    &self,
    year: i32,
    values: Vec<(i64, Vec<SubValue>)>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn sub_values(
    &self,
    field_id: i64,
  ) -> impl Future<Output = Result<Vec<SubValue>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Select by canonical field name and canonical entity name, excluding
  /// noise mappings, ordered by year.
  fn canonical_series<'a>(
    &'a self,
    query: &'a CanonicalQuery,
  ) -> impl Future<Output = Result<Vec<SeriesPoint>, Self::Error>> + Send + 'a;

  /// Run every read-only validator check. `expected_provenance` gives the
  /// provenance the dispatcher assigns to each year.
  fn run_checks<'a>(
    &'a self,
    config: &'a ValidationConfig,
    expected_provenance: &'a BTreeMap<i32, Provenance>,
  ) -> impl Future<Output = Result<Vec<CheckOutcome>, Self::Error>> + Send + 'a;
}
