//! Per-year records as published: one [`YearRecord`] per entity per edition,
//! owning an ordered list of [`Section`]s, each owning ordered [`Field`]s.
//!
//! Field content is the system of record. It is written once per ingest and
//! never updated in place; reprocessing a year replaces the whole year.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::entity::EntityId;

/// Which pipeline produced a record.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provenance {
  /// Fixed-column plain text editions.
  Text,
  /// Markup editions, one page per entity.
  Html,
  /// Structured interchange editions.
  Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
  pub record_id:     i64,
  pub year:          i32,
  pub code:          String,
  pub name:          String,
  pub provenance:    Provenance,
  /// Null when resolution was ambiguous or found nothing.
  pub entity_id:     Option<EntityId>,
  /// SHA-256 of the raw document the record was parsed from.
  pub source_digest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
  pub section_id: i64,
  pub record_id:  i64,
  pub position:   u32,
  /// Some formats carry no headings.
  pub title:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
  pub field_id:   i64,
  pub section_id: i64,
  pub record_id:  i64,
  pub position:   u32,
  /// Raw field name exactly as published.
  pub name:       String,
  /// Raw content, delimiter-normalised to `" | "`.
  pub content:    String,
}

/// The one unambiguous separator used inside raw content.
pub const CONTENT_SEPARATOR: &str = " | ";
