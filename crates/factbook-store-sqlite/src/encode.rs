//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Enumerations are stored as their
//! snake_case tags. A sub-value atom is spread over two nullable columns,
//! at most one of which is populated.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use factbook_core::{
  entity::{CanonicalEntity, EntityType},
  mapping::{FieldNameMapping, MappingType},
  record::{Provenance, YearRecord},
  subvalue::{Atom, SubValue},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn decode_entity_type(s: &str) -> Result<EntityType> {
  EntityType::from_str(s)
    .map_err(|_| factbook_core::Error::UnknownEntityType(s.to_string()).into())
}

pub fn decode_mapping_type(s: &str) -> Result<MappingType> {
  MappingType::from_str(s)
    .map_err(|_| factbook_core::Error::UnknownMappingType(s.to_string()).into())
}

pub fn decode_provenance(s: &str) -> Result<Provenance> {
  Provenance::from_str(s)
    .map_err(|_| factbook_core::Error::UnknownProvenance(s.to_string()).into())
}

// ─── Atom ────────────────────────────────────────────────────────────────────

/// `(numeric_value, text_value)`.
pub fn encode_atom(atom: &Atom) -> (Option<f64>, Option<String>) {
  match atom {
    Atom::Number(n) => (Some(*n), None),
    Atom::Text(t) => (None, Some(t.clone())),
    Atom::Empty => (None, None),
  }
}

pub fn decode_atom(numeric: Option<f64>, text: Option<String>) -> Atom {
  match (numeric, text) {
    (Some(n), _) => Atom::Number(n),
    (None, Some(t)) => Atom::Text(t),
    (None, None) => Atom::Empty,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of an `entities` row.
pub struct RawEntity {
  pub entity_id:       i64,
  pub code:            String,
  pub name:            String,
  pub alternate_code:  Option<String>,
  pub entity_type:     String,
  pub administered_by: Option<i64>,
  pub created_at:      String,
}

impl RawEntity {
  pub const COLUMNS: &'static str =
    "entity_id, code, name, alternate_code, entity_type, administered_by, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entity_id:       row.get(0)?,
      code:            row.get(1)?,
      name:            row.get(2)?,
      alternate_code:  row.get(3)?,
      entity_type:     row.get(4)?,
      administered_by: row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_entity(self) -> Result<CanonicalEntity> {
    Ok(CanonicalEntity {
      entity_id:       self.entity_id,
      code:            self.code,
      name:            self.name,
      alternate_code:  self.alternate_code,
      entity_type:     decode_entity_type(&self.entity_type)?,
      administered_by: self.administered_by,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw columns of a `year_records` row.
pub struct RawYearRecord {
  pub record_id:     i64,
  pub year:          i32,
  pub code:          String,
  pub name:          String,
  pub provenance:    String,
  pub entity_id:     Option<i64>,
  pub source_digest: Option<String>,
}

impl RawYearRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:     row.get(0)?,
      year:          row.get(1)?,
      code:          row.get(2)?,
      name:          row.get(3)?,
      provenance:    row.get(4)?,
      entity_id:     row.get(5)?,
      source_digest: row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<YearRecord> {
    Ok(YearRecord {
      record_id:     self.record_id,
      year:          self.year,
      code:          self.code,
      name:          self.name,
      provenance:    decode_provenance(&self.provenance)?,
      entity_id:     self.entity_id,
      source_digest: self.source_digest,
    })
  }
}

/// Raw columns of a `field_name_mappings` row.
pub struct RawMapping {
  pub original_name:   String,
  pub canonical_name:  String,
  pub mapping_type:    String,
  pub consolidated_to: Option<String>,
  pub is_noise:        bool,
  pub first_year:      i32,
  pub last_year:       i32,
  pub use_count:       i64,
  pub notes:           Option<String>,
}

impl RawMapping {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      original_name:   row.get(0)?,
      canonical_name:  row.get(1)?,
      mapping_type:    row.get(2)?,
      consolidated_to: row.get(3)?,
      is_noise:        row.get(4)?,
      first_year:      row.get(5)?,
      last_year:       row.get(6)?,
      use_count:       row.get(7)?,
      notes:           row.get(8)?,
    })
  }

  pub fn into_mapping(self) -> Result<FieldNameMapping> {
    Ok(FieldNameMapping {
      original_name:   self.original_name,
      canonical_name:  self.canonical_name,
      mapping_type:    decode_mapping_type(&self.mapping_type)?,
      consolidated_to: self.consolidated_to,
      is_noise:        self.is_noise,
      first_year:      self.first_year,
      last_year:       self.last_year,
      use_count:       u64::try_from(self.use_count).unwrap_or_default(),
      notes:           self.notes,
    })
  }
}

/// Reads a `sub_values` row selected as
/// `sub_field, numeric_value, text_value, units, date_est, rank, source_fragment`.
pub fn sub_value_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubValue> {
  Ok(SubValue {
    sub_field:       row.get(0)?,
    atom:            decode_atom(row.get(1)?, row.get(2)?),
    units:           row.get(3)?,
    date_est:        row.get(4)?,
    rank:            row.get(5)?,
    source_fragment: row.get(6)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn atoms_never_populate_both_columns() {
    assert_eq!(encode_atom(&Atom::Number(1.5)), (Some(1.5), None));
    assert_eq!(encode_atom(&Atom::Text("x".into())), (None, Some("x".into())));
    assert_eq!(encode_atom(&Atom::Empty), (None, None));
    assert_eq!(decode_atom(None, None), Atom::Empty);
  }

  #[test]
  fn unknown_tags_are_errors() {
    assert!(decode_entity_type("colony").is_err());
    assert_eq!(decode_mapping_type("dash_format").unwrap(), MappingType::DashFormat);
    assert_eq!(decode_provenance("html").unwrap(), Provenance::Html);
  }
}
