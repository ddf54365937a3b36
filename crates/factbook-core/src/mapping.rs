//! Field name mappings: derived, one per distinct raw field name.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Which canonicalization rule produced a mapping.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MappingType {
  Identity,
  /// Separator punctuation normalised (`Economy-overview`, `Economy--overview`).
  DashFormat,
  Rename,
  Consolidation,
  CountrySpecific,
  Noise,
  /// No rule matched; kept as-is and flagged for review.
  Manual,
}

/// Usage statistics for one distinct raw field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNameStats {
  pub name:       String,
  pub first_year: i32,
  pub last_year:  i32,
  pub use_count:  u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNameMapping {
  pub original_name:   String,
  pub canonical_name:  String,
  pub mapping_type:    MappingType,
  /// Parent aggregate for consolidated sub-fields; rows are tagged, not merged.
  pub consolidated_to: Option<String>,
  pub is_noise:        bool,
  pub first_year:      i32,
  pub last_year:       i32,
  pub use_count:       u64,
  pub notes:           Option<String>,
}

impl FieldNameMapping {
  /// A mapping that keeps the raw name, for the given rule.
  pub fn keep(stats: &FieldNameStats, mapping_type: MappingType) -> Self {
    Self {
      original_name: stats.name.clone(),
      canonical_name: stats.name.clone(),
      mapping_type,
      consolidated_to: None,
      is_noise: mapping_type == MappingType::Noise,
      first_year: stats.first_year,
      last_year: stats.last_year,
      use_count: stats.use_count,
      notes: None,
    }
  }

  pub fn to(mut self, canonical: impl Into<String>) -> Self {
    self.canonical_name = canonical.into();
    self
  }

  pub fn consolidated(mut self, target: impl Into<String>) -> Self {
    self.consolidated_to = Some(target.into());
    self
  }

  pub fn note(mut self, note: impl Into<String>) -> Self {
    self.notes = Some(note.into());
    self
  }
}
