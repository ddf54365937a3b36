//! Canonical entities: the stable cross-year identity every per-year record
//! can be linked to.
//!
//! Entities are created once by the bootstrap pass and mutated rarely after
//! that (classification, administering link, alternate code). Their code and
//! name never change once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Surrogate key of a [`CanonicalEntity`].
pub type EntityId = i64;

/// Political classification of an entity.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityType {
  Sovereign,
  Territory,
  Disputed,
  FreelyAssociated,
  SpecialAdmin,
  CrownDependency,
  Antarctic,
  /// Oceans, the World entry, supranational bodies.
  Misc,
  Dissolved,
  #[default]
  Unknown,
}

/// A stable cross-year identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEntity {
  pub entity_id:       EntityId,
  /// Upper-case canonical code; unique.
  pub code:            String,
  pub name:            String,
  /// An alternate standard code (e.g. ISO alpha-2 next to the FIPS code).
  pub alternate_code:  Option<String>,
  pub entity_type:     EntityType,
  /// Weak self-reference to the entity that administers this one.
  pub administered_by: Option<EntityId>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`FactbookStore::upsert_entity`](crate::store::FactbookStore::upsert_entity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
  pub code: String,
  pub name: String,
}

impl NewEntity {
  pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      code: code.into().trim().to_uppercase(),
      name: name.into().trim().to_string(),
    }
  }
}

/// Outcome of resolving a year-local `(code, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  Resolved(EntityId),
  /// More than one entity matched with equal confidence; the link stays null.
  Ambiguous(Vec<EntityId>),
  Unresolved,
}

impl Resolution {
  /// The entity to link, if resolution was confident.
  pub fn entity_id(&self) -> Option<EntityId> {
    match self {
      Self::Resolved(id) => Some(*id),
      Self::Ambiguous(_) | Self::Unresolved => None,
    }
  }
}
