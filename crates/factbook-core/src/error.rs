//! Error types for `factbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown entity type: {0:?}")]
  UnknownEntityType(String),

  #[error("unknown mapping type: {0:?}")]
  UnknownMappingType(String),

  #[error("unknown provenance tag: {0:?}")]
  UnknownProvenance(String),

  #[error("entity not found: {0}")]
  EntityNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
