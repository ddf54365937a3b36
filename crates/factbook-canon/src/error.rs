//! Error types for `factbook-canon`.
//!
//! Resolution, canonicalization and decomposition are total: ambiguity and
//! unparseable content become values, not errors. Errors only arise while
//! loading rule tables or compiling patterns.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),

  #[error("invalid rules document: {0}")]
  Rules(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
