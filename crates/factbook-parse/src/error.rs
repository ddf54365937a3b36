//! Error types for the era parsers.
//!
//! Parsing a document never fails: unrecognised input falls back to a
//! whole-document capture. Errors only arise while building the parser set.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),

  #[error("invalid selector {selector:?}: {message}")]
  Selector { selector: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
