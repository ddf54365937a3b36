//! Canonical-layer logic for the Factbook archive: entity seeding and
//! resolution, field-name canonicalization, sub-value decomposition and
//! entity classification.
//!
//! Everything here is pure. Callers load inputs from a
//! [`factbook_core::store::FactbookStore`] and persist the results back.

pub mod bootstrap;
pub mod canonicalize;
pub mod classify;
pub mod decompose;
pub mod error;
pub mod resolve;
pub mod rules;
mod tables;

pub use canonicalize::Canonicalizer;
pub use classify::{Classification, Classifier};
pub use decompose::Decomposer;
pub use error::{Error, Result};
pub use resolve::Resolver;
pub use rules::RuleSet;
