//! Sub-values: typed atoms decomposed from a field's raw content.
//!
//! A sub-value carries either a number or a text, never both. The
//! [`Atom`] enum makes that a property of the type rather than of the data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Atom {
  Number(f64),
  Text(String),
  /// Nothing recoverable (e.g. empty content); still counts toward totality.
  Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubValue {
  /// Sub-field label, e.g. `total`, `male`, `value_2023`.
  pub sub_field:       String,
  pub atom:            Atom,
  pub units:           Option<String>,
  /// Date or estimate qualifier, e.g. `2024 est.`, `FY93`.
  pub date_est:        Option<String>,
  /// Global rank annotation, stored separately from the atom.
  pub rank:            Option<i64>,
  /// Verbatim substring of the raw content this value was derived from.
  pub source_fragment: Option<String>,
}

impl SubValue {
  pub fn number(sub_field: impl Into<String>, value: f64) -> Self {
    Self::new(sub_field, Atom::Number(value))
  }

  pub fn text(sub_field: impl Into<String>, value: impl Into<String>) -> Self {
    Self::new(sub_field, Atom::Text(value.into()))
  }

  pub fn empty(sub_field: impl Into<String>) -> Self {
    Self::new(sub_field, Atom::Empty)
  }

  pub fn new(sub_field: impl Into<String>, atom: Atom) -> Self {
    Self {
      sub_field: sub_field.into(),
      atom,
      units: None,
      date_est: None,
      rank: None,
      source_fragment: None,
    }
  }

  pub fn units(mut self, units: impl Into<String>) -> Self {
    self.units = Some(units.into());
    self
  }

  pub fn maybe_units(mut self, units: Option<String>) -> Self {
    self.units = units;
    self
  }

  pub fn date_est(mut self, date_est: Option<String>) -> Self {
    self.date_est = date_est;
    self
  }

  pub fn rank(mut self, rank: Option<i64>) -> Self {
    self.rank = rank;
    self
  }

  pub fn numeric_value(&self) -> Option<f64> {
    match self.atom {
      Atom::Number(n) => Some(n),
      _ => None,
    }
  }

  pub fn text_value(&self) -> Option<&str> {
    match &self.atom {
      Atom::Text(t) => Some(t),
      _ => None,
    }
  }

  pub fn fragment_len(&self) -> usize {
    self.source_fragment.as_ref().map_or(0, |f| f.len())
  }
}
