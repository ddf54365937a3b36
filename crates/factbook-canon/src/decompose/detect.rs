//! Generic type detection for one value text: currency, magnitude, digit
//! grouping, unit vocabulary, date/estimate qualifier, global rank.

use std::ops::Range;

use factbook_core::subvalue::Atom;
use regex::{Captures, Regex};

use crate::{decompose::truncate_chars, error::Result};

/// A decimal number with optional sign and thousands grouping.
pub(crate) const NUM: &str = r"-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

/// Recognised trailing units, in their stored spelling.
const UNITS: &[&str] = &[
  // area & distance
  "sq km",
  "sq mi",
  "km2",
  "km",
  "nm",
  "mi",
  "m",
  "hectares",
  "ha",
  // rates
  "%",
  "per 1,000",
  "deaths/1,000 live births",
  "deaths/1,000 population",
  "births/1,000 population",
  "migrant(s)/1,000 population",
  "deaths/100,000 live births",
  "children born/woman",
  "physicians/1,000 population",
  "beds/1,000 population",
  // time
  "years",
  "year",
  "months",
  "days",
  // energy & volume
  "kWh",
  "kW",
  "MW",
  "bbl/day",
  "bbl",
  "cu m",
  "cu ft",
  "Btu",
  "metric tonnes",
  "metric tons",
  "tons",
  "liters",
  // currency
  "USD",
];

/// A value this wordy after its number and unit is a sentence, not a figure.
const MAX_TRAILING_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Detected {
  pub atom:     Atom,
  pub units:    Option<String>,
  pub date_est: Option<String>,
}

pub(crate) struct Detector {
  rank:          Regex,
  date:          Regex,
  leading:       Regex,
  unit:          Regex,
  parenthetical: Regex,
}

impl Detector {
  pub(crate) fn new() -> Result<Self> {
    let mut units: Vec<&str> = UNITS.to_vec();
    units.sort_by_key(|u| std::cmp::Reverse(u.len()));
    let units = units
      .iter()
      .map(|u| regex::escape(u).replace(' ', r"\s*"))
      .collect::<Vec<_>>()
      .join("|");

    Ok(Self {
      rank:          Regex::new(r"(?i)(?:\|\s*)?country comparison to the world:\s*(\d+)")?,
      date:          Regex::new(
        r"\(((?:[A-Z][a-z]+\.? )?\d{4}(?:\s*est\.?)?|FY\d{2,4}(?:/\d{2,4})?)\)",
      )?,
      leading:       Regex::new(&format!(
        r"(?is)^\s*(?P<neg>-)?\s*(?P<cur>US\$|\$|€|£)?\s*(?P<num>{NUM})\s*(?:(?P<mag>trillion|billion|million|thousand)\b)?\s*(?P<rest>.*)$"
      ))?,
      unit:          Regex::new(&format!(r"^(?:{units})"))?,
      parenthetical: Regex::new(r"\([^)]*\)")?,
    })
  }

  /// The global-rank annotation and the byte span it occupies.
  pub(crate) fn rank(&self, text: &str) -> Option<(i64, Range<usize>)> {
    let caps = self.rank.captures(text)?;
    let rank = caps[1].parse().ok()?;
    Some((rank, caps.get(0)?.range()))
  }

  /// First parenthetical date or estimate qualifier: `2024 est.`, `July 1990`,
  /// `FY93/94`.
  pub(crate) fn date_est(&self, text: &str) -> Option<String> {
    self.date.captures(text).map(|caps| caps[1].to_string())
  }

  pub(crate) fn detect(&self, text: &str, text_cap: usize) -> Detected {
    let text = text.trim();
    let date_est = self.date_est(text);
    if text.is_empty() {
      return Detected { atom: Atom::Empty, units: None, date_est };
    }
    match self.number(text) {
      Some((value, units)) => Detected { atom: Atom::Number(value), units, date_est },
      None => Detected {
        atom: Atom::Text(truncate_chars(text, text_cap).to_string()),
        units: None,
        date_est,
      },
    }
  }

  /// A leading figure with its unit, if the text is a figure at all.
  fn number(&self, text: &str) -> Option<(f64, Option<String>)> {
    let caps = self.leading.captures(text)?;
    let value = parse_number(&caps, "num")? * magnitude(&caps) * sign(&caps);
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    let (unit, after_unit) = match self.unit.find(rest) {
      Some(m) if !continues_word(&rest[m.end()..]) => (Some(normalize_unit(m.as_str())), &rest[m.end()..]),
      _ => (None, rest),
    };
    let units = match caps.name("cur").map(|m| m.as_str()) {
      Some("€") => Some("EUR".to_string()),
      Some("£") => Some("GBP".to_string()),
      Some(_) => Some("USD".to_string()),
      None => unit,
    };

    let trailing = self.parenthetical.replace_all(after_unit, " ");
    let words = trailing
      .split_whitespace()
      .filter(|w| w.chars().any(char::is_alphabetic))
      .count();
    (words <= MAX_TRAILING_WORDS).then_some((value, units))
  }
}

fn continues_word(after: &str) -> bool {
  after.chars().next().is_some_and(char::is_alphanumeric)
}

fn normalize_unit(unit: &str) -> String {
  let unit = unit.split_whitespace().collect::<Vec<_>>().join(" ");
  match unit.as_str() {
    "km2" | "sqkm" => "sq km".to_string(),
    "sqmi" => "sq mi".to_string(),
    _ => unit,
  }
}

/// The named numeric capture with digit grouping removed.
pub(crate) fn parse_number(caps: &Captures<'_>, group: &str) -> Option<f64> {
  caps.name(group)?.as_str().replace(',', "").parse().ok()
}

/// Multiplier for an optional `mag` capture.
pub(crate) fn magnitude(caps: &Captures<'_>) -> f64 {
  match caps.name("mag").map(|m| m.as_str().to_lowercase()).as_deref() {
    Some("trillion") => 1e12,
    Some("billion") => 1e9,
    Some("million") => 1e6,
    Some("thousand") => 1e3,
    _ => 1.0,
  }
}

/// `-1.0` when an optional `neg` capture matched.
pub(crate) fn sign(caps: &Captures<'_>) -> f64 {
  if caps.name("neg").is_some() { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detect(text: &str) -> Detected { Detector::new().unwrap().detect(text, 4000) }

  #[test]
  fn grouped_number_with_area_unit() {
    let d = detect("7,741,220 sq km");
    assert_eq!(d.atom, Atom::Number(7_741_220.0));
    assert_eq!(d.units.as_deref(), Some("sq km"));
  }

  #[test]
  fn currency_and_magnitude() {
    let d = detect("$25.46 trillion (2022 est.)");
    let Atom::Number(value) = d.atom else { panic!() };
    assert!((value - 25.46e12).abs() < 1.0);
    assert_eq!(d.units.as_deref(), Some("USD"));
    assert_eq!(d.date_est.as_deref(), Some("2022 est."));
  }

  #[test]
  fn negative_figure() {
    let Atom::Number(value) = detect("-$943.8 billion (2023 est.)").atom else { panic!() };
    assert!((value + 943.8e9).abs() < 1.0);
  }

  #[test]
  fn percent_and_month_dates() {
    let d = detect("0.4% (July 1990)");
    assert_eq!(d.atom, Atom::Number(0.4));
    assert_eq!(d.units.as_deref(), Some("%"));
    assert_eq!(d.date_est.as_deref(), Some("July 1990"));

    assert_eq!(detect("12% (FY93/94)").date_est.as_deref(), Some("FY93/94"));
  }

  #[test]
  fn km2_is_stored_as_sq_km() {
    assert_eq!(detect("1,000 km2").units.as_deref(), Some("sq km"));
  }

  #[test]
  fn unit_must_end_at_a_word_boundary() {
    let d = detect("12 mines");
    assert_eq!(d.atom, Atom::Number(12.0));
    assert_eq!(d.units, None);
  }

  #[test]
  fn sentences_stay_text() {
    let d = detect("17 states and one federal district (Distrito Federal)");
    assert_eq!(
      d.atom,
      Atom::Text("17 states and one federal district (Distrito Federal)".to_string())
    );
    assert_eq!(detect("temperate; mild winters").atom, Atom::Text("temperate; mild winters".into()));
  }

  #[test]
  fn text_is_capped() {
    let d = Detector::new().unwrap().detect(&"abc ".repeat(100), 10);
    assert_eq!(d.atom, Atom::Text("abc abc ab".to_string()));
  }

  #[test]
  fn rank_annotation_and_span() {
    let text = "total: 5 sq km | country comparison to the world: 42";
    let (rank, span) = Detector::new().unwrap().rank(text).unwrap();
    assert_eq!(rank, 42);
    assert_eq!(&text[span], "| country comparison to the world: 42");
  }

  #[test]
  fn empty_text() {
    assert_eq!(detect("   ").atom, Atom::Empty);
  }
}
