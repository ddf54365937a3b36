//! Field-specific parsers for fields whose structure the generic splitter
//! cannot recover: unlabeled leading figures, per-year series, labels that
//! begin with a digit, embedded partner lists.
//!
//! A parser that recognises nothing emits nothing; the caller then falls
//! through to the generic path.

use std::{collections::HashMap, ops::Range};

use factbook_core::subvalue::SubValue;
use regex::{Captures, Regex};

use super::{
  Emitter,
  Input,
  detect::{NUM, magnitude, parse_number, sign},
  normalize_label,
};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FieldRule {
  Area,
  Population,
  LifeExpectancy,
  AgeStructure,
  VitalRate,
  InfantMortality,
  Fertility,
  DollarSeries,
  PercentOfGdp,
  PercentSeries,
  Trade,
  Budget,
  LandUse,
  Electricity,
  DependencyRatios,
  Urbanization,
  Elevation,
  Coordinates,
  Length,
  MedianAge,
}

/// Canonical field name → parser.
const REGISTRY: &[(&str, FieldRule)] = &[
  ("Area", FieldRule::Area),
  ("Population", FieldRule::Population),
  ("Life expectancy at birth", FieldRule::LifeExpectancy),
  ("Age structure", FieldRule::AgeStructure),
  ("Birth rate", FieldRule::VitalRate),
  ("Death rate", FieldRule::VitalRate),
  ("Infant mortality rate", FieldRule::InfantMortality),
  ("Total fertility rate", FieldRule::Fertility),
  ("Real GDP (purchasing power parity)", FieldRule::DollarSeries),
  ("GDP (purchasing power parity)", FieldRule::DollarSeries),
  ("Real GDP per capita", FieldRule::DollarSeries),
  ("GDP - per capita (PPP)", FieldRule::DollarSeries),
  ("GDP (official exchange rate)", FieldRule::DollarSeries),
  ("Current account balance", FieldRule::DollarSeries),
  ("Reserves of foreign exchange and gold", FieldRule::DollarSeries),
  ("Military expenditures", FieldRule::PercentOfGdp),
  ("Exports", FieldRule::Trade),
  ("Imports", FieldRule::Trade),
  ("Budget", FieldRule::Budget),
  ("Land use", FieldRule::LandUse),
  ("Electricity", FieldRule::Electricity),
  ("Unemployment rate", FieldRule::PercentSeries),
  ("Inflation rate (consumer prices)", FieldRule::PercentSeries),
  ("Real GDP growth rate", FieldRule::PercentSeries),
  ("GDP - real growth rate", FieldRule::PercentSeries),
  ("Population growth rate", FieldRule::PercentSeries),
  ("Public debt", FieldRule::PercentSeries),
  ("Industrial production growth rate", FieldRule::PercentSeries),
  ("Dependency ratios", FieldRule::DependencyRatios),
  ("Urbanization", FieldRule::Urbanization),
  ("Elevation", FieldRule::Elevation),
  ("Geographic coordinates", FieldRule::Coordinates),
  ("Coastline", FieldRule::Length),
  ("Median age", FieldRule::MedianAge),
];

/// A pattern with a `num` capture (and optionally `mag` / `neg`) emitted
/// under a fixed label.
struct Labeled {
  sub:   &'static str,
  re:    Regex,
  units: Option<&'static str>,
}

impl Labeled {
  fn new(sub: &'static str, pattern: &str, units: Option<&'static str>) -> Result<Self> {
    Ok(Self { sub, re: Regex::new(pattern)?, units })
  }
}

fn num(name: &str) -> String { format!("(?P<{name}>{NUM})") }

/// `(?i)\b<label>\s*:?\s*<num><suffix>` for each label.
fn labels(
  rows: &[(&'static str, &str)],
  suffix: &str,
  units: Option<&'static str>,
) -> Result<Vec<Labeled>> {
  rows
    .iter()
    .map(|(sub, label)| {
      Labeled::new(
        sub,
        &format!(r"(?i)\b{label}\s*:?\s*{}{suffix}", num("num")),
        units,
      )
    })
    .collect()
}

pub(crate) struct FieldParsers {
  registry:           HashMap<&'static str, FieldRule>,
  leading:            Regex,
  note:               Regex,
  area:               Vec<Labeled>,
  comparative:        Regex,
  population:         Vec<Labeled>,
  population_legacy:  Regex,
  growth:             Regex,
  life:               Vec<Labeled>,
  life_legacy:        Regex,
  life_bare:          Regex,
  age:                Regex,
  vital:              Regex,
  infant:             Vec<Labeled>,
  infant_legacy:      Regex,
  fertility:          Regex,
  dollars:            Regex,
  pct_gdp:            Regex,
  pct:                Regex,
  commodities:        Regex,
  partners:           Regex,
  partner:            Regex,
  budget:             Vec<Labeled>,
  land_use:           Vec<Labeled>,
  electricity:        Vec<Labeled>,
  electricity_legacy: Vec<Labeled>,
  ratios:             Vec<Labeled>,
  urbanization:       Vec<Labeled>,
  elevation_mean:     Vec<Labeled>,
  extremes:           Vec<(&'static str, Regex)>,
  coordinates:        Regex,
  length:             Regex,
  median_age:         Vec<Labeled>,
}

impl FieldParsers {
  pub(crate) fn new() -> Result<Self> {
    let n = num("num");
    let area_units = r"\s*(?:sq\s*km|km2)";
    let kwh = r"\s*(?P<mag>trillion|billion|million|thousand)?\s*kWh\b";
    let magnitude_word = r"\s*(?P<mag>trillion|billion|million)?";

    Ok(Self {
      registry:           REGISTRY.iter().copied().collect(),
      leading:            Regex::new(&format!(r"^\s*{n}"))?,
      note:               Regex::new(r"(?i)\bnote\s*:\s*(?P<text>[^|]+)")?,
      area:               labels(
        &[("total", "total(?: area)?"), ("land", "land(?: area)?"), ("water", "water(?: area)?")],
        area_units,
        Some("sq km"),
      )?,
      comparative:        Regex::new(r"(?i)\bcomparative(?: area)?\s*:?\s*(?P<text>[^|]+)")?,
      population:         labels(
        &[("total", "total:"), ("male", "male:"), ("female", "female:")],
        "",
        None,
      )?,
      population_legacy:  Regex::new(r"(?P<num>\d{1,3}(?:,\d{3})+|\d{5,})")?,
      growth:             Regex::new(&format!(r"(?i)growth rate\s*{n}%"))?,
      life:               labels(
        &[
          ("total_population", "total population:"),
          ("male", "male:"),
          ("female", "female:"),
        ],
        r"\s*years",
        Some("years"),
      )?,
      life_legacy:        Regex::new(&format!(
        r"(?i){}\s*years?\s*male\b.*?{}\s*years?\s*female",
        num("male"),
        num("female")
      ))?,
      life_bare:          Regex::new(&format!(r"(?i)^\s*{n}\s*years?"))?,
      age:                Regex::new(&format!(
        r"(?i)(?P<bracket>\d+\s*[-–]\s*\d+\s*years?|\d+\s*years?\s*and\s*over)\s*:\s*{n}%(?:\s*\(\d{{4}}\s*est\.?\))?(?:\s*\(?\s*male\s*{}\s*[/;,]\s*female\s*{}\s*\)?)?",
        num("male"),
        num("female")
      ))?,
      vital:              Regex::new(&format!(r"(?i){n}\s*(?:births|deaths)\s*/\s*1,000"))?,
      infant:             labels(
        &[("total", "total:"), ("male", "male:"), ("female", "female:")],
        r"\s*deaths",
        Some("deaths/1,000 live births"),
      )?,
      infant_legacy:      Regex::new(&format!(r"(?i){n}\s*(?:deaths|per)"))?,
      fertility:          Regex::new(&format!(
        r"(?i){n}\s*(?P<unit>children born/woman|%|years?|births)"
      ))?,
      dollars:            Regex::new(&format!(
        r"(?i)(?P<neg>-)?\$\s?{n}{magnitude_word}(?:\s*\((?P<year>\d{{4}})\s*est\.?\))?"
      ))?,
      pct_gdp:            Regex::new(&format!(
        r"(?i){n}%\s*(?:of\s*G[DN]P)?(?:\s*\((?P<year>\d{{4}})\s*est\.?\))?"
      ))?,
      pct:                Regex::new(&format!(r"{n}%(?:\s*\((?P<year>\d{{4}})\s*est\.?\))?"))?,
      commodities:        Regex::new(r"(?i)\bcommodities\s*[-:]\s*(?P<text>[^|]+)")?,
      partners:           Regex::new(r"(?i)\bpartners\s*[-:]\s*(?P<text>[^|]+)")?,
      partner:            Regex::new(r"(?P<name>[A-Z][\w .'-]*?)\s+(?P<num>\d+(?:\.\d+)?)%")?,
      budget:             labels(
        &[("revenues", "revenues"), ("expenditures", "expenditures")],
        magnitude_word,
        Some("USD"),
      )?
      .into_iter()
      .map(|row| {
        let pattern = row.re.as_str().replacen(r"\s*:?\s*", r"\s*:?\s*(?P<neg>-)?\$?\s?", 1);
        Labeled::new(row.sub, &pattern, row.units)
      })
      .collect::<Result<_>>()?,
      land_use:           labels(
        &[
          ("agricultural_land", "agricultural land"),
          ("arable_land", "arable land"),
          ("permanent_crops", "permanent crops"),
          ("permanent_pasture", "permanent pasture"),
          ("forest", "forest"),
          ("other", "other"),
        ],
        "%",
        Some("%"),
      )?,
      electricity:        vec![
        Labeled::new(
          "installed_generating_capacity",
          &format!(
            r"(?i)(?:installed\s+generating\s+)?capacity\s*:\s*{n}\s*(?P<mag>billion|million|thousand)?\s*kW\b"
          ),
          Some("kW"),
        )?,
        Labeled::new("consumption", &format!(r"(?i)\bconsumption\s*:\s*{n}{kwh}"), Some("kWh"))?,
        Labeled::new("exports", &format!(r"(?i)\bexports\s*:\s*{n}{kwh}"), Some("kWh"))?,
        Labeled::new("imports", &format!(r"(?i)\bimports\s*:\s*{n}{kwh}"), Some("kWh"))?,
        Labeled::new("production", &format!(r"(?i)\bproduction\s*:\s*{n}{kwh}"), Some("kWh"))?,
      ],
      electricity_legacy: vec![
        Labeled::new(
          "installed_generating_capacity",
          &format!(r"(?i){n}\s*(?P<mag>million)?\s*kW\s+capacity"),
          Some("kW"),
        )?,
        Labeled::new(
          "production",
          &format!(r"(?i){n}\s*(?P<mag>billion|million)?\s*kWh\s*(?:produced|production)"),
          Some("kWh"),
        )?,
      ],
      ratios:             labels(
        &[
          ("total", "total dependency ratio"),
          ("youth", "youth dependency ratio"),
          ("elderly", "elderly dependency ratio"),
          ("potential_support_ratio", "potential support ratio"),
        ],
        "",
        None,
      )?,
      urbanization:       labels(
        &[
          ("urban_population", "urban population:"),
          ("rate_of_urbanization", "rate of urbanization:"),
        ],
        "%",
        Some("%"),
      )?,
      elevation_mean:     labels(&[("mean", "mean elevation")], r"\s*m\b", Some("m"))?,
      extremes:           vec![
        (
          "highest",
          Regex::new(&format!(r"(?i)highest point\s*:?\s*(?P<text>[^|]+?)\s+{n}\s*m\b"))?,
        ),
        (
          "lowest",
          Regex::new(&format!(r"(?i)lowest point\s*:?\s*(?P<text>[^|]+?)\s+{n}\s*m\b"))?,
        ),
      ],
      coordinates:        Regex::new(
        r"(?P<lat>\d+)\s+(?P<latm>\d+)\s*(?P<ns>[NS])\s*,?\s*(?P<lon>\d+)\s+(?P<lonm>\d+)\s*(?P<ew>[EW])",
      )?,
      length:             Regex::new(&format!(
        r"{n}\s*(?P<unit>sq\s*km|km2|km|nm|m|hectares)\b"
      ))?,
      median_age:         labels(
        &[("total", "total:"), ("male", "male:"), ("female", "female:")],
        r"\s*years",
        Some("years"),
      )?,
    })
  }

  pub(crate) fn rule_for(&self, field_name: &str) -> Option<FieldRule> {
    self.registry.get(field_name).copied()
  }

  pub(crate) fn apply(&self, rule: FieldRule, input: &Input<'_>, out: &mut Emitter<'_>) {
    match rule {
      FieldRule::Area => {
        self.labeled(&self.area, input, out);
        self.text(&self.comparative, "comparative", input, out);
        self.text(&self.note, "note", input, out);
      }
      FieldRule::Population => self.population(input, out),
      FieldRule::LifeExpectancy => self.life_expectancy(input, out),
      FieldRule::AgeStructure => self.age_structure(input, out),
      FieldRule::VitalRate => {
        if !self.single(&self.vital, "value", Some("per 1,000"), input, out) {
          self.single(&self.leading, "value", Some("per 1,000"), input, out);
        }
      }
      FieldRule::InfantMortality => {
        if !self.labeled(&self.infant, input, out) {
          self.single(&self.infant_legacy, "total", Some("deaths/1,000 live births"), input, out);
        }
      }
      FieldRule::Fertility => {
        if let Some(caps) = self.fertility.captures(input.text) {
          let units = caps["unit"].to_string();
          emit_number(&caps, "num", "value", Some(units), input, out);
        } else {
          self.single(&self.leading, "value", None, input, out);
        }
      }
      FieldRule::DollarSeries => {
        self.series(&self.dollars, "value", Some("USD"), input, out);
        self.text(&self.note, "note", input, out);
      }
      FieldRule::PercentOfGdp => self.series(&self.pct_gdp, "pct_gdp", Some("% of GDP"), input, out),
      FieldRule::PercentSeries => {
        self.series(&self.pct, "value", Some("%"), input, out);
        self.text(&self.note, "note", input, out);
      }
      FieldRule::Trade => self.trade(input, out),
      FieldRule::Budget => {
        self.labeled(&self.budget, input, out);
      }
      FieldRule::LandUse => {
        self.labeled(&self.land_use, input, out);
      }
      FieldRule::Electricity => {
        if !self.labeled(&self.electricity, input, out) {
          self.labeled(&self.electricity_legacy, input, out);
        }
      }
      FieldRule::DependencyRatios => {
        self.labeled(&self.ratios, input, out);
      }
      FieldRule::Urbanization => {
        self.labeled(&self.urbanization, input, out);
      }
      FieldRule::Elevation => self.elevation(input, out),
      FieldRule::Coordinates => self.coordinates(input, out),
      FieldRule::Length => {
        if let Some(caps) = self.length.captures(input.text) {
          let unit = caps["unit"].split_whitespace().collect::<Vec<_>>().join(" ");
          let unit = if unit == "km2" || unit == "sqkm" { "sq km".to_string() } else { unit };
          emit_number(&caps, "num", "value", Some(unit), input, out);
        }
      }
      FieldRule::MedianAge => {
        self.labeled(&self.median_age, input, out);
      }
    }
  }

  // ── Shared shapes ─────────────────────────────────────────────────────

  /// Each row at most once; returns whether anything matched.
  fn labeled(&self, rows: &[Labeled], input: &Input<'_>, out: &mut Emitter<'_>) -> bool {
    let before = out.len();
    for row in rows {
      if let Some(caps) = row.re.captures(input.text) {
        emit_number(&caps, "num", row.sub, row.units.map(str::to_string), input, out);
      }
    }
    out.len() > before
  }

  /// First match of a single-number pattern.
  fn single(
    &self,
    re: &Regex,
    sub: &str,
    units: Option<&str>,
    input: &Input<'_>,
    out: &mut Emitter<'_>,
  ) -> bool {
    match re.captures(input.text) {
      Some(caps) => {
        emit_number(&caps, "num", sub, units.map(str::to_string), input, out);
        true
      }
      None => false,
    }
  }

  /// Repeated `figure (YYYY est.)` entries, labelled `<prefix>_<year>` or
  /// positionally when undated.
  fn series(
    &self,
    re: &Regex,
    prefix: &str,
    units: Option<&str>,
    input: &Input<'_>,
    out: &mut Emitter<'_>,
  ) {
    for (i, caps) in re.captures_iter(input.text).enumerate() {
      let Some(value) = figure(&caps, "num") else { continue };
      let year = caps.name("year").map(|m| m.as_str());
      let sub = match (year, i) {
        (Some(year), _) => format!("{prefix}_{year}"),
        (None, 0) => prefix.to_string(),
        (None, i) => format!("{prefix}_{i}"),
      };
      let value = SubValue::number(sub, value)
        .maybe_units(units.map(str::to_string))
        .date_est(year.map(|y| format!("{y} est.")));
      out.push(value, whole(&caps));
    }
  }

  fn text(&self, re: &Regex, sub: &str, input: &Input<'_>, out: &mut Emitter<'_>) {
    if let Some(m) = re.captures(input.text).and_then(|caps| caps.name("text")) {
      let text = m.as_str().trim();
      if !text.is_empty() {
        out.push(SubValue::text(sub, text), m.range());
      }
    }
  }

  // ── Specific fields ───────────────────────────────────────────────────

  fn population(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    if self.labeled(&self.population, input, out) {
      return;
    }
    self.single(&self.population_legacy, "total", None, input, out);
    if let Some(caps) = self.growth.captures(input.text) {
      emit_number(&caps, "num", "growth_rate", Some("%".into()), input, out);
    }
  }

  fn life_expectancy(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    if self.labeled(&self.life, input, out) {
      return;
    }
    if let Some(caps) = self.life_legacy.captures(input.text) {
      emit_number(&caps, "male", "male", Some("years".into()), input, out);
      emit_number(&caps, "female", "female", Some("years".into()), input, out);
      return;
    }
    self.single(&self.life_bare, "total_population", Some("years"), input, out);
  }

  fn age_structure(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    for caps in self.age.captures_iter(input.text) {
      let bracket = normalize_label(&caps["bracket"].replace('–', "-"));
      let Some(pct) = figure(&caps, "num") else { continue };
      let (Some(start), Some(end)) = (caps.get(0), caps.name("num")) else { continue };
      // through the `%`
      let span = start.start()..end.end() + 1;
      out.push(
        SubValue::number(format!("{bracket}_pct"), pct)
          .units("%")
          .date_est(input.date.map(str::to_string)),
        span,
      );
      emit_number(&caps, "male", &format!("{bracket}_male"), None, &Input::undated(input.text), out);
      emit_number(&caps, "female", &format!("{bracket}_female"), None, &Input::undated(input.text), out);
    }
  }

  fn trade(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    self.series(&self.dollars, "value", Some("USD"), input, out);
    self.text(&self.commodities, "commodities", input, out);

    let Some(list) = self.partners.captures(input.text).and_then(|c| c.name("text")) else {
      return;
    };
    let before = out.len();
    for caps in self.partner.captures_iter(list.as_str()) {
      let name = caps["name"].trim().trim_end_matches(',');
      let Some(pct) = parse_number(&caps, "num") else { continue };
      if pct <= 0.0 || name.len() >= 50 {
        continue;
      }
      let Some(m) = caps.get(0) else { continue };
      let span = list.start() + m.start()..list.start() + m.end();
      out.push(
        SubValue::number(format!("partner_{}", normalize_label(name)), pct).units("%"),
        span,
      );
    }
    if out.len() == before {
      let text = list.as_str().trim();
      if !text.is_empty() {
        out.push(SubValue::text("partners", text), list.range());
      }
    }
  }

  fn elevation(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    self.labeled(&self.elevation_mean, input, out);
    for (sub, re) in &self.extremes {
      let Some(caps) = re.captures(input.text) else { continue };
      emit_number(&caps, "num", sub, Some("m".into()), &Input::undated(input.text), out);
      if let Some(place) = caps.name("text") {
        out.push(SubValue::text(format!("{sub}_point"), place.as_str().trim()), place.range());
      }
    }
  }

  fn coordinates(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    let Some(caps) = self.coordinates.captures(input.text) else { return };
    let degrees = |deg: &str, min: &str, negative: bool| -> Option<f64> {
      let value = caps[deg].parse::<f64>().ok()? + caps[min].parse::<f64>().ok()? / 60.0;
      let value = (value * 10_000.0).round() / 10_000.0;
      Some(if negative { -value } else { value })
    };
    let (Some(lat), Some(lon)) = (
      degrees("lat", "latm", &caps["ns"] == "S"),
      degrees("lon", "lonm", &caps["ew"] == "W"),
    ) else {
      return;
    };
    let (Some(lat_start), Some(ns), Some(lon_start), Some(ew)) =
      (caps.name("lat"), caps.name("ns"), caps.name("lon"), caps.name("ew"))
    else {
      return;
    };
    out.push(SubValue::number("latitude", lat).units("degrees"), lat_start.start()..ns.end());
    out.push(SubValue::number("longitude", lon).units("degrees"), lon_start.start()..ew.end());
  }
}

/// The figure in `group`, scaled by `mag` and signed by `neg` when present.
fn figure(caps: &Captures<'_>, group: &str) -> Option<f64> {
  Some(parse_number(caps, group)? * magnitude(caps) * sign(caps))
}

fn whole(caps: &Captures<'_>) -> Range<usize> { caps.get(0).map_or(0..0, |m| m.range()) }

/// Emit the figure in `group`. The fragment is the whole match for `num`,
/// else just the group.
fn emit_number(
  caps: &Captures<'_>,
  group: &str,
  sub: &str,
  units: Option<String>,
  input: &Input<'_>,
  out: &mut Emitter<'_>,
) {
  let Some(value) = figure(caps, group) else { return };
  let span = if group == "num" {
    whole(caps)
  } else {
    caps.name(group).map_or(0..0, |m| m.range())
  };
  out.push(
    SubValue::number(sub, value)
      .maybe_units(units)
      .date_est(input.date.map(str::to_string)),
    span,
  );
}
