//! Field decomposition: raw content → typed sub-values.
//!
//! Every non-empty field yields at least one sub-value. Fragments are
//! verbatim, pairwise disjoint slices of the content, so their total length
//! never exceeds the content's. The global-rank annotation is masked out
//! before anything else runs and re-attached to the first sub-value.

mod detect;
mod fields;
mod split;

use std::{collections::HashMap, ops::Range};

use factbook_core::subvalue::{Atom, SubValue};

use self::{detect::Detector, fields::FieldParsers, split::Splitter};
use crate::error::Result;

/// Sub-field label for unlabeled values.
const VALUE: &str = "value";

pub struct Decomposer {
  detect:   Detector,
  split:    Splitter,
  fields:   FieldParsers,
  text_cap: usize,
}

/// What a field parser sees: the masked content and its first date
/// qualifier.
pub(crate) struct Input<'a> {
  pub text: &'a str,
  pub date: Option<&'a str>,
}

impl<'a> Input<'a> {
  pub(crate) fn undated(text: &'a str) -> Self { Self { text, date: None } }
}

impl Decomposer {
  /// `text_cap` bounds the length (in chars) of any stored text value.
  pub fn new(text_cap: usize) -> Result<Self> {
    Ok(Self {
      detect: Detector::new()?,
      split: Splitter::new()?,
      fields: FieldParsers::new()?,
      text_cap,
    })
  }

  /// Decompose one field. `field_name` is the canonical name when the field
  /// has been mapped, else its raw name; only canonical names select a
  /// field-specific parser.
  pub fn decompose(&self, field_name: &str, content: &str) -> Vec<SubValue> {
    if content.trim().is_empty() {
      return vec![SubValue::empty(VALUE)];
    }

    let rank = self.detect.rank(content);
    let masked = match &rank {
      Some((_, span)) => mask(content, span.clone()),
      None => content.to_string(),
    };
    let date = self.detect.date_est(&masked);
    let input = Input { text: &masked, date: date.as_deref() };
    let mut out = Emitter::new(content, &masked, self.text_cap);

    if let Some(rule) = self.fields.rule_for(field_name) {
      self.fields.apply(rule, &input, &mut out);
    }
    if out.is_empty() {
      self.generic(&input, &mut out);
    }
    if out.is_empty() {
      let detected = self.detect.detect(&masked, self.text_cap);
      out.push(
        SubValue {
          units: detected.units,
          date_est: detected.date_est,
          ..SubValue::new(VALUE, detected.atom)
        },
        0..masked.len(),
      );
    }
    out.finish(rank.map(|(rank, _)| rank))
  }

  fn generic(&self, input: &Input<'_>, out: &mut Emitter<'_>) {
    for part in self.split.split(input.text) {
      let detected = self.detect.detect(&input.text[part.span.clone()], self.text_cap);
      let label = part
        .label
        .as_deref()
        .map(normalize_label)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| VALUE.to_string());
      out.push(
        SubValue {
          units: detected.units,
          date_est: detected.date_est.or_else(|| input.date.map(str::to_string)),
          ..SubValue::new(label, detected.atom)
        },
        part.span,
      );
    }
  }
}

// ─── Emission ───────────────────────────────────────────────────────────────

/// Collects sub-values, keeping labels unique and fragments disjoint.
pub(crate) struct Emitter<'a> {
  raw:      &'a str,
  masked:   &'a str,
  text_cap: usize,
  claimed:  Vec<Range<usize>>,
  seen:     HashMap<String, usize>,
  values:   Vec<SubValue>,
}

impl<'a> Emitter<'a> {
  fn new(raw: &'a str, masked: &'a str, text_cap: usize) -> Self {
    Self {
      raw,
      masked,
      text_cap,
      claimed: Vec::new(),
      seen: HashMap::new(),
      values: Vec::new(),
    }
  }

  pub(crate) fn len(&self) -> usize { self.values.len() }

  pub(crate) fn is_empty(&self) -> bool { self.values.is_empty() }

  /// Record `value`, taking `span` of the raw content as its fragment when
  /// no earlier fragment overlaps it.
  pub(crate) fn push(&mut self, mut value: SubValue, span: Range<usize>) {
    let count = self.seen.entry(value.sub_field.clone()).or_insert(0);
    *count += 1;
    if *count > 1 {
      value.sub_field = format!("{}_{}", value.sub_field, count);
    }

    if let Atom::Text(text) = &value.atom {
      let capped = truncate_chars(text.trim(), self.text_cap);
      value.atom = if capped.is_empty() {
        Atom::Empty
      } else {
        Atom::Text(capped.to_string())
      };
    }

    if let Some(span) = self.trim(span)
      && !self.claimed.iter().any(|c| c.start < span.end && span.start < c.end)
      && let Some(fragment) = self.raw.get(span.clone())
    {
      value.source_fragment = Some(fragment.to_string());
      self.claimed.push(span);
    }
    self.values.push(value);
  }

  /// Shrink `span` to exclude whitespace and masked-out bytes at its edges.
  fn trim(&self, span: Range<usize>) -> Option<Range<usize>> {
    let slice = self.masked.get(span.clone())?;
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    (lead + trail < slice.len()).then(|| span.start + lead..span.end - trail)
  }

  fn finish(mut self, rank: Option<i64>) -> Vec<SubValue> {
    if let Some(first) = self.values.first_mut() {
      first.rank = rank;
    }
    self.values
  }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Blank out `span`, one space per byte, so offsets into the result still
/// index the original.
fn mask(content: &str, span: Range<usize>) -> String {
  let mut masked = String::with_capacity(content.len());
  masked.push_str(&content[..span.start]);
  masked.extend(std::iter::repeat_n(' ', span.len()));
  masked.push_str(&content[span.end..]);
  masked
}

/// `Arable Land` → `arable_land`.
pub(crate) fn normalize_label(label: &str) -> String {
  label
    .trim()
    .trim_end_matches(':')
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("_")
    .to_lowercase()
}

/// At most `max` chars of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
  match text.char_indices().nth(max) {
    Some((i, _)) => &text[..i],
    None => text,
  }
}
