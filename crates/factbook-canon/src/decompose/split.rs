//! Delimiter normalization: raw content → ordered `(label, value span)`.
//!
//! In priority order: the content separator when present, else `label:`
//! markers found by walking back from each colon, else the whole content as
//! one unlabeled unit. Spans index into the content so fragments stay
//! verbatim.

use std::ops::Range;

use factbook_core::record::CONTENT_SEPARATOR;
use regex::Regex;

use crate::error::Result;

/// Longest label the walk-back will assemble.
const MAX_LABEL_WORDS: usize = 4;

/// Tokens that end a figure and therefore cannot start a label.
const UNIT_WORDS: &[&str] = &[
  "sq", "km", "km2", "mi", "nm", "m", "ha", "hectares", "years", "year", "months", "days",
  "kw", "kwh", "bbl", "tons", "tonnes", "liters", "usd", "est", "est.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Part {
  pub label: Option<String>,
  pub span:  Range<usize>,
}

pub(crate) struct Splitter {
  label: Regex,
}

impl Splitter {
  pub(crate) fn new() -> Result<Self> {
    Ok(Self {
      label: Regex::new(r"^([A-Za-z][A-Za-z\s\-/()]{1,60}):(?:\s+|$)")?,
    })
  }

  pub(crate) fn split(&self, text: &str) -> Vec<Part> {
    if text.contains(CONTENT_SEPARATOR) {
      self.by_separator(text)
    } else {
      by_walk_back(text)
    }
  }

  fn by_separator(&self, text: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut pieces: Vec<Range<usize>> = text
      .match_indices(CONTENT_SEPARATOR)
      .map(|(i, _)| {
        let piece = start..i;
        start = i + CONTENT_SEPARATOR.len();
        piece
      })
      .collect();
    pieces.push(start..text.len());

    for piece in pieces {
      let Some(span) = trimmed(text, piece) else { continue };
      let body = &text[span.clone()];
      match self.label.captures(body) {
        Some(caps) => {
          let value = trimmed(text, span.start + caps[0].len()..span.end);
          parts.push(Part {
            label: Some(caps[1].trim().to_string()),
            span:  value.unwrap_or(span.end..span.end),
          });
        }
        None => parts.push(Part { label: None, span }),
      }
    }
    parts
  }
}

/// Labels found by walking back from each `:` over at most
/// [`MAX_LABEL_WORDS`] label-shaped words.
fn by_walk_back(text: &str) -> Vec<Part> {
  let mut labels: Vec<(Range<usize>, usize)> = Vec::new();
  let mut floor = 0;
  for (colon, _) in text.match_indices(':') {
    let after = &text[colon + 1..];
    if after.chars().next().is_some_and(|c| !c.is_whitespace()) {
      continue;
    }
    if let Some(start) = label_start(text, floor, colon) {
      labels.push((start..colon, colon + 1));
      floor = colon + 1;
    }
  }

  let mut parts = Vec::new();
  let first_label = labels.first().map_or(text.len(), |(label, _)| label.start);
  if let Some(span) = trimmed(text, 0..first_label) {
    parts.push(Part { label: None, span });
  }
  for (i, (label, value_start)) in labels.iter().enumerate() {
    let value_end = labels.get(i + 1).map_or(text.len(), |(next, _)| next.start);
    parts.push(Part {
      label: Some(text[label.clone()].to_string()),
      span:  trimmed(text, *value_start..value_end).unwrap_or(value_end..value_end),
    });
  }
  parts
}

fn label_start(text: &str, floor: usize, colon: usize) -> Option<usize> {
  let mut start = None;
  let mut end = colon;
  for words in 0..MAX_LABEL_WORDS {
    let head = &text[floor..end];
    // The first word must touch the colon.
    let head = if words == 0 { head } else { head.trim_end() };
    let token_start = head
      .char_indices()
      .rev()
      .find(|(_, c)| c.is_whitespace())
      .map_or(0, |(i, c)| i + c.len_utf8());
    let token = &head[token_start..];
    if !is_label_word(token) {
      break;
    }
    start = Some(floor + token_start);
    end = floor + token_start;
    if token.starts_with(char::is_uppercase) {
      break;
    }
  }
  start
}

fn is_label_word(token: &str) -> bool {
  let mut chars = token.chars();
  let Some(first) = chars.next() else { return false };
  first.is_ascii_alphabetic()
    && chars.all(|c| c.is_ascii_lowercase() || "()/-'".contains(c))
    && !UNIT_WORDS.contains(&token.to_lowercase().as_str())
}

fn trimmed(text: &str, span: Range<usize>) -> Option<Range<usize>> {
  let slice = &text[span.clone()];
  let lead = slice.len() - slice.trim_start().len();
  let trail = slice.len() - slice.trim_end().len();
  (lead + trail < slice.len()).then(|| span.start + lead..span.end - trail)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn split(text: &str) -> Vec<(Option<String>, String)> {
    Splitter::new()
      .unwrap()
      .split(text)
      .into_iter()
      .map(|p| (p.label, text[p.span].to_string()))
      .collect()
  }

  fn labeled(label: &str, value: &str) -> (Option<String>, String) {
    (Some(label.to_string()), value.to_string())
  }

  #[test]
  fn separator_wins() {
    assert_eq!(
      split("total: 7,741,220 sq km | land: 7,682,300 sq km | water: 58,920 sq km"),
      vec![
        labeled("total", "7,741,220 sq km"),
        labeled("land", "7,682,300 sq km"),
        labeled("water", "58,920 sq km"),
      ]
    );
  }

  #[test]
  fn separator_parts_without_labels() {
    assert_eq!(
      split("Canberra | note: 1 | 12:30 daily"),
      vec![
        (None, "Canberra".to_string()),
        labeled("note", "1"),
        (None, "12:30 daily".to_string()),
      ]
    );
  }

  #[test]
  fn walk_back_stops_at_units() {
    assert_eq!(
      split("total: 7,741,220 sq km land: 7,682,300 sq km water: 58,920 sq km"),
      vec![
        labeled("total", "7,741,220 sq km"),
        labeled("land", "7,682,300 sq km"),
        labeled("water", "58,920 sq km"),
      ]
    );
    assert_eq!(
      split("male: 81.3 years female: 85.7 years"),
      vec![labeled("male", "81.3 years"), labeled("female", "85.7 years")]
    );
  }

  #[test]
  fn walk_back_keeps_multi_word_labels() {
    assert_eq!(
      split("arable land: 1% permanent crops: 2% other: 97%"),
      vec![
        labeled("arable land", "1%"),
        labeled("permanent crops", "2%"),
        labeled("other", "97%"),
      ]
    );
  }

  #[test]
  fn leading_unlabeled_text_is_kept() {
    assert_eq!(
      split("Spanish 54% note: official"),
      vec![(None, "Spanish 54%".to_string()), labeled("note", "official")]
    );
  }

  #[test]
  fn no_markers_is_one_unit() {
    assert_eq!(
      split("temperate; ratio 2:1"),
      vec![(None, "temperate; ratio 2:1".to_string())]
    );
  }

  #[test]
  fn acronyms_are_not_labels() {
    assert_eq!(
      split("member of the EU: since 1995"),
      vec![(None, "member of the EU: since 1995".to_string())]
    );
  }
}
