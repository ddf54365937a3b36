//! The plain-text engine: interprets a [`TextGrammar`] row against one
//! edition file and yields every entity found in it.

use std::collections::HashMap;

use factbook_core::parsed::{ParsedEntity, ParsedField, ParsedSection, RawDocument};
use regex::Regex;

use crate::{
  EraParser, clean,
  era::Era,
  error::Result,
  grammar::{self, Blocks, FieldStyle, SectionRule, TextGrammar},
};

// ─── Line patterns ───────────────────────────────────────────────────────────

struct LinePatterns {
  long_rule:      Regex,
  short_rule:     Regex,
  inline_field:   Regex,
  inline_label:   Regex,
  indented_sub:   Regex,
  indented_label: Regex,
  mixed_field:    Regex,
  mixed_sub:      Regex,
}

impl LinePatterns {
  fn new() -> Result<Self> {
    Ok(Self {
      long_rule:      Regex::new(r"^[-=_]{10,}$")?,
      short_rule:     Regex::new(r"^[*\-=_]{5,}")?,
      inline_field:   Regex::new(r"^([A-Z][\w\s\-,()/]+?):\s+(.+)")?,
      inline_label:   Regex::new(r"^[A-Z][\w\s\-,()/]+?:")?,
      indented_sub:   Regex::new(r"^(\w[\w\s\-]*?):\s+(.+)")?,
      indented_label: Regex::new(r"^(\w[\w\s\-]*?):\s*$")?,
      mixed_field:    Regex::new(r"^\s{0,2}([A-Z][\w\s\-,()/.]+?):\s*(.*)")?,
      mixed_sub:      Regex::new(r"^\s+(\w[\w\s\-]*?):\s+(.+)")?,
    })
  }

  fn extract(&self, style: FieldStyle, text: &str) -> Vec<ParsedField> {
    match style {
      FieldStyle::Inline => self.inline(text),
      FieldStyle::Indented => self.indented(text),
      FieldStyle::Mixed => self.mixed(text),
      FieldStyle::Tagged => tagged(text),
    }
  }

  fn inline(&self, text: &str) -> Vec<ParsedField> {
    let mut fields = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
      let stripped = line.trim();
      if stripped.is_empty() || self.long_rule.is_match(stripped) {
        continue;
      }
      if let Some(caps) = self.inline_field.captures(stripped) {
        if let Some((name, value)) = current.take() {
          push_field(&mut fields, &name, &value);
        }
        current = Some((caps[1].to_string(), caps[2].to_string()));
      } else if let Some((_, value)) = current.as_mut()
        && !self.inline_label.is_match(stripped)
      {
        value.push(' ');
        value.push_str(stripped);
      }
    }
    if let Some((name, value)) = current {
      push_field(&mut fields, &name, &value);
    }
    fields
  }

  fn indented(&self, text: &str) -> Vec<ParsedField> {
    let mut fields = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
      let stripped = line.trim();
      if stripped.is_empty() || self.short_rule.is_match(stripped) {
        continue;
      }
      let at_margin = !line.starts_with(char::is_whitespace);
      if at_margin && let Some((name, rest)) = line.split_once(':') {
        if let Some((name, parts)) = current.take() {
          push_joined(&mut fields, &name, &parts);
        }
        let rest = rest.trim();
        let parts = if rest.is_empty() { Vec::new() } else { vec![rest.to_string()] };
        current = Some((name.trim().to_string(), parts));
      } else if !at_margin && let Some((_, parts)) = current.as_mut() {
        if let Some(caps) = self.indented_sub.captures(stripped) {
          parts.push(format!("{}: {}", caps[1].trim(), caps[2].trim()));
        } else if let Some(caps) = self.indented_label.captures(stripped) {
          parts.push(format!("{}:", &caps[1]));
        } else {
          parts.push(stripped.to_string());
        }
      }
    }
    if let Some((name, parts)) = current {
      push_joined(&mut fields, &name, &parts);
    }
    fields
  }

  fn mixed(&self, text: &str) -> Vec<ParsedField> {
    let mut fields = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
      let stripped = line.trim();
      if stripped.is_empty() || self.long_rule.is_match(stripped) {
        continue;
      }
      if let Some(caps) = self.mixed_field.captures(line) {
        let name = caps[1].trim();
        if !name.is_empty() {
          if let Some((name, parts)) = current.take() {
            push_joined(&mut fields, &name, &parts);
          }
          let value = caps[2].trim();
          let parts = if value.is_empty() { Vec::new() } else { vec![value.to_string()] };
          current = Some((name.to_string(), parts));
          continue;
        }
      }
      // Lower-case labels stay inside the current field's content.
      if let Some((_, parts)) = current.as_mut() {
        match self.mixed_sub.captures(line) {
          Some(caps) => parts.push(format!("{}: {}", caps[1].trim(), caps[2].trim())),
          None => parts.push(stripped.to_string()),
        }
      }
    }
    if let Some((name, parts)) = current {
      push_joined(&mut fields, &name, &parts);
    }
    fields
  }
}

fn tagged(text: &str) -> Vec<ParsedField> {
  let mut fields: Vec<ParsedField> = Vec::new();
  for line in text.lines() {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("_#_") {
      if let Some((name, value)) = rest.trim().split_once(':') {
        push_field(&mut fields, name, value);
      }
    } else if !line.is_empty()
      && !line.starts_with('_')
      && let Some(last) = fields.last_mut()
    {
      last.content.push(' ');
      last.content.push_str(line);
    }
  }
  fields
}

fn push_field(fields: &mut Vec<ParsedField>, name: &str, value: &str) {
  let (name, value) = (name.trim(), value.trim());
  if !name.is_empty() && !value.is_empty() {
    fields.push(ParsedField::new(name, value));
  }
}

fn push_joined(fields: &mut Vec<ParsedField>, name: &str, parts: &[String]) {
  push_field(fields, name, &parts.join(factbook_core::record::CONTENT_SEPARATOR));
}

// ─── Markers ─────────────────────────────────────────────────────────────────

struct Marker<'t> {
  start:   usize,
  end:     usize,
  name:    &'t str,
  section: Option<&'t str>,
}

fn markers<'t>(re: &Regex, text: &'t str) -> Vec<Marker<'t>> {
  re.captures_iter(text)
    .filter_map(|caps| {
      let whole = caps.get(0)?;
      Some(Marker {
        start:   whole.start(),
        end:     whole.end(),
        name:    caps.name("name").map_or("", |m| m.as_str()),
        section: caps.name("section").map(|m| m.as_str()),
      })
    })
    .collect()
}

/// Pair each marker with the text running up to the next marker.
fn with_bodies<'m, 't>(
  markers: &'m [Marker<'t>],
  text: &'t str,
) -> impl Iterator<Item = (&'m Marker<'t>, &'t str)> {
  markers.iter().enumerate().map(move |(i, m)| {
    let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
    (m, &text[m.end..end])
  })
}

/// Split a block at bare headings. The first element keeps the block's own
/// title (`None`).
fn split_bare<'t>(re: &Regex, text: &'t str) -> Vec<(Option<String>, &'t str)> {
  let found: Vec<_> = re.captures_iter(text).collect();
  let Some(first) = found.first().and_then(|c| c.get(0)) else {
    return vec![(None, text)];
  };
  let mut parts = vec![(None, &text[..first.start()])];
  for (i, caps) in found.iter().enumerate() {
    let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
      continue;
    };
    let end = found
      .get(i + 1)
      .and_then(|c| c.get(0))
      .map_or(text.len(), |m| m.start());
    parts.push((Some(title.as_str().trim().to_string()), &text[whole.end()..end]));
  }
  parts
}

fn is_underline(line: &str) -> bool {
  !line.is_empty() && (line.chars().all(|c| c == '-') || line.chars().all(|c| c == '='))
}

/// `Introduction Top of Page` → `Introduction`.
fn known_heading(title: &str) -> String {
  let mut vocabulary: Vec<&str> = grammar::SECTION_VOCABULARY.to_vec();
  vocabulary.sort_by_key(|w| std::cmp::Reverse(w.len()));
  vocabulary
    .into_iter()
    .find(|known| title.starts_with(known))
    .unwrap_or(title)
    .to_string()
}

fn line_sections<F>(text: &str, mut heading: F) -> Vec<(String, String)>
where
  F: FnMut(&str) -> Option<String>,
{
  let mut sections: Vec<(String, String)> = Vec::new();
  for line in text.lines() {
    if is_underline(line.trim()) {
      continue;
    }
    if let Some(title) = heading(line) {
      sections.push((title, String::new()));
    } else if let Some((_, body)) = sections.last_mut() {
      body.push_str(line);
      body.push('\n');
    }
  }
  sections
}

fn nested_sections(rule: &SectionRule, name: &str, text: &str) -> Vec<(String, String)> {
  match rule {
    SectionRule::Prefixed(re) => {
      let found = markers(re, text);
      with_bodies(&found, text)
        .filter_map(|(m, body)| {
          let title = m.section?.trim();
          (!title.is_empty()).then(|| (title.to_string(), body.to_string()))
        })
        .collect()
    }
    SectionRule::BareLines(vocabulary) => line_sections(text, |line| {
      let stripped = line.trim();
      vocabulary.contains(&stripped).then(|| stripped.to_string())
    }),
    SectionRule::NameRepeat => line_sections(text, |line| {
      let rest = line.strip_prefix(name)?;
      let gutter = rest.len() - rest.trim_start_matches([' ', '\t']).len();
      let title = rest.trim();
      (gutter >= 4 && title.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        .then(|| known_heading(title))
    }),
  }
}

// ─── Accumulator ─────────────────────────────────────────────────────────────

/// Entities and their sections in first-seen order. Repeated sections under
/// one entity are merged.
#[derive(Default)]
struct Edition {
  entities: Vec<(String, Vec<(String, String)>)>,
  index:    HashMap<String, usize>,
}

impl Edition {
  fn push(&mut self, name: &str, title: &str, body: &str) {
    let slot = match self.index.get(name) {
      Some(&slot) => slot,
      None => {
        self.entities.push((name.to_string(), Vec::new()));
        self.index.insert(name.to_string(), self.entities.len() - 1);
        self.entities.len() - 1
      }
    };
    let sections = &mut self.entities[slot].1;
    match sections.iter_mut().find(|(t, _)| t == title) {
      Some((_, existing)) => {
        existing.push('\n');
        existing.push_str(body);
      }
      None => sections.push((title.to_string(), body.to_string())),
    }
  }

  fn finish(self, patterns: &LinePatterns, style: FieldStyle) -> Vec<ParsedEntity> {
    self
      .entities
      .into_iter()
      .filter_map(|(name, sections)| {
        let sections: Vec<ParsedSection> = sections
          .into_iter()
          .filter_map(|(title, body)| {
            let fields = patterns.extract(style, &body);
            (!fields.is_empty()).then_some(ParsedSection { title: Some(title), fields })
          })
          .collect();
        (!sections.is_empty()).then_some(ParsedEntity {
          code: None,
          name,
          sections,
          fallback: false,
        })
      })
      .collect()
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

pub(crate) struct TextParser {
  grammars: Vec<TextGrammar>,
  lines:    LinePatterns,
}

impl TextParser {
  pub(crate) fn new() -> Result<Self> {
    Ok(Self {
      grammars: grammar::text_grammars()?,
      lines:    LinePatterns::new()?,
    })
  }

  /// Every entity recognised in a whole-edition text. Empty when nothing was
  /// recognised; the caller decides on the fallback.
  pub(crate) fn parse_str(&self, era: Era, text: &str) -> Vec<ParsedEntity> {
    let Some(grammar) = self.grammars.iter().find(|g| g.era == era) else {
      return Vec::new();
    };
    let normalized = text.replace("\r\n", "\n");
    let mut body = clean::strip_gutenberg(&normalized);
    if let Some(found) = grammar.preamble.as_ref().and_then(|re| re.find(body)) {
      body = &body[found.end()..];
    }

    let mut edition = Edition::default();
    match &grammar.blocks {
      Blocks::Combined(re) => {
        let found = markers(re, body);
        for (marker, block) in with_bodies(&found, body) {
          let (Some(name), Some(section)) =
            (clean::entity_name(marker.name), marker.section)
          else {
            continue;
          };
          let section = section.trim();
          match &grammar.bare_splits {
            Some(split) => {
              for (title, text) in split_bare(split, block) {
                edition.push(&name, title.as_deref().unwrap_or(section), text);
              }
            }
            None => edition.push(&name, section, block),
          }
        }
      }
      Blocks::Nested { entity, sections } => {
        let found = markers(entity, body);
        for (marker, block) in with_bodies(&found, body) {
          let Some(name) = clean::entity_name(marker.name) else {
            continue;
          };
          for (title, text) in nested_sections(sections, marker.name.trim(), block) {
            edition.push(&name, &title, &text);
          }
        }
      }
    }
    edition.finish(&self.lines, grammar.fields)
  }
}

impl EraParser for TextParser {
  fn parse(&self, era: Era, doc: &RawDocument) -> Vec<ParsedEntity> {
    self.parse_str(era, &doc.text())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parser() -> TextParser { TextParser::new().unwrap() }

  fn titles(entity: &ParsedEntity) -> Vec<&str> {
    entity.sections.iter().filter_map(|s| s.title.as_deref()).collect()
  }

  #[test]
  fn column_era_reads_inline_fields() {
    let text = "Preface\n\nCountry:  Afghanistan\n- Geography\nTotal area: 647,500 km2\n\
                Land boundaries: 5,529 km total; China 76 km,\n  Iran 936 km\n\
                - People\nPopulation: 15,862,293 (July 1990)\n\n\
                Country:  Albania\n- Geography\nTotal area: 28,750 km2\n";
    let entities = parser().parse_str(Era::ColumnText, text);
    assert_eq!(entities.len(), 2);
    let afg = &entities[0];
    assert_eq!(afg.name, "Afghanistan");
    assert_eq!(titles(afg), ["Geography", "People"]);
    assert_eq!(
      afg.field("Land boundaries").unwrap().content,
      "5,529 km total; China 76 km, Iran 936 km"
    );
    assert_eq!(afg.field("Population").unwrap().content, "15,862,293 (July 1990)");
  }

  #[test]
  fn tagged_era_appends_continuations() {
    let text = "_@_1991 preamble\n_@_Afghanistan\n_*_Geography\n_#_Total area: 647,500 km2\n\
                _#_Climate: arid to semiarid;\ncold winters and hot summers\n\
                _*_People\n_#_Population: 16,450,304\n";
    let entities = parser().parse_str(Era::TaggedText, text);
    assert_eq!(entities.len(), 1);
    let afg = &entities[0];
    assert_eq!(
      afg.field("Climate").unwrap().content,
      "arid to semiarid; cold winters and hot summers"
    );
    assert_eq!(afg.field_count(), 3);
  }

  #[test]
  fn asterisk_era_keeps_commas_inside_names() {
    let text = "*Korea, North, Geography\nLocation:\n  Eastern Asia\nArea:\n total area:\n  \
                120,540 km2\n*Korea, North, People\nPopulation:\n  21,815,203\n";
    let entities = parser().parse_str(Era::AsteriskText, text);
    assert_eq!(entities.len(), 1);
    let nk = &entities[0];
    assert_eq!(nk.name, "Korea, North");
    assert_eq!(titles(nk), ["Geography", "People"]);
    // Sub-labels stay inside the parent field.
    assert_eq!(nk.field("Area").unwrap().content, "total area: | 120,540 km2");
    assert!(nk.field("total area").is_none());
  }

  #[test]
  fn repeated_sections_are_merged() {
    let text = ":Chad Geography\nTotal area:\n    1,284,000 km2\n:Chad People\nPopulation:\n    \
                5,238,908\n:Chad Geography\nClimate:\n    tropical\n";
    let entities = parser().parse_str(Era::ColonText, text);
    let chad = &entities[0];
    assert_eq!(titles(chad), ["Geography", "People"]);
    assert_eq!(chad.sections[0].fields.len(), 2);
  }

  #[test]
  fn at_sign_era_splits_bare_headings() {
    let text = "front matter\n____________________________\n@FRANCE:Geography\n \
                Location: Western Europe\n Area:\n total area: 547,030 sq km\n \
                land area: 545,630 sq km\n\nEconomy\n GDP: $1.173 trillion (1995 est.)\n";
    let entities = parser().parse_str(Era::AtSignText, text);
    let france = &entities[0];
    assert_eq!(france.name, "France");
    assert_eq!(titles(france), ["Geography", "Economy"]);
    assert_eq!(
      france.field("Area").unwrap().content,
      "total area: 547,030 sq km | land area: 545,630 sq km"
    );
    assert_eq!(france.field("GDP").unwrap().content, "$1.173 trillion (1995 est.)");
  }

  #[test]
  fn bare_heading_era_skips_underlines() {
    let text = "=====\n@Afghanistan\n-----------\nGeography\n---------\n\
                Location: Southern Asia, north of Pakistan\nPeople\n------\n\
                Population: 21,251,821 (July 1996 est.)\n";
    let entities = parser().parse_str(Era::AtSignBareText, text);
    let afg = &entities[0];
    assert_eq!(titles(afg), ["Geography", "People"]);
    assert_eq!(afg.field_count(), 2);
  }

  #[test]
  fn equals_era_uses_repeated_name_headings() {
    let text = "@Aruba\n\nAruba    Introduction Top of Page\nBackground: Discovered and \
                claimed\nfor Spain in 1499.\n\nAruba    Geography\nLocation: Caribbean\n";
    let entities = parser().parse_str(Era::EqualsText, text);
    let aruba = &entities[0];
    assert_eq!(titles(aruba), ["Introduction", "Geography"]);
    assert_eq!(
      aruba.field("Background").unwrap().content,
      "Discovered and claimed for Spain in 1499."
    );
  }

  #[test]
  fn unrecognised_text_yields_nothing() {
    assert!(parser().parse_str(Era::TaggedText, "just prose\nwith no markers").is_empty());
  }
}
