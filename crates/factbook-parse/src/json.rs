//! Interchange editions: one JSON document per entity.
//!
//! Two shapes are accepted. The flat shape lists
//! `categories[{title, fields[{name, content|value}]}]`; the nested shape
//! maps `{Section: {Field: {text} | {sub: {text}}}}`. Content carries markup
//! in both and is stripped to plain text with `" | "` at block boundaries.

use factbook_core::{
  parsed::{ParsedEntity, ParsedField, ParsedSection, RawDocument},
  record::CONTENT_SEPARATOR,
};
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
  EraParser,
  clean::{collapse_whitespace, title_case_if_shouting, unescape_entities},
  era::Era,
  error::Result,
};

pub(crate) struct JsonParser {
  line_break: Regex,
  paragraph:  Regex,
  tag:        Regex,
  pipe_run:   Regex,
}

impl JsonParser {
  pub(crate) fn new() -> Result<Self> {
    Ok(Self {
      line_break: Regex::new(r"(?i)<br\s*/?\s*>\s*(?:<br\s*/?\s*>)?")?,
      paragraph:  Regex::new(r"(?i)</p>\s*<p[^>]*>")?,
      tag:        Regex::new(r"<[^>]+>")?,
      pipe_run:   Regex::new(r"(?:\s*\|\s*)+")?,
    })
  }

  /// Markup to plain text; block boundaries become the content separator.
  pub(crate) fn strip_markup(&self, raw: &str) -> String {
    let s = self.line_break.replace_all(raw, CONTENT_SEPARATOR);
    let s = self.paragraph.replace_all(&s, CONTENT_SEPARATOR);
    let s = self.tag.replace_all(&s, " ");
    let s = collapse_whitespace(&unescape_entities(&s));
    let s = self.pipe_run.replace_all(&s, CONTENT_SEPARATOR);
    s.trim_matches(|c: char| c == '|' || c.is_whitespace()).to_string()
  }

  fn flat_sections(&self, categories: &[Value]) -> Vec<ParsedSection> {
    categories
      .iter()
      .filter_map(|category| {
        let title = category.get("title").and_then(Value::as_str).unwrap_or_default();
        let fields: Vec<ParsedField> = category
          .get("fields")
          .and_then(Value::as_array)
          .into_iter()
          .flatten()
          .filter_map(|field| {
            let name = field.get("name").and_then(Value::as_str)?.trim();
            let raw = field
              .get("content")
              .or_else(|| field.get("value"))
              .and_then(Value::as_str)
              .unwrap_or_default();
            (!name.is_empty()).then(|| ParsedField::new(name, self.strip_markup(raw)))
          })
          .collect();
        (!fields.is_empty()).then(|| ParsedSection {
          title: Some(title.trim().to_string()).filter(|t| !t.is_empty()),
          fields,
        })
      })
      .collect()
  }

  /// `{text}` → text; `{sub: {text}, ...}` → `sub: text | ...`.
  fn nested_content(&self, value: &Value) -> String {
    match value {
      Value::String(s) => self.strip_markup(s),
      Value::Object(entries) => entries
        .iter()
        .filter_map(|(key, inner)| {
          let text = match inner {
            Value::String(s) => self.strip_markup(s),
            Value::Object(_) => self.nested_content(inner),
            _ => return None,
          };
          if text.is_empty() {
            None
          } else if key == "text" {
            Some(text)
          } else {
            Some(format!("{key}: {text}"))
          }
        })
        .collect::<Vec<_>>()
        .join(CONTENT_SEPARATOR),
      _ => String::new(),
    }
  }

  fn nested_sections(&self, root: &Map<String, Value>) -> Vec<ParsedSection> {
    root
      .iter()
      .filter_map(|(title, body)| {
        let body = body.as_object()?;
        let fields: Vec<ParsedField> = body
          .iter()
          .filter_map(|(name, value)| {
            let content = self.nested_content(value);
            (!content.is_empty()).then(|| ParsedField::new(name.trim(), content))
          })
          .collect();
        (!fields.is_empty()).then(|| ParsedSection { title: Some(title.clone()), fields })
      })
      .collect()
  }
}

/// The conventional short name inside a nested document, when it has one.
fn nested_name(root: &Map<String, Value>) -> Option<String> {
  let country = root.get("Government")?.get("Country name")?;
  ["conventional short form", "conventional long form"]
    .iter()
    .filter_map(|key| country.get(*key)?.get("text")?.as_str())
    .map(str::trim)
    .find(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
    .map(str::to_string)
}

impl EraParser for JsonParser {
  fn parse(&self, _era: Era, doc: &RawDocument) -> Vec<ParsedEntity> {
    let text = doc.text();
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(&text) else {
      tracing::debug!(file = %doc.file_name, "document is not a JSON object");
      return Vec::new();
    };

    let sections = match root.get("categories").and_then(Value::as_array) {
      Some(categories) => self.flat_sections(categories),
      None => self.nested_sections(&root),
    };
    let name = root
      .get("name")
      .and_then(Value::as_str)
      .map(str::to_string)
      .or_else(|| nested_name(&root))
      .unwrap_or_else(|| doc.stem().to_string());
    let code = root
      .get("code")
      .and_then(Value::as_str)
      .map(str::to_string)
      .or_else(|| doc.code.clone())
      .unwrap_or_else(|| doc.stem().to_uppercase());

    vec![ParsedEntity {
      code: Some(code),
      name: title_case_if_shouting(&collapse_whitespace(&name)),
      sections,
      fallback: false,
    }]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parser() -> JsonParser { JsonParser::new().unwrap() }

  #[test]
  fn markup_is_stripped_to_pipes() {
    let p = parser();
    assert_eq!(
      p.strip_markup("<p>one</p><p>two<br><br>three</p> &amp; more"),
      "one | two | three & more"
    );
    assert_eq!(p.strip_markup("<br>lead<br/>"), "lead");
    assert_eq!(p.strip_markup("<strong>total: </strong>9,833,517 sq km"), "total: 9,833,517 sq km");
  }

  #[test]
  fn flat_shape_reads_categories() {
    let doc = RawDocument::new(
      2023,
      "north-america/us.json",
      br#"{"name":"United States","code":"US","categories":[
          {"title":"Geography","fields":[
            {"name":"Area","content":"<strong>total: </strong>9,833,517 sq km<br><br><strong>land: </strong>9,147,593 sq km"},
            {"name":"Empty","content":""}]}]}"#
        .to_vec(),
    );
    let entities = parser().parse(Era::Json, &doc);
    let us = &entities[0];
    assert_eq!(us.code.as_deref(), Some("US"));
    assert_eq!(us.field("Area").unwrap().content, "total: 9,833,517 sq km | land: 9,147,593 sq km");
    assert_eq!(us.field_count(), 2);
  }

  #[test]
  fn nested_shape_keeps_sub_labels_in_order() {
    let doc = RawDocument::new(
      2024,
      "europe/fr.json",
      br#"{"Government":{"Country name":{
             "conventional long form":{"text":"French Republic"},
             "conventional short form":{"text":"France"}}},
           "Geography":{"Area":{"total ":{"text":"643,801 sq km"},"land":{"text":"640,427 sq km"}},
             "Climate":{"text":"generally cool winters"}}}"#
        .to_vec(),
    );
    let entities = parser().parse(Era::Json, &doc);
    let fr = &entities[0];
    assert_eq!(fr.name, "France");
    assert_eq!(fr.code.as_deref(), Some("FR"));
    assert_eq!(fr.field("Area").unwrap().content, "total : 643,801 sq km | land: 640,427 sq km");
    assert_eq!(fr.field("Climate").unwrap().content, "generally cool winters");
  }

  #[test]
  fn invalid_json_yields_nothing() {
    let doc = RawDocument::new(2022, "xx.json", b"{not json".to_vec());
    assert!(parser().parse(Era::Json, &doc).is_empty());
  }
}
