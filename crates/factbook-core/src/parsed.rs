//! The parser contract: raw bytes in, an ordered entity/section/field tree out.

use std::{borrow::Cow, path::Path};

use encoding_rs::WINDOWS_1252;

use crate::record::Provenance;

/// One raw document as supplied by the fetcher.
///
/// Markup and interchange editions ship one document per entity; text
/// editions ship the whole edition as a single document.
#[derive(Debug, Clone)]
pub struct RawDocument {
  pub year:      i32,
  /// Entity code when the source knows it (file stem for markup pages).
  pub code:      Option<String>,
  pub file_name: String,
  pub bytes:     Vec<u8>,
}

impl RawDocument {
  pub fn new(year: i32, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self {
      year,
      code: None,
      file_name: file_name.into(),
      bytes,
    }
  }

  pub fn with_code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    self
  }

  /// Decoded text. Bytes that are not valid UTF-8 are read as Windows-1252,
  /// the code page of the 2000s markup editions, so no character is lost.
  pub fn text(&self) -> Cow<'_, str> {
    match std::str::from_utf8(&self.bytes) {
      Ok(text) => Cow::Borrowed(text),
      Err(_) => WINDOWS_1252.decode_without_bom_handling(&self.bytes).0,
    }
  }

  /// Provenance implied by the file extension, if any.
  pub fn hint(&self) -> Option<Provenance> {
    let ext = Path::new(&self.file_name)
      .extension()?
      .to_str()?
      .to_ascii_lowercase();
    match ext.as_str() {
      "txt" => Some(Provenance::Text),
      "html" | "htm" => Some(Provenance::Html),
      "json" => Some(Provenance::Json),
      _ => None,
    }
  }

  /// File name without directory or extension.
  pub fn stem(&self) -> &str {
    Path::new(&self.file_name)
      .file_stem()
      .and_then(|s| s.to_str())
      .unwrap_or(&self.file_name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
  pub name:    String,
  pub content: String,
}

impl ParsedField {
  pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      name:    name.into(),
      content: content.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
  pub title:  Option<String>,
  pub fields: Vec<ParsedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntity {
  pub code:     Option<String>,
  pub name:     String,
  pub sections: Vec<ParsedSection>,
  /// Set when no structural markers were recognised and the whole document
  /// was captured as one section/field pair.
  pub fallback: bool,
}

impl ParsedEntity {
  pub fn field_count(&self) -> usize {
    self.sections.iter().map(|s| s.fields.len()).sum()
  }

  /// First field with the given raw name, in document order.
  pub fn field(&self, name: &str) -> Option<&ParsedField> {
    self
      .sections
      .iter()
      .flat_map(|s| s.fields.iter())
      .find(|f| f.name == name)
  }
}
