//! Format classification and era parsers for the Factbook archive.
//!
//! Every edition, whatever its layout, is reduced to the same tree:
//! entities, each with ordered sections of ordered `(name, content)`
//! fields. Pure synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use factbook_core::parsed::RawDocument;
//! use factbook_parse::Parsers;
//!
//! let parsers = Parsers::new(100_000).unwrap();
//! let doc = RawDocument::new(2005, "us.html", std::fs::read("us.html").unwrap())
//!   .with_code("us");
//! let parsed = parsers.parse(&doc);
//! println!("{} entities via {}", parsed.entities.len(), parsed.era);
//! ```

pub mod clean;
pub mod era;
pub mod error;
mod grammar;
mod html;
mod json;
mod text;

pub use era::Era;
pub use error::{Error, Result};
use factbook_core::{
  parsed::{ParsedEntity, RawDocument},
  record::Provenance,
};
use tracing::warn;

// ─── Parser contract ─────────────────────────────────────────────────────────

/// One family of era parsers behind the common `RawDocument → entities`
/// contract.
///
/// Implementations report what they recognise and nothing more: an empty
/// result, or an entity with no sections, means no structural marker was
/// found. [`Parsers::parse`] turns that into the whole-document fallback.
pub trait EraParser: Send + Sync {
  fn parse(&self, era: Era, doc: &RawDocument) -> Vec<ParsedEntity>;

  /// The text captured when nothing structural was recognised.
  fn fallback_text(&self, doc: &RawDocument) -> String { doc.text().into_owned() }
}

/// Parse output together with the era that produced it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
  pub era:      Era,
  pub entities: Vec<ParsedEntity>,
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// All era parsers, compiled once and shared for a run.
pub struct Parsers {
  text:         text::TextParser,
  html:         html::HtmlParser,
  json:         json::JsonParser,
  fallback_cap: usize,
}

impl Parsers {
  /// `fallback_cap` bounds (in characters) the whole-document capture.
  pub fn new(fallback_cap: usize) -> Result<Self> {
    Ok(Self {
      text: text::TextParser::new()?,
      html: html::HtmlParser::new()?,
      json: json::JsonParser::new()?,
      fallback_cap,
    })
  }

  fn family(&self, era: Era) -> &dyn EraParser {
    match era.provenance() {
      Provenance::Text => &self.text,
      Provenance::Html => &self.html,
      Provenance::Json => &self.json,
    }
  }

  /// Parse one document. Never fails and never returns zero entities.
  pub fn parse(&self, doc: &RawDocument) -> ParsedDocument {
    self.parse_as(Era::select(doc.year, doc.hint()), doc)
  }

  /// Parse one document in an era already chosen for its edition.
  pub fn parse_as(&self, era: Era, doc: &RawDocument) -> ParsedDocument {
    let parser = self.family(era);
    let mut entities = parser.parse(era, doc);
    let mut fallback_text: Option<String> = None;

    for entity in entities.iter_mut().filter(|e| e.sections.is_empty()) {
      warn!(
        year = doc.year,
        file = %doc.file_name,
        entity = %entity.name,
        %era,
        "no sections recognised; capturing whole document"
      );
      let text = fallback_text.get_or_insert_with(|| parser.fallback_text(doc));
      *entity = clean::fallback_entity(
        entity.code.take(),
        std::mem::take(&mut entity.name),
        text,
        self.fallback_cap,
      );
    }

    if entities.is_empty() {
      warn!(
        year = doc.year,
        file = %doc.file_name,
        %era,
        "no structural markers recognised; capturing whole document"
      );
      let text = fallback_text.unwrap_or_else(|| parser.fallback_text(doc));
      entities.push(clean::fallback_entity(
        doc.code.clone(),
        doc.stem(),
        &text,
        self.fallback_cap,
      ));
    }

    ParsedDocument { era, entities }
  }
}
