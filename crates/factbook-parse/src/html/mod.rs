//! Markup editions: one page per entity, five generations of layout.
//!
//! Every layout is read with a document-order walk over the parsed tree
//! rather than by slicing markup, so stray cells and unclosed paragraphs in
//! the archived pages do not change what is captured.

mod classic;
mod expand;
mod modern;
mod name;
mod panel;
mod table;

use factbook_core::parsed::{ParsedEntity, ParsedField, ParsedSection, RawDocument};
use scraper::{ElementRef, Html, Selector};

use crate::{
  EraParser,
  clean::collapse_whitespace,
  era::Era,
  error::{Error, Result},
};

pub(crate) fn selector(css: &str) -> Result<Selector> {
  Selector::parse(css).map_err(|e| Error::Selector {
    selector: css.to_string(),
    message:  e.to_string(),
  })
}

pub(crate) struct HtmlParser {
  names:  name::NameExtractor,
  panel:  panel::PanelLayout,
  expand: expand::ExpandLayout,
  modern: modern::ModernLayout,
}

impl HtmlParser {
  pub(crate) fn new() -> Result<Self> {
    Ok(Self {
      names:  name::NameExtractor::new()?,
      panel:  panel::PanelLayout::new()?,
      expand: expand::ExpandLayout::new()?,
      modern: modern::ModernLayout::new()?,
    })
  }
}

impl EraParser for HtmlParser {
  fn parse(&self, era: Era, doc: &RawDocument) -> Vec<ParsedEntity> {
    let html = Html::parse_document(&doc.text());
    let sections = match era {
      Era::ClassicHtml => classic::sections(&html),
      Era::TableHtml => table::sections(&html),
      Era::PanelHtml => self.panel.sections(&html),
      Era::ExpandHtml => self.expand.sections(&html),
      _ => self.modern.sections(&html),
    };
    vec![ParsedEntity {
      code: doc.code.clone(),
      name: self.names.extract(&html),
      sections,
      fallback: false,
    }]
  }

  fn fallback_text(&self, doc: &RawDocument) -> String {
    visible_text(&Html::parse_document(&doc.text()))
  }
}

// ─── Tree helpers ────────────────────────────────────────────────────────────

/// Every element in document order.
pub(super) fn elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
  html.root_element().descendants().filter_map(ElementRef::wrap)
}

pub(super) fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
  el.value().classes().any(|c| c == class)
}

pub(super) fn is(el: &ElementRef<'_>, tag: &str) -> bool { el.value().name() == tag }

/// All descendant text, whitespace-collapsed.
pub(super) fn text_of(el: ElementRef<'_>) -> String {
  collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Element text with a trailing colon removed.
pub(super) fn label_text(el: ElementRef<'_>) -> String {
  text_of(el).trim_end_matches(':').trim().to_string()
}

/// Descendant text, leaving out any subtree for which `skip` holds.
pub(super) fn text_without<F>(el: ElementRef<'_>, skip: &F) -> String
where
  F: Fn(&ElementRef<'_>) -> bool,
{
  fn gather<F>(el: ElementRef<'_>, skip: &F, parts: &mut Vec<String>)
  where
    F: Fn(&ElementRef<'_>) -> bool,
  {
    for child in el.children() {
      if let Some(text) = child.value().as_text() {
        parts.push(text.to_string());
      } else if let Some(child) = ElementRef::wrap(child)
        && !skip(&child)
      {
        gather(child, skip, parts);
      }
    }
  }

  let mut parts = Vec::new();
  gather(el, skip, &mut parts);
  collapse_whitespace(&parts.join(" "))
}

/// Visible page text, one non-blank text node per line.
pub(super) fn visible_text(html: &Html) -> String {
  html
    .root_element()
    .descendants()
    .filter_map(|node| {
      let text = node.value().as_text()?;
      let parent = node.parent().and_then(ElementRef::wrap)?;
      if matches!(parent.value().name(), "script" | "style" | "title") {
        return None;
      }
      let line = text.trim();
      (!line.is_empty()).then(|| line.to_string())
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Python-style title casing of a slug: `people-and-society` →
/// `People And Society`.
pub(super) fn title_words(slug: &str) -> String {
  slug
    .split(['-', ' '])
    .filter(|w| !w.is_empty())
    .map(|w| {
      let mut chars = w.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

// ─── Section accumulator ─────────────────────────────────────────────────────

/// Sections in first-seen order; repeated titles merge. Fields seen before
/// any section opens are held aside as "loose".
#[derive(Default)]
pub(super) struct Outline {
  named:   Vec<(String, Vec<ParsedField>)>,
  current: Option<usize>,
  loose:   Vec<ParsedField>,
}

impl Outline {
  pub(super) fn open(&mut self, title: &str) {
    let title = title.trim();
    let slot = match self.named.iter().position(|(t, _)| t == title) {
      Some(slot) => slot,
      None => {
        self.named.push((title.to_string(), Vec::new()));
        self.named.len() - 1
      }
    };
    self.current = Some(slot);
  }

  pub(super) fn push(&mut self, name: &str, content: &str) {
    let (name, content) = (name.trim(), content.trim());
    if name.is_empty() || content.is_empty() {
      return;
    }
    let field = ParsedField::new(name, content);
    match self.current {
      Some(slot) => self.named[slot].1.push(field),
      None => self.loose.push(field),
    }
  }

  /// Sections with at least one field. When none exist, loose fields are
  /// returned under `loose_title` (if given).
  pub(super) fn finish(self, loose_title: Option<&str>) -> Vec<ParsedSection> {
    let sections: Vec<ParsedSection> = self
      .named
      .into_iter()
      .filter(|(_, fields)| !fields.is_empty())
      .map(|(title, fields)| ParsedSection { title: Some(title), fields })
      .collect();
    match loose_title {
      Some(title) if sections.is_empty() && !self.loose.is_empty() => vec![ParsedSection {
        title:  Some(title.to_string()),
        fields: self.loose,
      }],
      _ => sections,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn title_words_matches_slug_casing() {
    assert_eq!(title_words("people-and-society"), "People And Society");
    assert_eq!(title_words("GEOGRAPHY"), "Geography");
  }

  #[test]
  fn outline_merges_and_holds_loose_fields() {
    let mut outline = Outline::default();
    outline.push("Orphan", "x");
    outline.open("Geography");
    outline.push("Area", "1 sq km");
    outline.open("People");
    outline.open("Geography");
    outline.push("Climate", "mild");
    outline.push("Empty", "  ");
    let sections = outline.finish(Some("General"));
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].fields.len(), 2);
  }

  #[test]
  fn loose_fields_surface_only_without_sections() {
    let mut outline = Outline::default();
    outline.push("Area", "1 sq km");
    let sections = outline.finish(Some("General"));
    assert_eq!(sections[0].title.as_deref(), Some("General"));

    let mut outline = Outline::default();
    outline.push("Area", "1 sq km");
    assert!(outline.finish(None).is_empty());
  }

  #[test]
  fn visible_text_skips_scripts() {
    let html = Html::parse_document(
      "<html><head><title>T</title><script>var x;</script></head>\
       <body><p>Hello</p>\n\n<p> world </p></body></html>",
    );
    assert_eq!(visible_text(&html), "Hello\nworld");
  }
}
