//! 2000 layout: `<a name="Geo">Geography</a>` anchors open sections and
//! `<b>Label:</b>` opens a field whose content runs until the next label or
//! the navigation table that closes each section.

use factbook_core::parsed::ParsedSection;
use scraper::{ElementRef, Html};

use super::{Outline, is, text_of};
use crate::clean::collapse_whitespace;

fn anchor_title(anchor: &str) -> &str {
  match anchor {
    "Intro" => "Introduction",
    "Geo" => "Geography",
    "Govt" => "Government",
    "Econ" => "Economy",
    "Comm" => "Communications",
    "Trans" => "Transportation",
    "Issues" => "Transnational Issues",
    other => other,
  }
}

fn is_label(el: &ElementRef<'_>) -> bool {
  if !is(el, "b") || el.children().any(|c| !c.value().is_text()) {
    return false;
  }
  let text = text_of(*el);
  text.len() > 1 && text.ends_with(':')
}

fn is_anchor(el: &ElementRef<'_>) -> bool { is(el, "a") && el.value().attr("name").is_some() }

fn closes_section(el: &ElementRef<'_>) -> bool {
  is(el, "center")
    && el
      .children()
      .filter_map(ElementRef::wrap)
      .any(|child| is(&child, "table"))
}

fn flush(outline: &mut Outline, field: Option<(String, Vec<String>)>) {
  if let Some((name, parts)) = field {
    outline.push(&name, &collapse_whitespace(&parts.join(" ")));
  }
}

pub(super) fn sections(html: &Html) -> Vec<ParsedSection> {
  let mut outline = Outline::default();
  let mut field: Option<(String, Vec<String>)> = None;
  let mut in_section = false;

  for node in html.root_element().descendants() {
    if let Some(el) = ElementRef::wrap(node) {
      if let Some(anchor) = el.value().attr("name").filter(|_| is(&el, "a")) {
        flush(&mut outline, field.take());
        let text = text_of(el);
        let title = if text.is_empty() { anchor_title(anchor).to_string() } else { text };
        outline.open(&title);
        in_section = true;
      } else if in_section && is_label(&el) {
        flush(&mut outline, field.take());
        let label = text_of(el);
        field = Some((label.trim_end_matches(':').trim().to_string(), Vec::new()));
      } else if closes_section(&el) {
        flush(&mut outline, field.take());
      }
    } else if let Some(text) = node.value().as_text()
      && let Some((_, parts)) = field.as_mut()
    {
      let inside_marker = node
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| {
          is_label(&parent) || is_anchor(&parent) || is(&parent, "script")
        });
      if !inside_marker {
        parts.push(text.to_string());
      }
    }
  }
  flush(&mut outline, field.take());
  outline.finish(None)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_split_fields_within_anchored_sections() {
    let page = r#"<html><body>
      <b>Ignored:</b> before any section
      <a name="Geo"></a>
      <b>Location:</b> Caribbean, island in the <i>Caribbean Sea</i>
      <br><b>Area:</b> <br><i>total:</i> 193 sq km<br>
      <p><center><table><tr><td>Top of page</td></tr></table></center>
      <a name="People">People</a>
      <b>Population:</b> 69,539 (July 2000 est.)
    </body></html>"#;
    let sections = sections(&Html::parse_document(page));
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title.as_deref(), Some("Geography"));
    let fields = &sections[0].fields;
    assert_eq!(fields[0].name, "Location");
    assert_eq!(fields[0].content, "Caribbean, island in the Caribbean Sea");
    assert_eq!(fields[1].content, "total: 193 sq km");
    assert_eq!(sections[1].title.as_deref(), Some("People"));
    assert_eq!(sections[1].fields[0].content, "69,539 (July 2000 est.)");
  }

  #[test]
  fn no_anchors_means_no_sections() {
    let page = "<html><body><b>Area:</b> 1 sq km</body></html>";
    assert!(sections(&Html::parse_document(page)).is_empty());
  }
}
