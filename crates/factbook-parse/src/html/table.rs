//! 2002–2008 layout: section anchors plus two-cell rows,
//! `<td class="FieldLabel">Label:</td><td>content</td>`.

use factbook_core::parsed::ParsedSection;
use scraper::{ElementRef, Html};

use super::{Outline, elements, has_class, is, label_text, text_without};

fn anchor_title(anchor: &str) -> Option<&'static str> {
  Some(match anchor {
    "Intro" | "Introduction" => "Introduction",
    "Geo" | "Geography" => "Geography",
    "People" => "People",
    "People and Society" => "People and Society",
    "Govt" | "Government" => "Government",
    "Econ" | "Economy" => "Economy",
    "Comm" | "Communications" => "Communications",
    "Trans" | "Transportation" => "Transportation",
    "Military" => "Military",
    "Issues" | "Transnational Issues" => "Transnational Issues",
    _ => return None,
  })
}

/// Image links (maps, flags) carry no content.
fn is_image_link(el: &ElementRef<'_>) -> bool {
  is(el, "a")
    && el
      .descendants()
      .filter_map(ElementRef::wrap)
      .any(|d| is(&d, "img"))
}

pub(super) fn sections(html: &Html) -> Vec<ParsedSection> {
  let mut outline = Outline::default();

  for el in elements(html) {
    if is(&el, "a")
      && let Some(title) = el.value().attr("name").and_then(anchor_title)
    {
      outline.open(title);
    } else if is(&el, "td") && has_class(&el, "FieldLabel") {
      let content = el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| is(sibling, "td"))
        .map(|cell| text_without(cell, &is_image_link))
        .unwrap_or_default();
      outline.push(&label_text(el), &content);
    }
  }
  outline.finish(Some("General"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_cells_pair_with_their_neighbour() {
    let page = r#"<html><body>
      <a name="Geo">Geography</a>
      <table>
        <tr><td class="FieldLabel"><div align="right">Location:</div></td>
            <td>Southern Asia <a href="map.html"><img src="m.gif"></a></td></tr>
        <tr><td class="FieldLabel">Area:</td>
            <td><i>total:</i> 647,500 sq km<br><i>land:</i> 647,500 sq km</td></tr>
      </table>
      <a name="unrelated">x</a>
      <a name="Econ">Economy</a>
      <table><tr><td class="FieldLabel">GDP:</td><td>$21 billion</td></tr></table>
    </body></html>"#;
    let sections = sections(&Html::parse_document(page));
    assert_eq!(sections.len(), 2);
    let geo = &sections[0];
    assert_eq!(geo.fields[0].name, "Location");
    assert_eq!(geo.fields[0].content, "Southern Asia");
    assert_eq!(geo.fields[1].content, "total: 647,500 sq km land: 647,500 sq km");
    assert_eq!(sections[1].title.as_deref(), Some("Economy"));
  }

  #[test]
  fn unanchored_labels_land_in_general() {
    let page = r#"<table><tr><td class="FieldLabel">Area:</td><td>1 sq km</td></tr></table>"#;
    let sections = sections(&Html::parse_document(page));
    assert_eq!(sections[0].title.as_deref(), Some("General"));
  }
}
