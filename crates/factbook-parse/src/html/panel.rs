//! 2009–2014 layout: one `div.CollapsiblePanel` per section. Inside its
//! content table a `tr.*_light` row names a field and the rows after it, up
//! to the next such row, carry `category` labels and `category_data`
//! values.

use factbook_core::parsed::ParsedSection;
use scraper::{ElementRef, Html, Selector};

use super::{Outline, has_class, is, label_text, selector, text_of};
use crate::{clean::collapse_whitespace, error::Result};

pub(super) struct PanelLayout {
  panel:         Selector,
  tab_category:  Selector,
  question:      Selector,
  content_table: Selector,
  answer_table:  Selector,
  row:           Selector,
  category_div:  Selector,
  link:          Selector,
  cell:          Selector,
  any_data:      Selector,
  inner_data:    Selector,
}

fn is_field_row(row: &ElementRef<'_>) -> bool {
  is(row, "tr") && row.value().classes().any(|c| c.ends_with("_light"))
}

impl PanelLayout {
  pub(super) fn new() -> Result<Self> {
    Ok(Self {
      panel:         selector("div.CollapsiblePanel")?,
      tab_category:  selector("td.CollapsiblePanelTab span.category")?,
      question:      selector("h2.question")?,
      content_table: selector("table.CollapsiblePanelContent")?,
      answer_table:  selector("div.answer table")?,
      row:           selector("tr")?,
      category_div:  selector("div.category")?,
      link:          selector("a")?,
      cell:          selector("td")?,
      any_data:      selector(".category_data")?,
      inner_data:    selector("span.category_data")?,
    })
  }

  fn section_title(&self, panel: ElementRef<'_>) -> String {
    let raw = panel
      .select(&self.tab_category)
      .next()
      .map(text_of)
      .or_else(|| {
        panel.select(&self.question).next().map(|h2| {
          h2.value()
            .attr("sectiontitle")
            .map_or_else(|| text_of(h2), str::to_string)
        })
      })
      .unwrap_or_default();
    raw.split("::").next().unwrap_or_default().trim().to_string()
  }

  fn field_name(&self, row: ElementRef<'_>) -> String {
    match row.select(&self.category_div).next() {
      Some(div) => div.select(&self.link).next().map_or_else(|| label_text(div), label_text),
      None => label_text(row),
    }
  }

  /// Labels and values from one data row, in order.
  fn row_parts(&self, row: ElementRef<'_>, parts: &mut Vec<String>) {
    let cell = row.select(&self.cell).next().unwrap_or(row);
    for child in cell.children().filter_map(ElementRef::wrap) {
      let label = has_class(&child, "category");
      let data = has_class(&child, "category_data");
      if is(&child, "div") && label && !data {
        // Own text plus emphasis only; the nested value is read separately.
        let own: String = child
          .children()
          .filter_map(|node| {
            if let Some(text) = node.value().as_text() {
              return Some(text.to_string());
            }
            ElementRef::wrap(node)
              .filter(|el| is(el, "em"))
              .map(text_of)
          })
          .collect::<Vec<_>>()
          .join(" ");
        let own = collapse_whitespace(&own);
        if !own.is_empty() {
          parts.push(own);
        }
        if let Some(value) = child.select(&self.inner_data).next().map(text_of)
          && !value.is_empty()
        {
          parts.push(value);
        }
      } else if (is(&child, "div") || is(&child, "span")) && (data || label) {
        let value = text_of(child);
        if !value.is_empty() {
          parts.push(value);
        }
      }
    }
  }

  pub(super) fn sections(&self, html: &Html) -> Vec<ParsedSection> {
    let mut outline = Outline::default();

    for panel in html.select(&self.panel) {
      let title = self.section_title(panel);
      if title.is_empty() {
        continue;
      }
      let Some(table) = panel
        .select(&self.content_table)
        .next()
        .or_else(|| panel.select(&self.answer_table).next())
      else {
        continue;
      };
      outline.open(&title);

      for row in table.select(&self.row).filter(is_field_row) {
        let name = self.field_name(row);
        let mut parts = Vec::new();
        for next in row
          .next_siblings()
          .filter_map(ElementRef::wrap)
          .filter(|el| is(el, "tr"))
        {
          if is_field_row(&next) {
            break;
          }
          if next.select(&self.any_data).next().is_some() {
            self.row_parts(next, &mut parts);
          }
        }
        outline.push(&name, &collapse_whitespace(&parts.join(" ")));
      }
    }
    outline.finish(None)
  }
}
