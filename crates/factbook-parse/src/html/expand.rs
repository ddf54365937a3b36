//! 2015–2017 layout: `h2.question` headings (title in `sectiontitle`),
//! `div#field.category` field names, and value blocks as following siblings.

use factbook_core::{parsed::ParsedSection, record::CONTENT_SEPARATOR};
use scraper::{ElementRef, Html, Selector};

use super::{Outline, elements, has_class, is, label_text, selector, text_of};
use crate::error::Result;

pub(super) struct ExpandLayout {
  link:        Selector,
  question:    Selector,
  sub_label:   Selector,
  sub_value:   Selector,
  nested_data: Selector,
}

fn is_heading(el: &ElementRef<'_>) -> bool {
  is(el, "h2") && (has_class(el, "question") || el.value().attr("sectiontitle").is_some())
}

fn is_field(el: &ElementRef<'_>) -> bool {
  is(el, "div") && el.value().id() == Some("field") && has_class(el, "category")
}

impl ExpandLayout {
  pub(super) fn new() -> Result<Self> {
    Ok(Self {
      link:        selector("a")?,
      question:    selector("h2.question")?,
      sub_label:   selector("span.category")?,
      sub_value:   selector("span.category_data")?,
      nested_data: selector(".category_data")?,
    })
  }

  fn closes_field(&self, el: &ElementRef<'_>) -> bool {
    is_field(el) || is_heading(el) || (is(el, "li") && el.select(&self.question).next().is_some())
  }

  fn value_of(&self, el: ElementRef<'_>) -> Option<String> {
    if has_class(&el, "category_data") {
      return Some(text_of(el));
    }
    if !is(&el, "div") {
      return None;
    }
    let label = el.select(&self.sub_label).next().map(text_of);
    let value = el.select(&self.sub_value).next().map(text_of);
    match (label, value) {
      (Some(label), Some(value)) if !label.is_empty() && !value.is_empty() => {
        Some(format!("{label} {value}"))
      }
      (Some(_), Some(value)) => Some(value),
      _ => el.select(&self.nested_data).next().map(text_of),
    }
  }

  pub(super) fn sections(&self, html: &Html) -> Vec<ParsedSection> {
    let mut outline = Outline::default();

    for el in elements(html) {
      if is_heading(&el) {
        let title = match el.value().attr("sectiontitle") {
          Some(title) => title.to_string(),
          None => {
            let text = text_of(el);
            text.split("::").next().unwrap_or_default().trim().to_string()
          }
        };
        if !title.is_empty() {
          outline.open(&title);
        }
      } else if is_field(&el) {
        let name = el
          .select(&self.link)
          .next()
          .map_or_else(|| label_text(el), label_text);
        let parts: Vec<String> = el
          .next_siblings()
          .filter_map(ElementRef::wrap)
          .take_while(|sibling| !self.closes_field(sibling))
          .filter_map(|sibling| self.value_of(sibling))
          .filter(|part| !part.is_empty())
          .collect();
        outline.push(&name, &parts.join(CONTENT_SEPARATOR));
      }
    }
    outline.finish(Some("General"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn headings_open_sections_and_siblings_carry_values() {
    let page = r##"<html><body><ul>
      <li><h2 class="question" sectiontitle="Geography">Geography :: CHAD</h2>
        <div id="field" class="category noa_light"><a href="#">Area:</a></div>
        <div><span class="category">total: </span><span class="category_data">1.284 million sq km</span></div>
        <div><span class="category">land: </span><span class="category_data">1,259,200 sq km</span></div>
        <div id="field" class="category noa_light"><a href="#">Climate:</a></div>
        <div class="category_data">tropical in south</div>
      </li>
      <li><h2 class="question">People and Society :: CHAD</h2>
        <div id="field" class="category noa_light"><a href="#">Population:</a></div>
        <div class="category_data">11,852,462 (July 2015 est.)</div>
      </li>
    </ul></body></html>"##;
    let sections = ExpandLayout::new().unwrap().sections(&Html::parse_document(page));
    assert_eq!(sections.len(), 2);
    let geo = &sections[0];
    assert_eq!(geo.title.as_deref(), Some("Geography"));
    assert_eq!(geo.fields[0].content, "total: 1.284 million sq km | land: 1,259,200 sq km");
    assert_eq!(geo.fields[1].content, "tropical in south");
    assert_eq!(sections[1].title.as_deref(), Some("People and Society"));
  }
}
