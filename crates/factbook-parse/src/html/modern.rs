//! 2018–2020 layout: `<li id="geography-category-section-anchor">` opens a
//! section, `div#field-anchor-<slug>` names the next field and
//! `div#field-<slug>` holds its `category_data` blocks.

use factbook_core::{parsed::ParsedSection, record::CONTENT_SEPARATOR};
use scraper::{Html, Selector};

use super::{Outline, elements, has_class, label_text, selector, text_of, title_words};
use crate::error::Result;

const SECTION_SUFFIX: &str = "-category-section-anchor";
const FIELD_ANCHOR_PREFIX: &str = "field-anchor-";
const FIELD_PREFIX: &str = "field-";

pub(super) struct ModernLayout {
  tab_head:  Selector,
  link:      Selector,
  data:      Selector,
  rank_link: Selector,
}

impl ModernLayout {
  pub(super) fn new() -> Result<Self> {
    Ok(Self {
      tab_head:  selector("a.tabHead")?,
      link:      selector("a")?,
      data:      selector(r#"[class*="category_data"]"#)?,
      rank_link: selector(r#"a[href*="rank.html"]"#)?,
    })
  }

  pub(super) fn sections(&self, html: &Html) -> Vec<ParsedSection> {
    let mut outline = Outline::default();
    let mut pending_name: Option<String> = None;

    for el in elements(html) {
      let Some(id) = el.value().id() else {
        continue;
      };
      if let Some(slug) = id.strip_suffix(SECTION_SUFFIX) {
        let title = el
          .select(&self.tab_head)
          .next()
          .map(text_of)
          .and_then(|text| text.split_once("::").map(|(head, _)| head.trim().to_string()))
          .unwrap_or_else(|| title_words(slug));
        outline.open(&title);
      } else if id.starts_with(FIELD_ANCHOR_PREFIX) {
        pending_name = el.select(&self.link).next().map(label_text).filter(|n| !n.is_empty());
      } else if let Some(slug) = id.strip_prefix(FIELD_PREFIX) {
        let name = pending_name.take().unwrap_or_else(|| title_words(slug));
        let parts: Vec<String> = el
          .select(&self.data)
          // A bare ranking block is a link to the comparison table, not data.
          .filter(|block| {
            has_class(block, "subfield") || block.select(&self.rank_link).next().is_none()
          })
          .map(text_of)
          .filter(|text| !text.is_empty())
          .collect();
        let content = if parts.is_empty() { text_of(el) } else { parts.join(CONTENT_SEPARATOR) };
        outline.push(&name, &content);
      }
    }
    outline.finish(None)
  }
}
