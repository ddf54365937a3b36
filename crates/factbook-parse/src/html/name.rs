//! Entity name recovery for markup pages.
//!
//! Page titles changed shape several times (`CIA -- The World Factbook 2000
//! -- Aruba`, `North America :: United States — The World Factbook - CIA`,
//! or no name at all), so the title is tried first and page furniture
//! afterwards.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{selector, text_of};
use crate::{clean::title_case_if_shouting, error::Result};

pub(crate) const UNKNOWN_NAME: &str = "Unknown";

const TITLE_SEPARATORS: [&str; 3] = ["--", "::", " - "];

pub(super) struct NameExtractor {
  title:        Selector,
  country_name: Selector,
  breadcrumb:   Selector,
  heading:      Selector,
  boilerplate:  Regex,
}

impl NameExtractor {
  pub(super) fn new() -> Result<Self> {
    Ok(Self {
      title:        selector("title")?,
      country_name: selector(".countryName")?,
      breadcrumb:   selector("span.category, a.tabHead")?,
      heading:      selector("h2[sectiontitle]")?,
      boilerplate:  Regex::new(
        r"CIA|Central Intelligence Agency|The World Factbook|\d{4}|--|-|::",
      )?,
    })
  }

  pub(super) fn extract(&self, html: &Html) -> String {
    self
      .from_title(html)
      .or_else(|| {
        html
          .select(&self.country_name)
          .map(text_of)
          .find(|name| name.chars().count() > 1)
      })
      .or_else(|| html.select(&self.breadcrumb).find_map(after_double_colon))
      .or_else(|| html.select(&self.heading).find_map(after_double_colon))
      .map(|name| title_case_if_shouting(&name))
      .unwrap_or_else(|| UNKNOWN_NAME.to_string())
  }

  fn from_title(&self, html: &Html) -> Option<String> {
    let title = html.select(&self.title).next().map(text_of)?;
    let title = title.replace(['\u{2014}', '\u{2013}'], " - ");

    for sep in TITLE_SEPARATORS {
      if !title.contains(sep) {
        continue;
      }
      // The name is usually the last or second-to-last part.
      for part in title.rsplit(sep) {
        let name = clean_title_part(part);
        if name.chars().count() > 1 && name != "CIA" && name != "The World Factbook" {
          return Some(name);
        }
      }
    }

    let rest = self.boilerplate.replace_all(&title, " ");
    let rest = crate::clean::collapse_whitespace(&rest);
    (!rest.is_empty() && rest != "CIA").then_some(rest)
  }
}

fn clean_title_part(part: &str) -> String {
  let mut name = part.trim();
  if let Some(idx) = name.find("The World Factbook") {
    name = &name[..idx];
  }
  let name = name.replace("Central Intelligence Agency", "");
  let name = name.trim();
  let name = if name == "CIA" { "" } else { name };
  name.trim_matches(|c| c == ' ' || c == '-').to_string()
}

fn after_double_colon(el: ElementRef<'_>) -> Option<String> {
  let text = text_of(el);
  let (_, name) = text.rsplit_once("::")?;
  let name = name.trim();
  (name.chars().count() > 1).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn name_of(page: &str) -> String {
    NameExtractor::new().unwrap().extract(&Html::parse_document(page))
  }

  #[test]
  fn classic_titles_put_the_name_last() {
    let page = "<html><head><title>CIA -- The World Factbook 2000 -- Aruba</title></head></html>";
    assert_eq!(name_of(page), "Aruba");
  }

  #[test]
  fn modern_titles_carry_region_and_dashes() {
    let page = "<title>North America :: United States \u{2014} The World Factbook - CIA</title>";
    assert_eq!(name_of(page), "United States");
  }

  #[test]
  fn nameless_titles_fall_through_to_page_furniture() {
    let page = "<title>CIA - The World Factbook</title>\
                <body><span class=\"category\">Geography ::BURKINA FASO</span></body>";
    assert_eq!(name_of(page), "Burkina Faso");

    let page = "<title>The World Factbook</title><body><div class=\"countryName\">Chad</div></body>";
    assert_eq!(name_of(page), "Chad");
  }

  #[test]
  fn pages_without_any_name_are_unknown() {
    assert_eq!(name_of("<title>CIA</title><body><p>x</p></body>"), UNKNOWN_NAME);
  }
}
