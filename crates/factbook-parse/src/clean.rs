//! Text clean-up shared by every era: wrapper stripping, entity names,
//! whitespace, truncation and the whole-document fallback.

use factbook_core::parsed::{ParsedEntity, ParsedField, ParsedSection};

/// Section title used by the whole-document fallback capture.
pub const FALLBACK_SECTION: &str = "Full Content";
/// Field name used by the whole-document fallback capture.
pub const FALLBACK_FIELD: &str = "Text";

const MAX_NAME_LEN: usize = 100;

/// Drop a Project Gutenberg header/footer if present.
pub fn strip_gutenberg(text: &str) -> &str {
  let mut body = text;
  if let Some((_, end)) = find_marker(body, "*** START OF ") {
    body = &body[end..];
  }
  if let Some((start, _)) = find_marker(body, "*** END OF ") {
    body = &body[..start];
  }
  body.trim()
}

/// Locate `*** <lead> [THE ]PROJECT GUTENBERG EBOOK ... ***` and return its
/// byte span.
fn find_marker(text: &str, lead: &str) -> Option<(usize, usize)> {
  let mut from = 0;
  while let Some(offset) = text[from..].find(lead) {
    let start = from + offset;
    let after = start + lead.len();
    let rest = &text[after..];
    let rest = rest.strip_prefix("THE ").unwrap_or(rest);
    if rest.starts_with("PROJECT GUTENBERG EBOOK")
      && let Some(close) = text[after..].find("***")
    {
      return Some((start, after + close + 3));
    }
    from = after;
  }
  None
}

/// Normalise a raw entity name; `None` when it cannot be a name at all
/// (empty, too long, or preamble noise starting with a digit or `*`).
pub fn entity_name(raw: &str) -> Option<String> {
  let name = collapse_whitespace(&unescape_entities(raw));
  if name.is_empty()
    || name.chars().count() > MAX_NAME_LEN
    || name.starts_with(|c: char| c.is_ascii_digit() || c == '*')
  {
    return None;
  }
  Some(title_case_if_shouting(&name))
}

/// `UNITED STATES` → `United States`; mixed-case input is left alone.
pub fn title_case_if_shouting(name: &str) -> String {
  let has_alpha = name.chars().any(char::is_alphabetic);
  if !has_alpha || name.chars().any(char::is_lowercase) {
    return name.to_string();
  }
  let mut out = String::with_capacity(name.len());
  let mut at_word_start = true;
  for c in name.chars() {
    if c.is_alphabetic() {
      if at_word_start {
        out.extend(c.to_uppercase());
      } else {
        out.extend(c.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(c);
      at_word_start = true;
    }
  }
  out
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of character references that appear in titles and
/// plain-text editions. Unknown references are left verbatim.
pub fn unescape_entities(s: &str) -> String {
  if !s.contains('&') {
    return s.to_string();
  }
  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp..];
    match tail.find(';').filter(|&semi| semi <= 10) {
      Some(semi) => match decode_reference(&tail[1..semi]) {
        Some(c) => {
          out.push(c);
          rest = &tail[semi + 1..];
        }
        None => {
          out.push('&');
          rest = &tail[1..];
        }
      },
      None => {
        out.push('&');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

fn decode_reference(name: &str) -> Option<char> {
  if let Some(num) = name.strip_prefix('#') {
    let code = match num.strip_prefix(['x', 'X']) {
      Some(hex) => u32::from_str_radix(hex, 16).ok()?,
      None => num.parse().ok()?,
    };
    return char::from_u32(code);
  }
  Some(match name {
    "amp" => '&',
    "lt" => '<',
    "gt" => '>',
    "quot" => '"',
    "apos" | "rsquo" | "lsquo" => '\'',
    "nbsp" => ' ',
    "ndash" => '\u{2013}',
    "mdash" => '\u{2014}',
    _ => return None,
  })
}

/// The longest prefix of `s` holding at most `cap` characters.
pub fn truncate_chars(s: &str, cap: usize) -> &str {
  match s.char_indices().nth(cap) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Capture a whole document as one section/field pair.
pub fn fallback_entity(
  code: Option<String>,
  name: impl Into<String>,
  text: &str,
  cap: usize,
) -> ParsedEntity {
  let content = truncate_chars(text.trim(), cap).to_string();
  ParsedEntity {
    code,
    name: name.into(),
    sections: vec![ParsedSection {
      title:  Some(FALLBACK_SECTION.to_string()),
      fields: vec![ParsedField::new(FALLBACK_FIELD, content)],
    }],
    fallback: true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gutenberg_wrapper_is_removed() {
    let text = "Header junk\n*** START OF THE PROJECT GUTENBERG EBOOK FACTBOOK ***\n\
                body\n*** END OF THE PROJECT GUTENBERG EBOOK FACTBOOK ***\nlicense";
    assert_eq!(strip_gutenberg(text), "body");
    assert_eq!(strip_gutenberg("  plain  "), "plain");
  }

  #[test]
  fn shouting_names_become_title_case() {
    assert_eq!(entity_name("UNITED STATES").as_deref(), Some("United States"));
    assert_eq!(entity_name("COTE D'IVOIRE").as_deref(), Some("Cote D'Ivoire"));
    assert_eq!(entity_name("Korea, North").as_deref(), Some("Korea, North"));
  }

  #[test]
  fn preamble_lines_are_not_names() {
    assert_eq!(entity_name("1995 edition"), None);
    assert_eq!(entity_name("*note"), None);
    assert_eq!(entity_name("   "), None);
    assert_eq!(entity_name(&"x".repeat(101)), None);
  }

  #[test]
  fn entities_are_unescaped() {
    assert_eq!(unescape_entities("Trinidad &amp; Tobago"), "Trinidad & Tobago");
    assert_eq!(unescape_entities("C&#244;te"), "C\u{f4}te");
    assert_eq!(unescape_entities("AT&T rocks"), "AT&T rocks");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_chars("Réunion", 2), "Ré");
    assert_eq!(truncate_chars("abc", 10), "abc");
  }
}
