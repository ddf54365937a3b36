//! The text-era grammar table.
//!
//! Each plain-text edition is described by one [`TextGrammar`] row: how
//! entities and sections are marked, and how field lines are laid out. A
//! single engine in [`crate::text`] interprets every row, so supporting
//! another edition is a new row rather than new control flow.

use regex::Regex;

use crate::{era::Era, error::Result};

/// Section headings used across the plain-text decade.
pub(crate) const SECTION_VOCABULARY: &[&str] = &[
  "Geography",
  "People",
  "Government",
  "Economy",
  "Communications",
  "Defense Forces",
  "Transportation",
  "Military",
  "Transnational Issues",
  "Introduction",
  "People and Society",
  "Energy",
  "Environment",
];

/// The 1992 colon markers only ever used these headings.
const COLON_SECTIONS: &[&str] = &[
  "Geography",
  "People",
  "Government",
  "Economy",
  "Communications",
  "Defense Forces",
  "Transportation",
  "Transnational Issues",
];

/// Headings that appear unprefixed inside an `@Name:Section` block.
const BARE_SPLIT_SECTIONS: &[&str] = &[
  "Economy",
  "Military",
  "Transnational Issues",
  "Defense Forces",
  "Introduction",
  "People and Society",
];

/// Headings recognised on their own line in the `@Name` bare editions.
const BARE_LINE_SECTIONS: &[&str] = &[
  "Geography",
  "People",
  "Government",
  "Economy",
  "Communications",
  "Transportation",
  "Defense Forces",
  "Military",
  "Transnational Issues",
  "Introduction",
  "People and Society",
];

/// How entity and section boundaries are marked.
pub(crate) enum Blocks {
  /// One marker line carries both names (`name` and `section` groups).
  Combined(Regex),
  /// Entity markers (`name` group) delimit blocks; sections are found
  /// inside each block.
  Nested { entity: Regex, sections: SectionRule },
}

pub(crate) enum SectionRule {
  /// A prefixed heading line (`section` group).
  Prefixed(Regex),
  /// A line consisting solely of a known heading; underline rows ignored.
  BareLines(&'static [&'static str]),
  /// `<entity name>` followed by a tab/space gutter and the heading.
  NameRepeat,
}

/// Layout of the field lines inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldStyle {
  /// `Field: value` on one line; continuation lines joined with a space.
  Inline,
  /// `Field:` at column 0, values and sub-labels indented beneath.
  Indented,
  /// Inline fields possibly indented by up to two spaces, with indented
  /// lower-case sub-labels folded into the value.
  Mixed,
  /// `_#_Field: value`.
  Tagged,
}

pub(crate) struct TextGrammar {
  pub era:         Era,
  /// Everything before the first match of this line is ignored.
  pub preamble:    Option<Regex>,
  pub blocks:      Blocks,
  /// Unprefixed headings that open a new section inside a combined block.
  pub bare_splits: Option<Regex>,
  pub fields:      FieldStyle,
}

fn alternation(words: &[&str]) -> String {
  let mut sorted: Vec<&str> = words.to_vec();
  sorted.sort_by_key(|w| std::cmp::Reverse(w.len()));
  sorted
    .iter()
    .map(|w| regex::escape(w))
    .collect::<Vec<_>>()
    .join("|")
}

/// Build the whole table.
pub(crate) fn text_grammars() -> Result<Vec<TextGrammar>> {
  let known = alternation(SECTION_VOCABULARY);
  let colon = alternation(COLON_SECTIONS);
  let bare = alternation(BARE_SPLIT_SECTIONS);
  let at_name = r"(?m)^@(?P<name>[A-Za-z][A-Za-z ,'.\-()]+)$";

  Ok(vec![
    TextGrammar {
      era:         Era::ColumnText,
      preamble:    None,
      blocks:      Blocks::Nested {
        entity:   Regex::new(r"(?m)^Country:[ \t]{2,}(?P<name>.+)$")?,
        sections: SectionRule::Prefixed(Regex::new(
          r"(?m)^- (?P<section>[A-Z].*)$",
        )?),
      },
      bare_splits: None,
      fields:      FieldStyle::Inline,
    },
    TextGrammar {
      era:         Era::TaggedText,
      preamble:    None,
      blocks:      Blocks::Nested {
        entity:   Regex::new(r"(?m)^_@_(?P<name>.*)$")?,
        sections: SectionRule::Prefixed(Regex::new(
          r"(?m)^[ \t]*_\*_(?P<section>.*)$",
        )?),
      },
      bare_splits: None,
      fields:      FieldStyle::Tagged,
    },
    TextGrammar {
      era:         Era::ColonText,
      preamble:    None,
      blocks:      Blocks::Combined(Regex::new(&format!(
        r"(?m)^:(?P<name>[A-Za-z][\w \t,'.\-()]+?)[ \t]+(?P<section>{colon})[ \t]*$"
      ))?),
      bare_splits: None,
      fields:      FieldStyle::Indented,
    },
    TextGrammar {
      era:         Era::AsteriskText,
      preamble:    None,
      // Greedy name: `*Korea, North, Geography` is entity `Korea, North`.
      blocks:      Blocks::Combined(Regex::new(&format!(
        r"(?m)^[*@](?P<name>.+),[ \t]*(?P<section>{known})[ \t]*$"
      ))?),
      bare_splits: None,
      fields:      FieldStyle::Indented,
    },
    TextGrammar {
      era:         Era::AtSignText,
      preamble:    Some(Regex::new(r"(?m)^_{20,}[ \t]*$")?),
      blocks:      Blocks::Combined(Regex::new(
        r"(?m)^@(?P<name>[^:\n]+):(?P<section>[A-Za-z][\w ]*)",
      )?),
      bare_splits: Some(Regex::new(&format!(r"(?m)^({bare})[ \t]*$"))?),
      fields:      FieldStyle::Mixed,
    },
    TextGrammar {
      era:         Era::AtSignBareText,
      preamble:    None,
      blocks:      Blocks::Nested {
        entity:   Regex::new(at_name)?,
        sections: SectionRule::BareLines(BARE_LINE_SECTIONS),
      },
      bare_splits: None,
      fields:      FieldStyle::Mixed,
    },
    TextGrammar {
      era:         Era::EqualsText,
      preamble:    None,
      blocks:      Blocks::Nested {
        entity:   Regex::new(at_name)?,
        sections: SectionRule::NameRepeat,
      },
      bare_splits: None,
      fields:      FieldStyle::Inline,
    },
  ])
}
