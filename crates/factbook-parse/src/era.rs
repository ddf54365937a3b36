//! Format Classifier & Dispatcher: an explicit year → era table.

use factbook_core::record::Provenance;
use strum::{AsRefStr, Display};

/// One generation of the published format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Era {
  /// `Country:  Name` / `- Section` / `Field: value`.
  ColumnText,
  /// `_@_Name` / `_*_Section` / `_#_Field: value`.
  TaggedText,
  /// `:Name Section` with indented values.
  ColonText,
  /// `*Name, Section` with indented values.
  AsteriskText,
  /// `@Name:Section` with mixed inline/indented values.
  AtSignText,
  /// `@Name` followed by bare, underlined section headings.
  AtSignBareText,
  /// `@Name` then `Name    Section` headings.
  EqualsText,
  /// `<a name>` section anchors, `<b>Label:</b>` fields.
  ClassicHtml,
  /// `td.FieldLabel` cells.
  TableHtml,
  /// `div.CollapsiblePanel` blocks.
  PanelHtml,
  /// `h2.question` expand/collapse headings.
  ExpandHtml,
  /// `*-category-section-anchor` / `field-*` anchors.
  ModernHtml,
  /// Structured interchange documents.
  Json,
}

impl Era {
  /// The table lookup. Total: years before the table use the oldest era,
  /// years after it use the newest.
  pub fn for_year(year: i32) -> Self {
    match year {
      ..=1990 => Self::ColumnText,
      1991 => Self::TaggedText,
      1992 => Self::ColonText,
      1993 | 1994 => Self::AsteriskText,
      1995 | 1997 | 1998 => Self::AtSignText,
      1996 | 1999 => Self::AtSignBareText,
      2000 => Self::ClassicHtml,
      // The markup edition for 2001 is known to be broken; the plain text
      // edition is substituted.
      2001 => Self::EqualsText,
      2002..=2008 => Self::TableHtml,
      2009..=2014 => Self::PanelHtml,
      2015..=2017 => Self::ExpandHtml,
      2018..=2020 => Self::ModernHtml,
      _ => Self::Json,
    }
  }

  /// Pick the era for a document. A provenance hint that disagrees with the
  /// table selects the nearest era of the hinted family.
  pub fn select(year: i32, hint: Option<Provenance>) -> Self {
    let table = Self::for_year(year);
    match hint {
      Some(hint) if hint != table.provenance() => Self::nearest(hint, year),
      _ => table,
    }
  }

  /// The era a whole edition is read in, given the provenances its
  /// documents hint at. The table's family wins whenever the edition ships
  /// it; otherwise the richest family present does. A year read by
  /// [`Era::for_edition`] is read in exactly one family.
  pub fn for_edition(year: i32, hints: impl IntoIterator<Item = Provenance>) -> Self {
    let table = Self::for_year(year);
    let hints: Vec<Provenance> = hints.into_iter().collect();
    if hints.is_empty() || hints.contains(&table.provenance()) {
      return table;
    }
    [Provenance::Json, Provenance::Html, Provenance::Text]
      .into_iter()
      .find(|p| hints.contains(p))
      .map_or(table, |p| Self::nearest(p, year))
  }

  fn nearest(provenance: Provenance, year: i32) -> Self {
    match provenance {
      Provenance::Text if year >= 2000 => Self::EqualsText,
      Provenance::Text => Self::for_year(year),
      Provenance::Html if year < 2000 => Self::ClassicHtml,
      Provenance::Html if year == 2001 => Self::TableHtml,
      Provenance::Html => Self::ModernHtml,
      Provenance::Json => Self::Json,
    }
  }

  pub fn provenance(self) -> Provenance {
    match self {
      Self::ColumnText
      | Self::TaggedText
      | Self::ColonText
      | Self::AsteriskText
      | Self::AtSignText
      | Self::AtSignBareText
      | Self::EqualsText => Provenance::Text,
      Self::ClassicHtml
      | Self::TableHtml
      | Self::PanelHtml
      | Self::ExpandHtml
      | Self::ModernHtml => Provenance::Html,
      Self::Json => Provenance::Json,
    }
  }

  /// Text editions ship the whole edition as one document.
  pub fn is_multi_entity(self) -> bool { self.provenance() == Provenance::Text }
}
