//! Raw documents as left on disk by the external fetcher.
//!
//! Layout: `<root>/<year>/...`, searched recursively. Markup editions ship
//! one page per entity, text editions one file per edition, interchange
//! editions one document per entity.

use std::{
  collections::BTreeSet,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use factbook_core::{parsed::RawDocument, record::Provenance};
use tracing::debug;
use walkdir::WalkDir;

/// Markup page stems containing any of these are not entity pages.
const SKIPPED_STEMS: &[&str] =
  &["template", "print", "summary", "notes", "appendix", "index", "wfb"];

/// Entity codes are at most this long.
const MAX_CODE_LEN: usize = 5;

/// Supplies the raw documents of one year.
pub trait RawSource: Send + Sync {
  /// Years with a directory in the source, ascending.
  fn years(&self) -> anyhow::Result<Vec<i32>>;

  /// Every usable document of `year`. Empty when the year is a gap.
  fn documents(&self, year: i32) -> anyhow::Result<Vec<RawDocument>>;

  /// The distinct provenances the documents of `year` hint at.
  fn hints(&self, year: i32) -> anyhow::Result<Vec<Provenance>> {
    let mut hints = Vec::new();
    for hint in self.documents(year)?.iter().filter_map(RawDocument::hint) {
      if !hints.contains(&hint) {
        hints.push(hint);
      }
    }
    Ok(hints)
  }
}

/// A directory tree with one sub-directory per year.
#[derive(Debug, Clone)]
pub struct DirSource {
  root: PathBuf,
}

impl DirSource {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  fn year_dir(&self, year: i32) -> PathBuf { self.root.join(year.to_string()) }

  /// The usable files of `year` with their documents still unread.
  fn candidates(&self, year: i32) -> anyhow::Result<Vec<(PathBuf, RawDocument)>> {
    let dir = self.year_dir(year);
    if !dir.is_dir() {
      return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut seen_codes = BTreeSet::new();
    for entry in WalkDir::new(&dir).sort_by_file_name() {
      let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
      if !entry.file_type().is_file() {
        continue;
      }
      let path = entry.path();
      let Some(doc) = classify_file(year, &dir, path) else {
        continue;
      };
      if let Some(code) = &doc.code
        && !seen_codes.insert(code.clone())
      {
        debug!(year, file = %doc.file_name, %code, "duplicate entity page skipped");
        continue;
      }
      found.push((path.to_path_buf(), doc));
    }
    Ok(found)
  }
}

impl RawSource for DirSource {
  fn years(&self) -> anyhow::Result<Vec<i32>> {
    if !self.root.is_dir() {
      return Ok(Vec::new());
    }
    let mut years = Vec::new();
    let entries = std::fs::read_dir(&self.root)
      .with_context(|| format!("reading {}", self.root.display()))?;
    for entry in entries {
      let entry = entry?;
      if entry.file_type()?.is_dir()
        && let Some(year) = entry.file_name().to_str().and_then(|n| n.parse::<i32>().ok())
      {
        years.push(year);
      }
    }
    years.sort_unstable();
    Ok(years)
  }

  fn documents(&self, year: i32) -> anyhow::Result<Vec<RawDocument>> {
    let mut docs = Vec::new();
    for (path, doc) in self.candidates(year)? {
      let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
      docs.push(RawDocument { bytes, ..doc });
    }
    Ok(docs)
  }

  fn hints(&self, year: i32) -> anyhow::Result<Vec<Provenance>> {
    let mut hints = Vec::new();
    for (_, doc) in self.candidates(year)? {
      if let Some(hint) = doc.hint()
        && !hints.contains(&hint)
      {
        hints.push(hint);
      }
    }
    Ok(hints)
  }
}

/// An empty document for `path` in `year`, or `None` when it is not one.
fn classify_file(year: i32, dir: &Path, path: &Path) -> Option<RawDocument> {
  let file_name = path
    .strip_prefix(dir)
    .unwrap_or(path)
    .to_string_lossy()
    .into_owned();
  let meta = RawDocument::new(year, file_name, Vec::new());
  let provenance = meta.hint()?;

  let code = match provenance {
    Provenance::Html => {
      let stem = meta.stem().to_lowercase();
      if stem.chars().count() > MAX_CODE_LEN || SKIPPED_STEMS.iter().any(|s| stem.contains(s)) {
        return None;
      }
      Some(stem)
    }
    // Interchange documents name themselves; the parser falls back to the
    // upper-cased stem.
    Provenance::Json | Provenance::Text => None,
  };

  Some(match code {
    Some(code) => meta.with_code(code),
    None => meta,
  })
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, body) in files {
      let path = dir.path().join(path);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, body).unwrap();
    }
    dir
  }

  #[test]
  fn years_are_numeric_directories() {
    let dir = tree(&[("2005/geos/us.html", ""), ("1995/wfb.txt", ""), ("notes/x.txt", "")]);
    assert_eq!(DirSource::new(dir.path()).years().unwrap(), vec![1995, 2005]);
  }

  #[test]
  fn markup_pages_are_filtered_and_coded() {
    let dir = tree(&[
      ("2005/geos/us.html", "<html>us</html>"),
      ("2005/geos/print_us.html", ""),
      ("2005/geos/appendix-a.html", ""),
      ("2005/geos/longname.html", ""),
      ("2005/geos/xx.htm", ""),
      ("2005/other/us.html", "dup"),
      ("2005/readme.md", ""),
    ]);
    let docs = DirSource::new(dir.path()).documents(2005).unwrap();
    let codes: Vec<_> = docs.iter().map(|d| d.code.as_deref().unwrap()).collect();
    assert_eq!(codes, vec!["us", "xx"]);
    assert_eq!(docs[0].bytes, b"<html>us</html>");
    assert_eq!(docs[0].year, 2005);
  }

  #[test]
  fn text_and_json_documents_carry_no_code() {
    let dir = tree(&[("1995/pg571.txt", "@Albania"), ("2023/us.json", "{}")]);
    let source = DirSource::new(dir.path());
    let text = source.documents(1995).unwrap();
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].code, None);
    let json = source.documents(2023).unwrap();
    assert_eq!(json[0].stem(), "us");
  }

  #[test]
  fn hints_list_each_family_once() {
    let dir = tree(&[
      ("2001/geos/us.html", ""),
      ("2001/geos/ch.html", ""),
      ("2001/wfb2001.txt", ""),
      ("2001/readme.md", ""),
    ]);
    let mut hints = DirSource::new(dir.path()).hints(2001).unwrap();
    hints.sort_by_key(|p| p.to_string());
    assert_eq!(hints, vec![Provenance::Html, Provenance::Text]);
    assert!(DirSource::new(dir.path()).hints(1980).unwrap().is_empty());
  }

  #[test]
  fn missing_year_is_empty() {
    let dir = tree(&[]);
    assert!(DirSource::new(dir.path()).documents(1980).unwrap().is_empty());
  }
}
