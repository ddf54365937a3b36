//! [`SqliteStore`]: the SQLite implementation of [`FactbookStore`].

use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  path::Path,
};

use chrono::Utc;
use factbook_core::{
  entity::{CanonicalEntity, EntityType, NewEntity},
  mapping::{FieldNameMapping, FieldNameStats},
  record::{Provenance, YearRecord},
  store::{
    CanonicalQuery, ClassificationInput, FactbookStore, FieldContent, SeriesPoint, YearBatch,
    YearCount, YearSummary,
  },
  subvalue::SubValue,
  validate::{CheckOutcome, ValidationConfig},
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Error, Result,
  encode::{
    RawEntity, RawMapping, RawYearRecord, decode_provenance, encode_atom, encode_dt,
    sub_value_from_row,
  },
  schema::SCHEMA,
  validate,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Factbook archive backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn entity_by_code(&self, code: String) -> Result<Option<CanonicalEntity>> {
    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM entities WHERE code = ?1", RawEntity::COLUMNS),
              rusqlite::params![code],
              RawEntity::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntity::into_entity).transpose()
  }
}

// ─── FactbookStore impl ──────────────────────────────────────────────────────

impl FactbookStore for SqliteStore {
  type Error = Error;

  // ── Canonical entities ────────────────────────────────────────────────────

  async fn upsert_entity(&self, entity: NewEntity) -> Result<CanonicalEntity> {
    let code = entity.code.clone();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO entities (code, name, entity_type, created_at)
           VALUES (?1, ?2, 'unknown', ?3)",
          rusqlite::params![entity.code, entity.name, at_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .entity_by_code(code.clone())
      .await?
      .ok_or_else(|| factbook_core::Error::EntityNotFound(code).into())
  }

  async fn list_entities(&self) -> Result<Vec<CanonicalEntity>> {
    let raws: Vec<RawEntity> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM entities ORDER BY code",
          RawEntity::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawEntity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntity::into_entity).collect()
  }

  async fn classify_entity(
    &self,
    code: String,
    entity_type: EntityType,
    administered_by: Option<String>,
  ) -> Result<()> {
    let type_str = entity_type.as_ref().to_owned();
    let target = code.clone();

    let updated = self
      .conn
      .call(move |conn| {
        // An unknown administering code leaves the current link alone.
        Ok(conn.execute(
          "UPDATE entities
              SET entity_type     = ?1,
                  administered_by = COALESCE(
                    (SELECT a.entity_id FROM entities a WHERE a.code = ?2 AND a.code != ?3),
                    administered_by)
            WHERE code = ?3",
          rusqlite::params![type_str, administered_by, target],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(factbook_core::Error::EntityNotFound(code).into());
    }
    Ok(())
  }

  async fn set_alternate_code(&self, code: String, alternate: String) -> Result<()> {
    let target = code.clone();
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE entities SET alternate_code = ?1 WHERE code = ?2",
          rusqlite::params![alternate, target],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(factbook_core::Error::EntityNotFound(code).into());
    }
    Ok(())
  }

  async fn classification_inputs(&self) -> Result<Vec<ClassificationInput>> {
    let inputs = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "WITH named AS (
             SELECT r.entity_id, r.year, f.field_id, f.content,
                    COALESCE(m.canonical_name, f.name) AS canonical
               FROM fields f
               JOIN year_records r ON r.record_id = f.record_id
               LEFT JOIN field_name_mappings m ON m.original_name = f.name
              WHERE r.entity_id IS NOT NULL
           )
           SELECT e.entity_id, e.code, e.name,
                  (SELECT n.content FROM named n
                    WHERE n.entity_id = e.entity_id AND n.canonical = 'Dependency status'
                    ORDER BY n.year DESC, n.field_id LIMIT 1),
                  (SELECT n.content FROM named n
                    WHERE n.entity_id = e.entity_id AND n.canonical = 'Government type'
                    ORDER BY n.year DESC, n.field_id LIMIT 1)
             FROM entities e
            ORDER BY e.code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(ClassificationInput {
              entity_id:         row.get(0)?,
              code:              row.get(1)?,
              name:              row.get(2)?,
              dependency_status: row.get(3)?,
              government_type:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(inputs)
  }

  // ── Per-year raw data ─────────────────────────────────────────────────────

  async fn replace_year(&self, batch: YearBatch) -> Result<YearSummary> {
    let year = batch.year;

    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Links survive re-ingest: snapshot before the delete, restore first.
        let snapshot: HashMap<(String, String), i64> = {
          let mut stmt = tx.prepare(
            "SELECT code, name, entity_id FROM year_records
              WHERE year = ?1 AND entity_id IS NOT NULL",
          )?;
          stmt
            .query_map(rusqlite::params![year], |row| {
              Ok(((row.get(0)?, row.get(1)?), row.get(2)?))
            })?
            .collect::<rusqlite::Result<_>>()?
        };

        tx.execute("DELETE FROM year_records WHERE year = ?1", rusqlite::params![year])?;

        let mut summary = YearSummary { year, ..YearSummary::default() };
        {
          let mut insert_record = tx.prepare(
            "INSERT INTO year_records (year, code, name, provenance, entity_id, source_digest)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          let mut insert_section = tx.prepare(
            "INSERT INTO sections (record_id, position, title) VALUES (?1, ?2, ?3)",
          )?;
          let mut insert_field = tx.prepare(
            "INSERT INTO fields (section_id, record_id, position, name, content)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;

          for record in batch.records {
            let restored = snapshot.get(&(record.code.clone(), record.name.clone())).copied();
            let entity_id = restored.or_else(|| record.resolution.entity_id());
            if restored.is_some() {
              summary.restored_links += 1;
            }
            if entity_id.is_some() {
              summary.linked += 1;
            }

            let record_id = insert_record.insert(rusqlite::params![
              year,
              record.code,
              record.name,
              record.provenance.as_ref(),
              entity_id,
              record.source_digest,
            ])?;
            summary.records += 1;

            for (s_pos, section) in record.sections.into_iter().enumerate() {
              let section_id =
                insert_section.insert(rusqlite::params![record_id, s_pos as i64, section.title])?;
              summary.sections += 1;

              for (f_pos, field) in section.fields.into_iter().enumerate() {
                insert_field.execute(rusqlite::params![
                  section_id,
                  record_id,
                  f_pos as i64,
                  field.name,
                  field.content,
                ])?;
                summary.fields += 1;
              }
            }
          }
        }

        tx.commit()?;
        Ok(summary)
      })
      .await?;

    debug!(year, records = summary.records, "year replaced");
    Ok(summary)
  }

  async fn year_records(&self, year: i32) -> Result<Vec<YearRecord>> {
    let raws: Vec<RawYearRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, year, code, name, provenance, entity_id, source_digest
             FROM year_records WHERE year = ?1 ORDER BY record_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year], RawYearRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawYearRecord::into_record).collect()
  }

  async fn list_years(&self) -> Result<Vec<YearCount>> {
    let raws: Vec<(i32, i64, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT year, COUNT(*), provenance FROM year_records
            GROUP BY year, provenance ORDER BY year, provenance",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(year, records, provenance)| {
        Ok(YearCount {
          year,
          records: u64::try_from(records).unwrap_or_default(),
          provenance: decode_provenance(&provenance)?,
        })
      })
      .collect()
  }

  // ── Field name canonicalization ───────────────────────────────────────────

  async fn field_name_stats(&self) -> Result<Vec<FieldNameStats>> {
    let stats = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT f.name, MIN(r.year), MAX(r.year), COUNT(*)
             FROM fields f
             JOIN year_records r ON r.record_id = f.record_id
            GROUP BY f.name
            ORDER BY f.name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(FieldNameStats {
              name:       row.get(0)?,
              first_year: row.get(1)?,
              last_year:  row.get(2)?,
              use_count:  u64::try_from(row.get::<_, i64>(3)?).unwrap_or_default(),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(stats)
  }

  async fn field_names_in_years(&self, years: Vec<i32>) -> Result<Vec<String>> {
    let names: BTreeSet<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT f.name
             FROM fields f
             JOIN year_records r ON r.record_id = f.record_id
            WHERE r.year = ?1",
        )?;
        let mut names = BTreeSet::new();
        for year in years {
          for name in stmt.query_map(rusqlite::params![year], |row| row.get(0))? {
            names.insert(name?);
          }
        }
        Ok(names)
      })
      .await?;
    Ok(names.into_iter().collect())
  }

  async fn replace_field_mappings(&self, mappings: Vec<FieldNameMapping>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM field_name_mappings", [])?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO field_name_mappings (
               original_name, canonical_name, mapping_type, consolidated_to,
               is_noise, first_year, last_year, use_count, notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for m in &mappings {
            stmt.execute(rusqlite::params![
              m.original_name,
              m.canonical_name,
              m.mapping_type.as_ref(),
              m.consolidated_to,
              m.is_noise,
              m.first_year,
              m.last_year,
              i64::try_from(m.use_count).unwrap_or(i64::MAX),
              m.notes,
            ])?;
          }
        }
        tx.commit()?;
        Ok(mappings.len())
      })
      .await?;
    Ok(written)
  }

  async fn field_mappings(&self) -> Result<Vec<FieldNameMapping>> {
    let raws: Vec<RawMapping> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT original_name, canonical_name, mapping_type, consolidated_to,
                  is_noise, first_year, last_year, use_count, notes
             FROM field_name_mappings ORDER BY original_name",
        )?;
        let rows = stmt
          .query_map([], RawMapping::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMapping::into_mapping).collect()
  }

  // ── Sub-values ────────────────────────────────────────────────────────────

  async fn fields_for_year(&self, year: i32) -> Result<Vec<FieldContent>> {
    let fields = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT f.field_id, f.name, m.canonical_name, f.content
             FROM fields f
             JOIN year_records r ON r.record_id = f.record_id
             LEFT JOIN field_name_mappings m ON m.original_name = f.name
            WHERE r.year = ?1
            ORDER BY f.field_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year], |row| {
            Ok(FieldContent {
              field_id:       row.get(0)?,
              raw_name:       row.get(1)?,
              canonical_name: row.get(2)?,
              content:        row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(fields)
  }

  async fn replace_sub_values(
    &self,
    year: i32,
    values: Vec<(i64, Vec<SubValue>)>,
  ) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM sub_values WHERE field_id IN (
             SELECT f.field_id FROM fields f
               JOIN year_records r ON r.record_id = f.record_id
              WHERE r.year = ?1)",
          rusqlite::params![year],
        )?;

        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO sub_values (
               field_id, position, sub_field, numeric_value, text_value,
               units, date_est, rank, source_fragment
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for (field_id, subs) in &values {
            for (position, sv) in subs.iter().enumerate() {
              let (numeric, text) = encode_atom(&sv.atom);
              stmt.execute(rusqlite::params![
                field_id,
                position as i64,
                sv.sub_field,
                numeric,
                text,
                sv.units,
                sv.date_est,
                sv.rank,
                sv.source_fragment,
              ])?;
              written += 1;
            }
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  async fn sub_values(&self, field_id: i64) -> Result<Vec<SubValue>> {
    let values = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sub_field, numeric_value, text_value, units, date_est, rank, source_fragment
             FROM sub_values WHERE field_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![field_id], sub_value_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(values)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn canonical_series(&self, query: &CanonicalQuery) -> Result<Vec<SeriesPoint>> {
    let field = query.field.clone();
    let entity = query.entity.clone();
    let sub_field = query.sub_field.clone();
    let consolidated = query.include_consolidated;

    let points = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.year, f.name, f.content, s.numeric_value, s.units
             FROM fields f
             JOIN year_records r        ON r.record_id = f.record_id
             JOIN entities e            ON e.entity_id = r.entity_id
             JOIN field_name_mappings m ON m.original_name = f.name
             LEFT JOIN sub_values s     ON s.field_id = f.field_id AND s.sub_field = ?4
            WHERE m.is_noise = 0
              AND (m.canonical_name = ?1 OR (?3 AND m.consolidated_to = ?1))
              AND e.name = ?2 COLLATE NOCASE
              AND (?4 IS NULL OR s.sub_value_id IS NOT NULL)
            ORDER BY r.year, f.field_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![field, entity, consolidated, sub_field], |row| {
            Ok(SeriesPoint {
              year:     row.get(0)?,
              raw_name: row.get(1)?,
              content:  row.get(2)?,
              numeric:  row.get(3)?,
              units:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(points)
  }

  async fn run_checks(
    &self,
    config: &ValidationConfig,
    expected_provenance: &BTreeMap<i32, Provenance>,
  ) -> Result<Vec<CheckOutcome>> {
    let snapshot = validate::Snapshot::load(self).await?;
    snapshot.checks(config, expected_provenance)
  }
}
