//! SQL schema for the Factbook SQLite store.
//!
//! Executed once at connection startup. Raw tables (`year_records`,
//! `sections`, `fields`) change only through whole-year replacement; the
//! derived tables (`field_name_mappings`, `sub_values`) are dropped and
//! rewritten at will.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS entities (
    entity_id       INTEGER PRIMARY KEY,
    code            TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    alternate_code  TEXT,
    entity_type     TEXT NOT NULL DEFAULT 'unknown',
    administered_by INTEGER REFERENCES entities(entity_id) ON DELETE SET NULL,
    created_at      TEXT NOT NULL   -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS year_records (
    record_id     INTEGER PRIMARY KEY,
    year          INTEGER NOT NULL,
    code          TEXT NOT NULL,      -- year-local, as published
    name          TEXT NOT NULL,
    provenance    TEXT NOT NULL,      -- 'text' | 'html' | 'json'
    entity_id     INTEGER REFERENCES entities(entity_id),
    source_digest TEXT
);

CREATE TABLE IF NOT EXISTS sections (
    section_id INTEGER PRIMARY KEY,
    record_id  INTEGER NOT NULL REFERENCES year_records(record_id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    title      TEXT
);

CREATE TABLE IF NOT EXISTS fields (
    field_id   INTEGER PRIMARY KEY,
    section_id INTEGER NOT NULL REFERENCES sections(section_id) ON DELETE CASCADE,
    record_id  INTEGER NOT NULL REFERENCES year_records(record_id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    name       TEXT NOT NULL,
    content    TEXT NOT NULL
);

-- Raw content is the system of record.
CREATE TRIGGER IF NOT EXISTS fields_content_immutable
BEFORE UPDATE OF content ON fields
BEGIN
    SELECT RAISE(ABORT, 'field content is immutable');
END;

CREATE TABLE IF NOT EXISTS field_name_mappings (
    original_name   TEXT PRIMARY KEY,
    canonical_name  TEXT NOT NULL,
    mapping_type    TEXT NOT NULL,
    consolidated_to TEXT,
    is_noise        INTEGER NOT NULL DEFAULT 0,
    first_year      INTEGER NOT NULL,
    last_year       INTEGER NOT NULL,
    use_count       INTEGER NOT NULL,
    notes           TEXT
);

CREATE TABLE IF NOT EXISTS sub_values (
    sub_value_id    INTEGER PRIMARY KEY,
    field_id        INTEGER NOT NULL REFERENCES fields(field_id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    sub_field       TEXT NOT NULL,
    numeric_value   REAL,
    text_value      TEXT,
    units           TEXT,
    date_est        TEXT,
    rank            INTEGER,
    source_fragment TEXT,
    CHECK (numeric_value IS NULL OR text_value IS NULL)
);

CREATE INDEX IF NOT EXISTS year_records_year_idx   ON year_records(year);
CREATE INDEX IF NOT EXISTS year_records_entity_idx ON year_records(entity_id);
CREATE INDEX IF NOT EXISTS sections_record_idx     ON sections(record_id);
CREATE INDEX IF NOT EXISTS fields_record_idx       ON fields(record_id);
CREATE INDEX IF NOT EXISTS fields_name_idx         ON fields(name);
CREATE INDEX IF NOT EXISTS sub_values_field_idx    ON sub_values(field_id);

PRAGMA user_version = 1;
";
