//! SQL schema for the AAS SQLite store.
//!
//! Executed once at connection startup. There is no migration path; the
//! version is recorded in `PRAGMA user_version` for future use.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS asset (
    id          TEXT PRIMARY KEY,   -- external id, e.g. a serial number
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS submodel (
    id          TEXT PRIMARY KEY,
    asset_id    TEXT NOT NULL REFERENCES asset(id),
    title       TEXT NOT NULL,
    semantic_id TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (asset_id, title)
);

-- `value` mirrors the newest history row of the element.
CREATE TABLE IF NOT EXISTS submodel_element (
    id          TEXT PRIMARY KEY,
    submodel_id TEXT NOT NULL REFERENCES submodel(id),
    key         TEXT NOT NULL,
    value       TEXT,
    value_type  TEXT NOT NULL DEFAULT 'string',
    created_at  TEXT NOT NULL,
    UNIQUE (submodel_id, key)
);

-- Strictly append-only; the triggers below reject UPDATE and DELETE.
CREATE TABLE IF NOT EXISTS submodel_element_history (
    id                  TEXT PRIMARY KEY,
    submodel_element_id TEXT NOT NULL REFERENCES submodel_element(id),
    value               TEXT NOT NULL,
    recorded_at         TEXT NOT NULL   -- fixed-width RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS history_element_idx
    ON submodel_element_history(submodel_element_id, recorded_at);

CREATE TRIGGER IF NOT EXISTS history_no_update
BEFORE UPDATE ON submodel_element_history
BEGIN
    SELECT RAISE(ABORT, 'submodel_element_history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS history_no_delete
BEFORE DELETE ON submodel_element_history
BEGIN
    SELECT RAISE(ABORT, 'submodel_element_history is append-only');
END;

PRAGMA user_version = 1;
";
