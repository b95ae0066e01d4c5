//! SQL schema for the detax SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT: ids of deleted rows are never handed out again.
CREATE TABLE IF NOT EXISTS documents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    source      TEXT,
    category    TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_category_idx ON documents(category);

-- External-content FTS5 index over documents.content, kept in sync by the
-- triggers below.
CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
    content,
    content = 'documents',
    content_rowid = 'id'
);

CREATE TRIGGER IF NOT EXISTS documents_fts_insert AFTER INSERT ON documents BEGIN
    INSERT INTO documents_fts (rowid, content) VALUES (new.id, new.content);
END;

CREATE TRIGGER IF NOT EXISTS documents_fts_delete AFTER DELETE ON documents BEGIN
    INSERT INTO documents_fts (documents_fts, rowid, content)
    VALUES ('delete', old.id, old.content);
END;

CREATE TRIGGER IF NOT EXISTS documents_fts_update AFTER UPDATE ON documents BEGIN
    INSERT INTO documents_fts (documents_fts, rowid, content)
    VALUES ('delete', old.id, old.content);
    INSERT INTO documents_fts (rowid, content) VALUES (new.id, new.content);
END;

CREATE TABLE IF NOT EXISTS projects (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    contact     TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS projects_contact_idx ON projects(contact);

-- project_id is checked at insert time; deleting a project leaves its files.
CREATE TABLE IF NOT EXISTS project_files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id  INTEGER NOT NULL,
    filename    TEXT NOT NULL,
    path        TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS project_files_project_idx ON project_files(project_id);

-- Strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS domain_events (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id        TEXT NOT NULL UNIQUE,
    aggregate_type  TEXT NOT NULL,   -- 'document' | 'project'
    aggregate_id    INTEGER NOT NULL,
    event_type      TEXT NOT NULL,   -- discriminant of EventPayload
    payload         TEXT NOT NULL,   -- JSON payload (inner data only)
    metadata        TEXT NOT NULL DEFAULT '{}',
    created_at      TEXT NOT NULL    -- fixed-width RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS domain_events_stream_idx
    ON domain_events(aggregate_type, aggregate_id, created_at, seq);

PRAGMA user_version = 1;
";
