//! SQL schema for the Docket SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS projects (
    project_id              TEXT PRIMARY KEY,
    name                    TEXT NOT NULL,
    created_at              TEXT NOT NULL,
    legal_lock_activated_at TEXT      -- set by the first generation, never cleared
);

-- One counter row per project. Counters only increase; increments happen in
-- the same transaction as the insert that consumes the value.
CREATE TABLE IF NOT EXISTS project_sequences (
    project_id           TEXT PRIMARY KEY REFERENCES projects(project_id),
    last_evidence_number INTEGER NOT NULL DEFAULT 0,
    last_report_version  INTEGER NOT NULL DEFAULT 0
);

-- Evidence numbers are never reused or renumbered, even across soft deletes.
CREATE TABLE IF NOT EXISTS evidence_items (
    evidence_id       TEXT PRIMARY KEY,
    project_id        TEXT NOT NULL REFERENCES projects(project_id),
    evidence_number   INTEGER NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT '',
    file_ref          TEXT NOT NULL,
    include_in_report INTEGER NOT NULL DEFAULT 0,
    locked            INTEGER NOT NULL DEFAULT 0,   -- one-way
    source_entry_id   TEXT,            -- originating feed entry, for backfill
    created_at        TEXT NOT NULL,
    deleted_at        TEXT,            -- soft delete
    UNIQUE (project_id, evidence_number),
    UNIQUE (project_id, source_entry_id)
);

-- One mutable draft per project; history exists only via report snapshots.
CREATE TABLE IF NOT EXISTS report_drafts (
    project_id TEXT PRIMARY KEY REFERENCES projects(project_id),
    content    TEXT NOT NULL,          -- JSON DraftContent
    updated_at TEXT NOT NULL
);

-- Report instances are strictly append-only. Only the bookkeeping flags
-- (archived, backup_downloaded) are ever updated after insert.
CREATE TABLE IF NOT EXISTS report_instances (
    report_id            TEXT PRIMARY KEY,
    project_id           TEXT NOT NULL REFERENCES projects(project_id),
    version_number       INTEGER NOT NULL,
    total_evidence_count INTEGER NOT NULL,
    content_snapshot     TEXT NOT NULL,   -- frozen JSON copy of the draft
    created_at           TEXT NOT NULL,
    archived             INTEGER NOT NULL DEFAULT 0,
    backup_downloaded    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (project_id, version_number)
);

-- Citable fields copied at generation time. No UPDATE or DELETE is ever
-- issued against this table.
CREATE TABLE IF NOT EXISTS report_evidence (
    snapshot_id     TEXT PRIMARY KEY,
    report_id       TEXT NOT NULL REFERENCES report_instances(report_id),
    evidence_id     TEXT NOT NULL REFERENCES evidence_items(evidence_id),
    evidence_number INTEGER NOT NULL,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    file_ref        TEXT NOT NULL,
    included_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS evidence_project_idx
    ON evidence_items(project_id, evidence_number);
CREATE INDEX IF NOT EXISTS reports_project_idx
    ON report_instances(project_id, version_number);
CREATE INDEX IF NOT EXISTS report_evidence_report_idx
    ON report_evidence(report_id);

PRAGMA user_version = 1;
";
