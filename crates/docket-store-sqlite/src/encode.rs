//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The draft content snapshot
//! is stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings. Booleans and the lock state live in INTEGER columns.

use chrono::{DateTime, Utc};
use docket_core::{
  draft::{DraftContent, ReportDraft},
  evidence::{EvidenceItem, LockState},
  project::Project,
  report::{ReportEvidenceSnapshot, ReportInstance},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LockState ───────────────────────────────────────────────────────────────

pub fn decode_lock(locked: bool) -> LockState {
  if locked { LockState::Locked } else { LockState::Unlocked }
}

// ─── DraftContent ────────────────────────────────────────────────────────────

pub fn encode_draft_content(c: &DraftContent) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_draft_content(s: &str) -> Result<DraftContent> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub project_id: String,
  pub name:       String,
  pub created_at: String,
  pub legal_lock_activated_at: Option<String>,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id: decode_uuid(&self.project_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
      legal_lock_activated_at: self
        .legal_lock_activated_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from an `evidence_items` row.
pub struct RawEvidence {
  pub evidence_id:       String,
  pub project_id:        String,
  pub evidence_number:   i64,
  pub title:             String,
  pub description:       String,
  pub file_ref:          String,
  pub include_in_report: bool,
  pub locked:            bool,
  pub source_entry_id:   Option<String>,
  pub created_at:        String,
  pub deleted_at:        Option<String>,
}

impl RawEvidence {
  pub fn into_evidence(self) -> Result<EvidenceItem> {
    Ok(EvidenceItem {
      evidence_id:       decode_uuid(&self.evidence_id)?,
      project_id:        decode_uuid(&self.project_id)?,
      evidence_number:   self.evidence_number,
      title:             self.title,
      description:       self.description,
      file_ref:          self.file_ref,
      include_in_report: self.include_in_report,
      lock:              decode_lock(self.locked),
      source_entry_id:   self
        .source_entry_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:        decode_dt(&self.created_at)?,
      deleted_at:        self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `report_drafts` row.
pub struct RawDraft {
  pub project_id: String,
  pub content:    String,
  pub updated_at: String,
}

impl RawDraft {
  pub fn into_draft(self) -> Result<ReportDraft> {
    Ok(ReportDraft {
      project_id: decode_uuid(&self.project_id)?,
      content:    decode_draft_content(&self.content)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `report_instances` row.
pub struct RawReport {
  pub report_id:            String,
  pub project_id:           String,
  pub version_number:       i64,
  pub total_evidence_count: i64,
  pub content_snapshot:     String,
  pub created_at:           String,
  pub archived:             bool,
  pub backup_downloaded:    bool,
}

impl RawReport {
  pub fn into_report(self) -> Result<ReportInstance> {
    Ok(ReportInstance {
      report_id:            decode_uuid(&self.report_id)?,
      project_id:           decode_uuid(&self.project_id)?,
      version_number:       self.version_number,
      total_evidence_count: self.total_evidence_count,
      content_snapshot:     decode_draft_content(&self.content_snapshot)?,
      created_at:           decode_dt(&self.created_at)?,
      archived:             self.archived,
      backup_downloaded:    self.backup_downloaded,
    })
  }
}

/// Raw strings read directly from a `report_evidence` row.
pub struct RawSnapshot {
  pub snapshot_id:     String,
  pub report_id:       String,
  pub evidence_id:     String,
  pub evidence_number: i64,
  pub title:           String,
  pub description:     String,
  pub file_ref:        String,
  pub included_at:     String,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<ReportEvidenceSnapshot> {
    Ok(ReportEvidenceSnapshot {
      snapshot_id:     decode_uuid(&self.snapshot_id)?,
      report_id:       decode_uuid(&self.report_id)?,
      evidence_id:     decode_uuid(&self.evidence_id)?,
      evidence_number: self.evidence_number,
      title:           self.title,
      description:     self.description,
      file_ref:        self.file_ref,
      included_at:     decode_dt(&self.included_at)?,
    })
  }
}
