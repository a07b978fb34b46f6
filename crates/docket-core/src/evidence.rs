//! Evidence items — numbered, citable units of supporting material.
//!
//! An evidence number is allocated once and never reused or renumbered,
//! even across soft deletes. Once an item has been published in a report it
//! is locked: every mutable field becomes read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Lock state ──────────────────────────────────────────────────────────────

/// One-way mutation guard for an evidence item.
///
/// The only legal transition is `Unlocked -> Locked`, taken when the item is
/// published in a report. There is no unlock on this path; only an
/// administrative intervention outside this crate may reverse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
  Unlocked,
  Locked,
}

impl LockState {
  pub fn is_locked(self) -> bool { matches!(self, Self::Locked) }

  /// Take the one-way transition. Idempotent on already-locked state.
  pub fn lock(self) -> Self { Self::Locked }
}

// ─── Evidence item ───────────────────────────────────────────────────────────

/// A numbered piece of supporting material belonging to one project.
///
/// The binary payload lives in external object storage; `file_ref` is an
/// opaque pointer into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
  pub evidence_id:       Uuid,
  pub project_id:        Uuid,
  /// Positive, unique within the project, assigned in allocation order.
  pub evidence_number:   i64,
  pub title:             String,
  pub description:       String,
  pub file_ref:          String,
  /// Selection flag: whether the item goes into the next generated report.
  pub include_in_report: bool,
  pub lock:              LockState,
  /// Identity of the source artifact this item was backfilled from, if any.
  pub source_entry_id:   Option<Uuid>,
  pub created_at:        DateTime<Utc>,
  /// Soft-delete marker. Deleted items keep their number forever.
  pub deleted_at:        Option<DateTime<Utc>>,
}

impl EvidenceItem {
  pub fn is_active(&self) -> bool { self.deleted_at.is_none() }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CaseStore::create_evidence`].
/// The evidence number is always allocated by the store.
#[derive(Debug, Clone)]
pub struct NewEvidence {
  pub project_id:        Uuid,
  pub title:             String,
  pub description:       String,
  pub file_ref:          String,
  pub include_in_report: bool,
}

/// One artifact from the external source-material feed, consumed by
/// [`crate::store::CaseStore::backfill_from_source`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
  /// Identity of the originating entry; backfill idempotency keys on this,
  /// never on evidence numbers.
  pub entry_id:   Uuid,
  pub created_at: DateTime<Utc>,
  /// Free text attached to the artifact. The first line (truncated to 80
  /// chars) becomes the evidence title, the full text the description.
  pub content:    String,
  pub file_ref:   String,
  #[serde(default)]
  pub include_in_report_default: bool,
}

impl SourceEntry {
  /// Derive the evidence title from the entry's free text.
  pub fn derived_title(&self) -> String {
    let first = self.content.lines().next().unwrap_or("").trim();
    let mut title: String = first.chars().take(80).collect();
    if title.is_empty() {
      title = format!("Attachment {}", self.entry_id);
    }
    title
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
