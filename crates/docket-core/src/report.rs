//! Report instances and their evidence snapshots.
//!
//! A report instance is an immutable, numbered artifact. Neither its content
//! snapshot nor its evidence snapshots ever change after the generating
//! transaction commits; only the post-hoc bookkeeping flags may be flipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::DraftContent;

/// An immutable, numbered snapshot of the draft plus the selected evidence
/// at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInstance {
  pub report_id:            Uuid,
  pub project_id:           Uuid,
  /// Strictly increasing per project, starting at 1.
  pub version_number:       i64,
  pub total_evidence_count: i64,
  /// Frozen deep copy of the draft as of generation.
  pub content_snapshot:     DraftContent,
  pub created_at:           DateTime<Utc>,
  /// Post-hoc bookkeeping; flipping these never alters content.
  pub archived:             bool,
  pub backup_downloaded:    bool,
}

/// One evidence item as captured in a specific report instance.
///
/// Copies the citable fields at generation time so the historical report
/// stays stable regardless of anything that happens to the live item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEvidenceSnapshot {
  pub snapshot_id:     Uuid,
  pub report_id:       Uuid,
  pub evidence_id:     Uuid,
  pub evidence_number: i64,
  pub title:           String,
  pub description:     String,
  pub file_ref:        String,
  pub included_at:     DateTime<Utc>,
}

/// Result of [`crate::store::CaseStore::generate_report`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeneratedReport {
  pub report_id:      Uuid,
  pub version_number: i64,
  pub evidence_count: i64,
}
