//! Project — the case envelope that owns evidence, drafts, and reports.
//!
//! A project holds only identity metadata plus the one-way legal-lock
//! marker. Everything documentary lives in evidence items and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A documentation case. Evidence numbering and report versioning are both
/// scoped to a single project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub project_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
  /// Set by the first successful report generation; never cleared.
  pub legal_lock_activated_at: Option<DateTime<Utc>>,
}

impl Project {
  /// Whether any report has ever been generated for this project.
  pub fn legal_lock_activated(&self) -> bool {
    self.legal_lock_activated_at.is_some()
  }
}

/// The per-project counter row backing evidence numbers and report versions.
///
/// Both counters are monotonic; the "next" value is always allocated by an
/// atomic increment inside the transaction that consumes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectSequence {
  pub project_id:           Uuid,
  pub last_evidence_number: i64,
  pub last_report_version:  i64,
}
