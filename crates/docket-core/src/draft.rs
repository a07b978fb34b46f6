//! The mutable report draft.
//!
//! One row per project, edited freely at any time. The draft has no version
//! history of its own; history exists only through the snapshots captured
//! into report instances at generation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::EconomyLine;

/// The structured fields of the draft. All narrative fields default to the
/// empty string so an absent draft reads as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftContent {
  #[serde(default)]
  pub summary:            String,
  #[serde(default)]
  pub background:         String,
  #[serde(default)]
  pub legal_analysis:     String,
  #[serde(default)]
  pub technical_analysis: String,
  #[serde(default)]
  pub conclusion:         String,
  /// Economic-loss lines, frozen together with the narrative at generation.
  #[serde(default)]
  pub economy:            Vec<EconomyLine>,
}

impl DraftContent {
  /// Deep, independent copy via a serialize round-trip. Snapshots must
  /// never share references with the live draft.
  pub fn deep_copy(&self) -> crate::Result<Self> {
    let json = serde_json::to_string(self)?;
    Ok(serde_json::from_str(&json)?)
  }
}

/// The persisted draft row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
  pub project_id: Uuid,
  pub content:    DraftContent,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deep_copy_is_independent() {
    let mut original = DraftContent {
      summary: "Tenant dispute over water damage".into(),
      ..Default::default()
    };
    let copy = original.deep_copy().unwrap();
    original.summary.push_str(" — amended");
    assert_eq!(copy.summary, "Tenant dispute over water damage");
  }
}
