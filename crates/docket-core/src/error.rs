//! Error types for `docket-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("project not found: {0}")]
  ProjectNotFound(Uuid),

  #[error("evidence not found: {0}")]
  EvidenceNotFound(Uuid),

  #[error("report not found: {0}")]
  ReportNotFound(Uuid),

  #[error("evidence {0} is locked by a published report")]
  EvidenceLocked(Uuid),

  #[error("project {0} has no active evidence selected for the report")]
  NoEvidenceSelected(Uuid),

  #[error("invalid document: {0}")]
  InvalidDocument(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
