//! Error type for `docket-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] docket_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("project not found: {0}")]
  ProjectNotFound(uuid::Uuid),

  #[error("evidence not found: {0}")]
  EvidenceNotFound(uuid::Uuid),

  #[error("report not found: {0}")]
  ReportNotFound(uuid::Uuid),

  /// Mutation attempted on evidence locked by a published report.
  #[error("evidence {0} is locked by a published report")]
  EvidenceLocked(uuid::Uuid),

  /// Report generation attempted with zero active, included evidence.
  #[error("project {0} has no active evidence selected for the report")]
  NoEvidenceSelected(uuid::Uuid),

  /// Concurrent-write conflict reported by SQLite. Safe to retry.
  #[error("serialization conflict; retry the operation")]
  Conflict,
}

impl Error {
  /// Whether the caller may safely resubmit the failed operation.
  pub fn is_retryable(&self) -> bool { matches!(self, Error::Conflict) }
}

/// Map database errors, surfacing busy/locked conditions as the retryable
/// [`Error::Conflict`].
pub(crate) fn lift(e: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    _,
  )) = &e
    && matches!(
      code.code,
      rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
    )
  {
    return Error::Conflict;
  }
  Error::Database(e)
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
