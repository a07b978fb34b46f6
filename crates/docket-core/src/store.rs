//! The `CaseStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `docket-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//!
//! Write operations that consume a sequence number (evidence creation,
//! backfill, report generation) must allocate that number atomically with
//! the insert that uses it: two concurrent callers never observe the same
//! evidence number or report version.

use std::future::Future;

use uuid::Uuid;

use crate::{
  draft::{DraftContent, ReportDraft},
  evidence::{EvidenceItem, NewEvidence, SourceEntry},
  project::{Project, ProjectSequence},
  report::{GeneratedReport, ReportEvidenceSnapshot, ReportInstance},
};

/// Abstraction over a Docket case store backend.
///
/// Report instances and their evidence snapshots are append-only; evidence
/// mutations are guarded by the one-way lock taken at publication.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Projects ──────────────────────────────────────────────────────────

  /// Create and persist a new project.
  fn create_project(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  /// Retrieve a project by UUID. Returns `None` if not found.
  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// The project's counter row. `None` until the first allocation creates it.
  fn get_sequence(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<ProjectSequence>, Self::Error>> + Send + '_;

  // ── Evidence lifecycle ────────────────────────────────────────────────

  /// Record a new evidence item. The evidence number is allocated by the
  /// store, atomically with the insert.
  fn create_evidence(
    &self,
    input: NewEvidence,
  ) -> impl Future<Output = Result<EvidenceItem, Self::Error>> + Send + '_;

  /// Create evidence items for every source artifact not yet represented,
  /// in chronological order of the artifacts' creation timestamps.
  ///
  /// Idempotent: entries already mapped (by `entry_id`) are skipped.
  /// Returns only the items created by this call.
  fn backfill_from_source(
    &self,
    project_id: Uuid,
    entries: Vec<SourceEntry>,
  ) -> impl Future<Output = Result<Vec<EvidenceItem>, Self::Error>> + Send + '_;

  /// Update title and description. Fails if the item is locked.
  fn annotate_evidence(
    &self,
    evidence_id: Uuid,
    title: String,
    description: String,
  ) -> impl Future<Output = Result<EvidenceItem, Self::Error>> + Send + '_;

  /// Toggle the report-inclusion flag. Fails if the item is locked.
  fn set_inclusion(
    &self,
    evidence_id: Uuid,
    include: bool,
  ) -> impl Future<Output = Result<EvidenceItem, Self::Error>> + Send + '_;

  /// Soft-delete the item. Its number is never freed. Fails if locked.
  fn soft_delete_evidence(
    &self,
    evidence_id: Uuid,
  ) -> impl Future<Output = Result<EvidenceItem, Self::Error>> + Send + '_;

  /// Retrieve a single evidence item. Returns `None` if not found.
  fn get_evidence(
    &self,
    evidence_id: Uuid,
  ) -> impl Future<Output = Result<Option<EvidenceItem>, Self::Error>> + Send + '_;

  /// List a project's evidence, ordered by evidence number ascending.
  /// With `active_only`, soft-deleted items are excluded.
  fn list_evidence(
    &self,
    project_id: Uuid,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<EvidenceItem>, Self::Error>> + Send + '_;

  // ── Draft ─────────────────────────────────────────────────────────────

  /// The project's current draft, if one has been written.
  fn get_draft(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReportDraft>, Self::Error>> + Send + '_;

  /// Upsert the project's draft.
  fn put_draft(
    &self,
    project_id: Uuid,
    content: DraftContent,
  ) -> impl Future<Output = Result<ReportDraft, Self::Error>> + Send + '_;

  // ── Report generation ─────────────────────────────────────────────────

  /// Generate the next report version as one atomic unit of work:
  /// allocate the version, snapshot the draft and the selected evidence,
  /// activate the project's legal lock on first generation, and lock every
  /// included item. Any failure rolls the whole transaction back; a failed
  /// call burns no version number.
  fn generate_report(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<GeneratedReport, Self::Error>> + Send + '_;

  // ── Report reads & bookkeeping ────────────────────────────────────────

  /// Retrieve a report instance. Returns `None` if not found.
  fn get_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReportInstance>, Self::Error>> + Send + '_;

  /// List a project's report instances, newest version first.
  fn list_reports(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReportInstance>, Self::Error>> + Send + '_;

  /// The evidence snapshots captured in a report, ordered by evidence
  /// number ascending.
  fn report_evidence(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReportEvidenceSnapshot>, Self::Error>> + Send + '_;

  /// Flip the archived flag. Content is untouched.
  fn set_archived(
    &self,
    report_id: Uuid,
    archived: bool,
  ) -> impl Future<Output = Result<ReportInstance, Self::Error>> + Send + '_;

  /// Record that a backup of the rendered artifact has been downloaded.
  fn mark_backup_downloaded(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<ReportInstance, Self::Error>> + Send + '_;
}
