//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use docket_core::{
  document::EconomyLine,
  draft::DraftContent,
  evidence::{NewEvidence, SourceEntry},
  store::CaseStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn photo(project_id: Uuid, title: &str) -> NewEvidence {
  NewEvidence {
    project_id,
    title: title.into(),
    description: format!("{title} — annotated"),
    file_ref: format!("objects/{title}"),
    include_in_report: true,
  }
}

fn draft(summary: &str) -> DraftContent {
  DraftContent {
    summary: summary.into(),
    conclusion: "Tenant liable for repair costs.".into(),
    economy: vec![EconomyLine {
      description: "Repainting hallway".into(),
      amount:      150_000,
      responsible: "Tenant".into(),
    }],
    ..Default::default()
  }
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_project() {
  let s = store().await;

  let project = s.create_project("Flat 4B".into()).await.unwrap();
  assert!(!project.legal_lock_activated());

  let fetched = s.get_project(project.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.project_id, project.project_id);
  assert_eq!(fetched.name, "Flat 4B");
  assert!(fetched.legal_lock_activated_at.is_none());
}

#[tokio::test]
async fn get_project_missing_returns_none() {
  let s = store().await;
  let result = s.get_project(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

// ─── Evidence numbering ──────────────────────────────────────────────────────

#[tokio::test]
async fn evidence_numbers_are_monotonic_from_one() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  for expected in 1..=3i64 {
    let item = s
      .create_evidence(photo(project.project_id, &format!("p{expected}")))
      .await
      .unwrap();
    assert_eq!(item.evidence_number, expected);
  }
}

#[tokio::test]
async fn sequence_row_tracks_both_counters() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  // Lazily created: absent until the first allocation.
  assert!(s.get_sequence(project.project_id).await.unwrap().is_none());

  for title in ["a", "b", "c"] {
    s.create_evidence(photo(project.project_id, title)).await.unwrap();
  }
  s.generate_report(project.project_id).await.unwrap();

  let seq = s.get_sequence(project.project_id).await.unwrap().unwrap();
  assert_eq!(seq.last_evidence_number, 3);
  assert_eq!(seq.last_report_version, 1);
}

#[tokio::test]
async fn create_evidence_unknown_project_errors() {
  let s = store().await;
  let err = s
    .create_evidence(photo(Uuid::new_v4(), "orphan"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProjectNotFound(_)));
}

#[tokio::test]
async fn concurrent_creations_yield_distinct_numbers() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  let mut handles = Vec::new();
  for i in 0..8 {
    let s = s.clone();
    let pid = project.project_id;
    handles.push(tokio::spawn(async move {
      s.create_evidence(photo(pid, &format!("photo {i}")))
        .await
        .unwrap()
        .evidence_number
    }));
  }

  let mut numbers: Vec<i64> = Vec::new();
  for handle in handles {
    numbers.push(handle.await.unwrap());
  }
  numbers.sort_unstable();
  assert_eq!(numbers, (1..=8).collect::<Vec<i64>>());
}

#[tokio::test]
async fn soft_deleted_numbers_leave_gaps() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  s.create_evidence(photo(project.project_id, "one")).await.unwrap();
  let two = s.create_evidence(photo(project.project_id, "two")).await.unwrap();
  s.soft_delete_evidence(two.evidence_id).await.unwrap();

  // The number is never freed: the next allocation continues past it.
  let three = s.create_evidence(photo(project.project_id, "three")).await.unwrap();
  assert_eq!(three.evidence_number, 3);

  let active = s.list_evidence(project.project_id, true).await.unwrap();
  let numbers: Vec<i64> = active.iter().map(|e| e.evidence_number).collect();
  assert_eq!(numbers, vec![1, 3]);
}

// ─── Evidence mutation ───────────────────────────────────────────────────────

#[tokio::test]
async fn annotate_updates_title_and_description() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  let item = s.create_evidence(photo(project.project_id, "raw")).await.unwrap();

  let updated = s
    .annotate_evidence(
      item.evidence_id,
      "Kitchen ceiling".into(),
      "Stain above the window, approx 40cm.".into(),
    )
    .await
    .unwrap();

  assert_eq!(updated.title, "Kitchen ceiling");
  assert_eq!(updated.description, "Stain above the window, approx 40cm.");
  assert_eq!(updated.evidence_number, item.evidence_number);
}

#[tokio::test]
async fn set_inclusion_toggles_flag() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  let item = s.create_evidence(photo(project.project_id, "p")).await.unwrap();
  assert!(item.include_in_report);

  let off = s.set_inclusion(item.evidence_id, false).await.unwrap();
  assert!(!off.include_in_report);
  let on = s.set_inclusion(item.evidence_id, true).await.unwrap();
  assert!(on.include_in_report);
}

#[tokio::test]
async fn soft_delete_is_idempotent() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  let item = s.create_evidence(photo(project.project_id, "p")).await.unwrap();

  let first = s.soft_delete_evidence(item.evidence_id).await.unwrap();
  let marker = first.deleted_at.unwrap();
  let second = s.soft_delete_evidence(item.evidence_id).await.unwrap();
  assert_eq!(second.deleted_at.unwrap(), marker);
}

#[tokio::test]
async fn mutation_on_unknown_evidence_errors() {
  let s = store().await;
  let err = s.set_inclusion(Uuid::new_v4(), true).await.unwrap_err();
  assert!(matches!(err, Error::EvidenceNotFound(_)));
}

// ─── Backfill ────────────────────────────────────────────────────────────────

fn feed_entry(minutes_ago: i64, content: &str) -> SourceEntry {
  SourceEntry {
    entry_id:   Uuid::new_v4(),
    created_at: Utc::now() - Duration::minutes(minutes_ago),
    content:    content.into(),
    file_ref:   format!("objects/{minutes_ago}"),
    include_in_report_default: true,
  }
}

#[tokio::test]
async fn backfill_numbers_follow_source_chronology() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  // Deliberately out of order: newest first.
  let newest = feed_entry(1, "newest");
  let oldest = feed_entry(30, "oldest");
  let middle = feed_entry(10, "middle");

  let created = s
    .backfill_from_source(project.project_id, vec![
      newest.clone(),
      oldest.clone(),
      middle.clone(),
    ])
    .await
    .unwrap();

  assert_eq!(created.len(), 3);
  let by_number: Vec<&str> =
    created.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(by_number, vec!["oldest", "middle", "newest"]);
  assert_eq!(
    created.iter().map(|e| e.evidence_number).collect::<Vec<_>>(),
    vec![1, 2, 3]
  );
}

#[tokio::test]
async fn backfill_twice_creates_no_duplicates() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  let feed = vec![feed_entry(20, "a"), feed_entry(10, "b")];

  let first = s
    .backfill_from_source(project.project_id, feed.clone())
    .await
    .unwrap();
  assert_eq!(first.len(), 2);

  let second = s
    .backfill_from_source(project.project_id, feed)
    .await
    .unwrap();
  assert!(second.is_empty());

  let all = s.list_evidence(project.project_id, false).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn backfill_continues_numbering_after_manual_creation() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  s.create_evidence(photo(project.project_id, "manual")).await.unwrap();

  let created = s
    .backfill_from_source(project.project_id, vec![feed_entry(5, "fed")])
    .await
    .unwrap();
  assert_eq!(created[0].evidence_number, 2);
}

// ─── Report generation ───────────────────────────────────────────────────────

#[tokio::test]
async fn generate_assigns_sequential_versions() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p1")).await.unwrap();

  let v1 = s.generate_report(project.project_id).await.unwrap();
  let v2 = s.generate_report(project.project_id).await.unwrap();

  assert_eq!(v1.version_number, 1);
  assert_eq!(v2.version_number, 2);
  assert_ne!(v1.report_id, v2.report_id);
}

#[tokio::test]
async fn generate_missing_project_errors() {
  let s = store().await;
  let err = s.generate_report(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::ProjectNotFound(_)));
}

#[tokio::test]
async fn generate_with_no_selection_errors_and_burns_no_version() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  let item = s.create_evidence(photo(project.project_id, "p")).await.unwrap();
  s.set_inclusion(item.evidence_id, false).await.unwrap();

  let err = s.generate_report(project.project_id).await.unwrap_err();
  assert!(matches!(err, Error::NoEvidenceSelected(_)));

  // The failed attempt must not have consumed a version number.
  let seq = s.get_sequence(project.project_id).await.unwrap().unwrap();
  assert_eq!(seq.last_report_version, 0);

  s.set_inclusion(item.evidence_id, true).await.unwrap();
  let generated = s.generate_report(project.project_id).await.unwrap();
  assert_eq!(generated.version_number, 1);
}

#[tokio::test]
async fn generate_locks_included_evidence() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  let item = s.create_evidence(photo(project.project_id, "p")).await.unwrap();
  assert!(!item.lock.is_locked());

  s.generate_report(project.project_id).await.unwrap();

  let locked = s.get_evidence(item.evidence_id).await.unwrap().unwrap();
  assert!(locked.lock.is_locked());

  let err = s.set_inclusion(item.evidence_id, false).await.unwrap_err();
  assert!(matches!(err, Error::EvidenceLocked(_)));
  let err = s
    .annotate_evidence(item.evidence_id, "x".into(), "y".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EvidenceLocked(_)));
  let err = s.soft_delete_evidence(item.evidence_id).await.unwrap_err();
  assert!(matches!(err, Error::EvidenceLocked(_)));
}

#[tokio::test]
async fn excluded_evidence_stays_unlocked() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "in")).await.unwrap();
  let out = s.create_evidence(photo(project.project_id, "out")).await.unwrap();
  s.set_inclusion(out.evidence_id, false).await.unwrap();

  s.generate_report(project.project_id).await.unwrap();

  let untouched = s.get_evidence(out.evidence_id).await.unwrap().unwrap();
  assert!(!untouched.lock.is_locked());
}

#[tokio::test]
async fn generate_scenario_mixed_inclusion() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();

  // #1 included, #2 not included, #3 soft-deleted while still included.
  let one = s.create_evidence(photo(project.project_id, "one")).await.unwrap();
  let two = s.create_evidence(photo(project.project_id, "two")).await.unwrap();
  let three = s.create_evidence(photo(project.project_id, "three")).await.unwrap();
  s.set_inclusion(two.evidence_id, false).await.unwrap();
  s.soft_delete_evidence(three.evidence_id).await.unwrap();

  let generated = s.generate_report(project.project_id).await.unwrap();
  assert_eq!(generated.evidence_count, 1);

  let report = s.get_report(generated.report_id).await.unwrap().unwrap();
  assert_eq!(report.total_evidence_count, 1);

  let snapshots = s.report_evidence(generated.report_id).await.unwrap();
  assert_eq!(snapshots.len(), 1);
  assert_eq!(snapshots[0].evidence_id, one.evidence_id);
  assert_eq!(snapshots[0].evidence_number, 1);
}

#[tokio::test]
async fn snapshot_is_decoupled_from_live_draft() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p")).await.unwrap();

  s.put_draft(project.project_id, draft("Original wording"))
    .await
    .unwrap();
  let v1 = s.generate_report(project.project_id).await.unwrap();

  // Editing the draft after generation must not leak into the snapshot.
  s.put_draft(project.project_id, draft("Amended wording"))
    .await
    .unwrap();

  let frozen = s.get_report(v1.report_id).await.unwrap().unwrap();
  assert_eq!(frozen.content_snapshot.summary, "Original wording");
  assert_eq!(frozen.content_snapshot.economy.len(), 1);

  // A second generation captures the new wording without touching v1.
  let v2 = s.generate_report(project.project_id).await.unwrap();
  let latest = s.get_report(v2.report_id).await.unwrap().unwrap();
  assert_eq!(latest.content_snapshot.summary, "Amended wording");

  let still_frozen = s.get_report(v1.report_id).await.unwrap().unwrap();
  assert_eq!(still_frozen.content_snapshot.summary, "Original wording");
}

#[tokio::test]
async fn generate_without_draft_snapshots_empty_content() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p")).await.unwrap();

  let generated = s.generate_report(project.project_id).await.unwrap();
  let report = s.get_report(generated.report_id).await.unwrap().unwrap();
  assert_eq!(report.content_snapshot, DraftContent::default());
}

#[tokio::test]
async fn legal_lock_activates_once() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p")).await.unwrap();

  s.generate_report(project.project_id).await.unwrap();
  let after_first = s.get_project(project.project_id).await.unwrap().unwrap();
  let activated_at = after_first.legal_lock_activated_at.unwrap();

  s.generate_report(project.project_id).await.unwrap();
  let after_second = s.get_project(project.project_id).await.unwrap().unwrap();
  assert_eq!(after_second.legal_lock_activated_at.unwrap(), activated_at);
}

// ─── Report reads & bookkeeping ──────────────────────────────────────────────

#[tokio::test]
async fn list_reports_newest_first() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p")).await.unwrap();

  s.generate_report(project.project_id).await.unwrap();
  s.generate_report(project.project_id).await.unwrap();

  let reports = s.list_reports(project.project_id).await.unwrap();
  let versions: Vec<i64> =
    reports.iter().map(|r| r.version_number).collect();
  assert_eq!(versions, vec![2, 1]);
}

#[tokio::test]
async fn report_evidence_ordered_by_number() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  for title in ["a", "b", "c"] {
    s.create_evidence(photo(project.project_id, title)).await.unwrap();
  }

  let generated = s.generate_report(project.project_id).await.unwrap();
  let snapshots = s.report_evidence(generated.report_id).await.unwrap();
  let numbers: Vec<i64> =
    snapshots.iter().map(|sn| sn.evidence_number).collect();
  assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn bookkeeping_flags_do_not_alter_content() {
  let s = store().await;
  let project = s.create_project("Flat 4B".into()).await.unwrap();
  s.create_evidence(photo(project.project_id, "p")).await.unwrap();
  s.put_draft(project.project_id, draft("Fixed wording")).await.unwrap();

  let generated = s.generate_report(project.project_id).await.unwrap();

  let archived = s.set_archived(generated.report_id, true).await.unwrap();
  assert!(archived.archived);
  let backed_up = s.mark_backup_downloaded(generated.report_id).await.unwrap();
  assert!(backed_up.backup_downloaded);
  assert!(backed_up.archived);

  assert_eq!(backed_up.content_snapshot.summary, "Fixed wording");
  assert_eq!(backed_up.total_evidence_count, 1);
  assert_eq!(backed_up.version_number, generated.version_number);
}

#[tokio::test]
async fn bookkeeping_on_unknown_report_errors() {
  let s = store().await;
  let err = s.set_archived(Uuid::new_v4(), true).await.unwrap_err();
  assert!(matches!(err, Error::ReportNotFound(_)));
}

// ─── Error taxonomy ──────────────────────────────────────────────────────────

#[test]
fn only_conflicts_are_retryable() {
  assert!(Error::Conflict.is_retryable());
  assert!(!Error::ProjectNotFound(Uuid::nil()).is_retryable());
  assert!(!Error::EvidenceLocked(Uuid::nil()).is_retryable());
}
