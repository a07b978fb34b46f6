//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use docket_core::{
  draft::{DraftContent, ReportDraft},
  evidence::{EvidenceItem, LockState, NewEvidence, SourceEntry},
  project::{Project, ProjectSequence},
  report::{GeneratedReport, ReportEvidenceSnapshot, ReportInstance},
  store::CaseStore,
};

use crate::{
  Error, Result,
  encode::{
    RawDraft, RawEvidence, RawProject, RawReport, RawSnapshot, decode_uuid,
    encode_draft_content, encode_dt, encode_uuid,
  },
  error::lift,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Docket case store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// funnels through one connection worker, so statements from concurrent
/// callers serialize; multi-step writes additionally run inside their own
/// SQL transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Domain outcomes ─────────────────────────────────────────────────────────
//
// Domain-level results travel out of `conn.call` closures through these
// enums; returning early without committing rolls the transaction back.

enum EvidenceMutation {
  Missing,
  Locked,
  Updated(RawEvidence),
}

enum GenerateOutcome {
  MissingProject,
  NoEvidence,
  Generated { version: i64, count: i64 },
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn create_project(&self, name: String) -> Result<Project> {
    let project = Project {
      project_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
      legal_lock_activated_at: None,
    };

    let id_str   = encode_uuid(project.project_id);
    let at_str   = encode_dt(project.created_at);
    let name_str = project.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (project_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(lift)?;

    Ok(project)
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT project_id, name, created_at, legal_lock_activated_at
               FROM projects WHERE project_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProject {
                  project_id: row.get(0)?,
                  name:       row.get(1)?,
                  created_at: row.get(2)?,
                  legal_lock_activated_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn get_sequence(
    &self,
    project_id: Uuid,
  ) -> Result<Option<ProjectSequence>> {
    let pid_str = encode_uuid(project_id);

    let row: Option<(String, i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT project_id, last_evidence_number, last_report_version
               FROM project_sequences WHERE project_id = ?1",
              rusqlite::params![pid_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    row
      .map(|(id, last_evidence_number, last_report_version)| {
        Ok(ProjectSequence {
          project_id: decode_uuid(&id)?,
          last_evidence_number,
          last_report_version,
        })
      })
      .transpose()
  }

  // ── Evidence lifecycle ────────────────────────────────────────────────────

  async fn create_evidence(&self, input: NewEvidence) -> Result<EvidenceItem> {
    let evidence_id = Uuid::new_v4();
    let created_at  = Utc::now();

    let id_str    = encode_uuid(evidence_id);
    let pid_str   = encode_uuid(input.project_id);
    let at_str    = encode_dt(created_at);
    let title     = input.title.clone();
    let desc      = input.description.clone();
    let file_ref  = input.file_ref.clone();
    let include   = input.include_in_report;

    let number: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !project_exists(&tx, &pid_str)? {
          return Ok(None);
        }

        let number = next_evidence_number(&tx, &pid_str)?;
        tx.execute(
          "INSERT INTO evidence_items (
             evidence_id, project_id, evidence_number, title, description,
             file_ref, include_in_report, locked, source_entry_id,
             created_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8, NULL)",
          rusqlite::params![
            id_str, pid_str, number, title, desc, file_ref, include, at_str,
          ],
        )?;
        tx.commit()?;
        Ok(Some(number))
      })
      .await
      .map_err(lift)?;

    let evidence_number =
      number.ok_or(Error::ProjectNotFound(input.project_id))?;

    Ok(EvidenceItem {
      evidence_id,
      project_id: input.project_id,
      evidence_number,
      title: input.title,
      description: input.description,
      file_ref: input.file_ref,
      include_in_report: input.include_in_report,
      lock: LockState::Unlocked,
      source_entry_id: None,
      created_at,
      deleted_at: None,
    })
  }

  async fn backfill_from_source(
    &self,
    project_id: Uuid,
    mut entries: Vec<SourceEntry>,
  ) -> Result<Vec<EvidenceItem>> {
    // Numbers must increase in the order the source material was produced.
    entries.sort_by(|a, b| {
      a.created_at
        .cmp(&b.created_at)
        .then(a.entry_id.cmp(&b.entry_id))
    });

    let pid_str    = encode_uuid(project_id);
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);

    let created: Option<Vec<EvidenceItem>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !project_exists(&tx, &pid_str)? {
          return Ok(None);
        }

        let mut items = Vec::new();
        for entry in entries {
          let entry_str = encode_uuid(entry.entry_id);
          let mapped: bool = tx
            .query_row(
              "SELECT 1 FROM evidence_items
               WHERE project_id = ?1 AND source_entry_id = ?2",
              rusqlite::params![pid_str, entry_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if mapped {
            continue;
          }

          let evidence_id = Uuid::new_v4();
          let number = next_evidence_number(&tx, &pid_str)?;
          let title = entry.derived_title();

          tx.execute(
            "INSERT INTO evidence_items (
               evidence_id, project_id, evidence_number, title, description,
               file_ref, include_in_report, locked, source_entry_id,
               created_at, deleted_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, NULL)",
            rusqlite::params![
              encode_uuid(evidence_id),
              pid_str,
              number,
              title,
              entry.content,
              entry.file_ref,
              entry.include_in_report_default,
              entry_str,
              at_str,
            ],
          )?;

          items.push(EvidenceItem {
            evidence_id,
            project_id,
            evidence_number: number,
            title,
            description: entry.content,
            file_ref: entry.file_ref,
            include_in_report: entry.include_in_report_default,
            lock: LockState::Unlocked,
            source_entry_id: Some(entry.entry_id),
            created_at,
            deleted_at: None,
          });
        }
        tx.commit()?;
        Ok(Some(items))
      })
      .await
      .map_err(lift)?;

    created.ok_or(Error::ProjectNotFound(project_id))
  }

  async fn annotate_evidence(
    &self,
    evidence_id: Uuid,
    title: String,
    description: String,
  ) -> Result<EvidenceItem> {
    let id_str = encode_uuid(evidence_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        if raw.locked {
          return Ok(EvidenceMutation::Locked);
        }

        tx.execute(
          "UPDATE evidence_items SET title = ?2, description = ?3
           WHERE evidence_id = ?1",
          rusqlite::params![id_str, title, description],
        )?;
        let Some(updated) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        tx.commit()?;
        Ok(EvidenceMutation::Updated(updated))
      })
      .await
      .map_err(lift)?;

    resolve_mutation(outcome, evidence_id)
  }

  async fn set_inclusion(
    &self,
    evidence_id: Uuid,
    include: bool,
  ) -> Result<EvidenceItem> {
    let id_str = encode_uuid(evidence_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        if raw.locked {
          return Ok(EvidenceMutation::Locked);
        }

        tx.execute(
          "UPDATE evidence_items SET include_in_report = ?2
           WHERE evidence_id = ?1",
          rusqlite::params![id_str, include],
        )?;
        let Some(updated) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        tx.commit()?;
        Ok(EvidenceMutation::Updated(updated))
      })
      .await
      .map_err(lift)?;

    resolve_mutation(outcome, evidence_id)
  }

  async fn soft_delete_evidence(
    &self,
    evidence_id: Uuid,
  ) -> Result<EvidenceItem> {
    let id_str = encode_uuid(evidence_id);
    let at_str = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        if raw.locked {
          return Ok(EvidenceMutation::Locked);
        }

        // Idempotent: an earlier delete timestamp is preserved.
        tx.execute(
          "UPDATE evidence_items
           SET deleted_at = COALESCE(deleted_at, ?2)
           WHERE evidence_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        let Some(updated) = evidence_row(&tx, &id_str)? else {
          return Ok(EvidenceMutation::Missing);
        };
        tx.commit()?;
        Ok(EvidenceMutation::Updated(updated))
      })
      .await
      .map_err(lift)?;

    resolve_mutation(outcome, evidence_id)
  }

  async fn get_evidence(&self, evidence_id: Uuid) -> Result<Option<EvidenceItem>> {
    let id_str = encode_uuid(evidence_id);

    let raw: Option<RawEvidence> = self
      .conn
      .call(move |conn| evidence_row(conn, &id_str).map_err(Into::into))
      .await
      .map_err(lift)?;

    raw.map(RawEvidence::into_evidence).transpose()
  }

  async fn list_evidence(
    &self,
    project_id: Uuid,
    active_only: bool,
  ) -> Result<Vec<EvidenceItem>> {
    let pid_str = encode_uuid(project_id);

    let raws: Vec<RawEvidence> = self
      .conn
      .call(move |conn| {
        let sql = if active_only {
          "SELECT evidence_id, project_id, evidence_number, title, description,
                  file_ref, include_in_report, locked, source_entry_id,
                  created_at, deleted_at
           FROM evidence_items
           WHERE project_id = ?1 AND deleted_at IS NULL
           ORDER BY evidence_number ASC"
        } else {
          "SELECT evidence_id, project_id, evidence_number, title, description,
                  file_ref, include_in_report, locked, source_entry_id,
                  created_at, deleted_at
           FROM evidence_items
           WHERE project_id = ?1
           ORDER BY evidence_number ASC"
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![pid_str], map_evidence_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawEvidence::into_evidence).collect()
  }

  // ── Draft ─────────────────────────────────────────────────────────────────

  async fn get_draft(&self, project_id: Uuid) -> Result<Option<ReportDraft>> {
    let pid_str = encode_uuid(project_id);

    let raw: Option<RawDraft> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT project_id, content, updated_at
               FROM report_drafts WHERE project_id = ?1",
              rusqlite::params![pid_str],
              |row| {
                Ok(RawDraft {
                  project_id: row.get(0)?,
                  content:    row.get(1)?,
                  updated_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(lift)?;

    raw.map(RawDraft::into_draft).transpose()
  }

  async fn put_draft(
    &self,
    project_id: Uuid,
    content: DraftContent,
  ) -> Result<ReportDraft> {
    let updated_at = Utc::now();

    let pid_str     = encode_uuid(project_id);
    let content_str = encode_draft_content(&content)?;
    let at_str      = encode_dt(updated_at);

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !project_exists(&tx, &pid_str)? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO report_drafts (project_id, content, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(project_id)
           DO UPDATE SET content = ?2, updated_at = ?3",
          rusqlite::params![pid_str, content_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(lift)?;

    if !found {
      return Err(Error::ProjectNotFound(project_id));
    }

    Ok(ReportDraft { project_id, content, updated_at })
  }

  // ── Report generation ─────────────────────────────────────────────────────

  async fn generate_report(&self, project_id: Uuid) -> Result<GeneratedReport> {
    let report_id  = Uuid::new_v4();
    let created_at = Utc::now();

    let pid_str    = encode_uuid(project_id);
    let rid_str    = encode_uuid(report_id);
    let at_str     = encode_dt(created_at);
    let empty_json = encode_draft_content(&DraftContent::default())?;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // 1. The project must exist; fetch its legal-lock marker.
        let lock_at: Option<Option<String>> = tx
          .query_row(
            "SELECT legal_lock_activated_at FROM projects WHERE project_id = ?1",
            rusqlite::params![pid_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(lock_at) = lock_at else {
          return Ok(GenerateOutcome::MissingProject);
        };

        // 2–3. Select the active, included evidence in citation order.
        let selected: Vec<(String, i64, String, String, String)> = {
          let mut stmt = tx.prepare(
            "SELECT evidence_id, evidence_number, title, description, file_ref
             FROM evidence_items
             WHERE project_id = ?1
               AND deleted_at IS NULL
               AND include_in_report = 1
             ORDER BY evidence_number ASC",
          )?;
          stmt
            .query_map(rusqlite::params![pid_str], |row| {
              Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
              ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        // A report with zero evidence is not a valid legal artifact.
        // Returning here rolls back; no version number is burned.
        if selected.is_empty() {
          return Ok(GenerateOutcome::NoEvidence);
        }

        // 4. Allocate the version inside this same transaction.
        let version = next_report_version(&tx, &pid_str)?;

        // 5. Freeze the draft. Absence reads as an empty draft.
        let snapshot: String = tx
          .query_row(
            "SELECT content FROM report_drafts WHERE project_id = ?1",
            rusqlite::params![pid_str],
            |row| row.get(0),
          )
          .optional()?
          .unwrap_or(empty_json);

        // 6. The immutable report instance.
        let count = selected.len() as i64;
        tx.execute(
          "INSERT INTO report_instances (
             report_id, project_id, version_number, total_evidence_count,
             content_snapshot, created_at, archived, backup_downloaded
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0)",
          rusqlite::params![rid_str, pid_str, version, count, snapshot, at_str],
        )?;

        // 7. One snapshot row per selected item, as of this instant.
        for (evidence_id, number, title, description, file_ref) in &selected {
          tx.execute(
            "INSERT INTO report_evidence (
               snapshot_id, report_id, evidence_id, evidence_number,
               title, description, file_ref, included_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              rid_str,
              evidence_id,
              number,
              title,
              description,
              file_ref,
              at_str,
            ],
          )?;
        }

        // 8. First generation activates the project's legal lock.
        if lock_at.is_none() {
          tx.execute(
            "UPDATE projects SET legal_lock_activated_at = ?2
             WHERE project_id = ?1",
            rusqlite::params![pid_str, at_str],
          )?;
        }

        // 9. Lock every published item.
        for (evidence_id, ..) in &selected {
          tx.execute(
            "UPDATE evidence_items SET locked = 1 WHERE evidence_id = ?1",
            rusqlite::params![evidence_id],
          )?;
        }

        // 10. All or nothing.
        tx.commit()?;
        Ok(GenerateOutcome::Generated { version, count })
      })
      .await
      .map_err(lift)?;

    match outcome {
      GenerateOutcome::MissingProject => Err(Error::ProjectNotFound(project_id)),
      GenerateOutcome::NoEvidence => Err(Error::NoEvidenceSelected(project_id)),
      GenerateOutcome::Generated { version, count } => Ok(GeneratedReport {
        report_id,
        version_number: version,
        evidence_count: count,
      }),
    }
  }

  // ── Report reads & bookkeeping ────────────────────────────────────────────

  async fn get_report(&self, report_id: Uuid) -> Result<Option<ReportInstance>> {
    let id_str = encode_uuid(report_id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| report_row(conn, &id_str).map_err(Into::into))
      .await
      .map_err(lift)?;

    raw.map(RawReport::into_report).transpose()
  }

  async fn list_reports(&self, project_id: Uuid) -> Result<Vec<ReportInstance>> {
    let pid_str = encode_uuid(project_id);

    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT report_id, project_id, version_number, total_evidence_count,
                  content_snapshot, created_at, archived, backup_downloaded
           FROM report_instances
           WHERE project_id = ?1
           ORDER BY version_number DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pid_str], map_report_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  async fn report_evidence(
    &self,
    report_id: Uuid,
  ) -> Result<Vec<ReportEvidenceSnapshot>> {
    let rid_str = encode_uuid(report_id);

    let raws: Vec<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT snapshot_id, report_id, evidence_id, evidence_number,
                  title, description, file_ref, included_at
           FROM report_evidence
           WHERE report_id = ?1
           ORDER BY evidence_number ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![rid_str], |row| {
            Ok(RawSnapshot {
              snapshot_id:     row.get(0)?,
              report_id:       row.get(1)?,
              evidence_id:     row.get(2)?,
              evidence_number: row.get(3)?,
              title:           row.get(4)?,
              description:     row.get(5)?,
              file_ref:        row.get(6)?,
              included_at:     row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(lift)?;

    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }

  async fn set_archived(
    &self,
    report_id: Uuid,
    archived: bool,
  ) -> Result<ReportInstance> {
    self
      .update_report_flag(report_id, move |tx, id_str| {
        tx.execute(
          "UPDATE report_instances SET archived = ?2 WHERE report_id = ?1",
          rusqlite::params![id_str, archived],
        )
      })
      .await
  }

  async fn mark_backup_downloaded(
    &self,
    report_id: Uuid,
  ) -> Result<ReportInstance> {
    self
      .update_report_flag(report_id, |tx, id_str| {
        tx.execute(
          "UPDATE report_instances SET backup_downloaded = 1
           WHERE report_id = ?1",
          rusqlite::params![id_str],
        )
      })
      .await
  }
}

// ─── Flag updates ────────────────────────────────────────────────────────────

impl SqliteStore {
  /// Apply a bookkeeping-flag update and return the refreshed row.
  /// Content columns are never touched by callers of this helper.
  async fn update_report_flag<F>(
    &self,
    report_id: Uuid,
    apply: F,
  ) -> Result<ReportInstance>
  where
    F: FnOnce(&rusqlite::Transaction<'_>, &str) -> rusqlite::Result<usize>
      + Send
      + 'static,
  {
    let id_str = encode_uuid(report_id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if report_row(&tx, &id_str)?.is_none() {
          return Ok(None);
        }
        apply(&tx, &id_str)?;
        let updated = report_row(&tx, &id_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await
      .map_err(lift)?;

    raw
      .ok_or(Error::ReportNotFound(report_id))?
      .into_report()
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn map_evidence_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvidence> {
  Ok(RawEvidence {
    evidence_id:       row.get(0)?,
    project_id:        row.get(1)?,
    evidence_number:   row.get(2)?,
    title:             row.get(3)?,
    description:       row.get(4)?,
    file_ref:          row.get(5)?,
    include_in_report: row.get(6)?,
    locked:            row.get(7)?,
    source_entry_id:   row.get(8)?,
    created_at:        row.get(9)?,
    deleted_at:        row.get(10)?,
  })
}

fn map_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReport> {
  Ok(RawReport {
    report_id:            row.get(0)?,
    project_id:           row.get(1)?,
    version_number:       row.get(2)?,
    total_evidence_count: row.get(3)?,
    content_snapshot:     row.get(4)?,
    created_at:           row.get(5)?,
    archived:             row.get(6)?,
    backup_downloaded:    row.get(7)?,
  })
}

fn evidence_row(
  conn: &rusqlite::Connection,
  evidence_id: &str,
) -> rusqlite::Result<Option<RawEvidence>> {
  conn
    .query_row(
      "SELECT evidence_id, project_id, evidence_number, title, description,
              file_ref, include_in_report, locked, source_entry_id,
              created_at, deleted_at
       FROM evidence_items WHERE evidence_id = ?1",
      rusqlite::params![evidence_id],
      map_evidence_row,
    )
    .optional()
}

fn report_row(
  conn: &rusqlite::Connection,
  report_id: &str,
) -> rusqlite::Result<Option<RawReport>> {
  conn
    .query_row(
      "SELECT report_id, project_id, version_number, total_evidence_count,
              content_snapshot, created_at, archived, backup_downloaded
       FROM report_instances WHERE report_id = ?1",
      rusqlite::params![report_id],
      map_report_row,
    )
    .optional()
}

fn project_exists(
  conn: &rusqlite::Connection,
  project_id: &str,
) -> rusqlite::Result<bool> {
  conn
    .query_row(
      "SELECT 1 FROM projects WHERE project_id = ?1",
      rusqlite::params![project_id],
      |_| Ok(true),
    )
    .optional()
    .map(|found| found.unwrap_or(false))
}

// ─── Sequence allocation ─────────────────────────────────────────────────────
//
// Atomic increment-and-read against the per-project counter row, always
// inside the caller's transaction so a rollback also rolls back the counter.
// The all-zero row is upserted on first use.

fn ensure_sequence_row(
  tx: &rusqlite::Transaction<'_>,
  project_id: &str,
) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO project_sequences
       (project_id, last_evidence_number, last_report_version)
     VALUES (?1, 0, 0)
     ON CONFLICT(project_id) DO NOTHING",
    rusqlite::params![project_id],
  )?;
  Ok(())
}

fn next_evidence_number(
  tx: &rusqlite::Transaction<'_>,
  project_id: &str,
) -> rusqlite::Result<i64> {
  ensure_sequence_row(tx, project_id)?;
  tx.execute(
    "UPDATE project_sequences
     SET last_evidence_number = last_evidence_number + 1
     WHERE project_id = ?1",
    rusqlite::params![project_id],
  )?;
  tx.query_row(
    "SELECT last_evidence_number FROM project_sequences WHERE project_id = ?1",
    rusqlite::params![project_id],
    |row| row.get(0),
  )
}

fn next_report_version(
  tx: &rusqlite::Transaction<'_>,
  project_id: &str,
) -> rusqlite::Result<i64> {
  ensure_sequence_row(tx, project_id)?;
  tx.execute(
    "UPDATE project_sequences
     SET last_report_version = last_report_version + 1
     WHERE project_id = ?1",
    rusqlite::params![project_id],
  )?;
  tx.query_row(
    "SELECT last_report_version FROM project_sequences WHERE project_id = ?1",
    rusqlite::params![project_id],
    |row| row.get(0),
  )
}

// ─── Mutation resolution ─────────────────────────────────────────────────────

fn resolve_mutation(
  outcome: EvidenceMutation,
  evidence_id: Uuid,
) -> Result<EvidenceItem> {
  match outcome {
    EvidenceMutation::Missing => Err(Error::EvidenceNotFound(evidence_id)),
    EvidenceMutation::Locked => Err(Error::EvidenceLocked(evidence_id)),
    EvidenceMutation::Updated(raw) => raw.into_evidence(),
  }
}
