//! Bridge from persisted report rows to the in-memory document model.

use docket_core::{
  document::{
    Block, Document, DocumentBuilder, DocumentMetadata, DocumentStatus,
    EvidenceEntry, Section,
  },
  project::Project,
  report::{ReportEvidenceSnapshot, ReportInstance},
};

/// Citation code for an evidence number, e.g. `E-007`.
pub fn evidence_code(number: i64) -> String { format!("E-{number:03}") }

/// Assemble the logical document for a generated report.
///
/// Narrative sections come from the frozen content snapshot (empty fields
/// are skipped), the evidence registry from the report's snapshot rows, and
/// the economy ledger from the snapshot. `responsible` is the party signing
/// off on the document; the builder rejects an empty value.
pub fn compose_report_document(
  project: &Project,
  report: &ReportInstance,
  evidence: &[ReportEvidenceSnapshot],
  responsible: &str,
) -> docket_core::Result<Document> {
  let metadata = DocumentMetadata {
    document_type: "Damage documentation report".into(),
    case_number:   project.name.clone(),
    reference:     Some(project.project_id.hyphenated().to_string()),
    responsible:   responsible.into(),
    parties:       Vec::new(),
    status:        DocumentStatus::Final,
    created_at:    report.created_at,
    version:       report.version_number,
  };

  let snapshot = &report.content_snapshot;
  let narrative = [
    ("summary", "Summary", &snapshot.summary),
    ("background", "Background", &snapshot.background),
    ("legal_analysis", "Legal analysis", &snapshot.legal_analysis),
    (
      "technical_analysis",
      "Technical assessment",
      &snapshot.technical_analysis,
    ),
    ("conclusion", "Conclusion", &snapshot.conclusion),
  ];

  let mut builder = DocumentBuilder::new(metadata);
  for (id, title, text) in narrative {
    if text.trim().is_empty() {
      continue;
    }
    builder = builder.add_section(Section {
      id:     id.into(),
      title:  title.into(),
      blocks: vec![Block::Paragraph(text.clone())],
    });
  }

  for item in evidence {
    builder = builder.add_evidence(EvidenceEntry {
      code:        evidence_code(item.evidence_number),
      title:       item.title.clone(),
      description: item.description.clone(),
      category:    "exhibit".into(),
      date:        Some(item.included_at.date_naive()),
      source:      item.file_ref.clone(),
    });
  }

  for line in &snapshot.economy {
    builder = builder.add_economy_line(line.clone());
  }

  builder.build()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use docket_core::{draft::DraftContent, report::ReportInstance};
  use uuid::Uuid;

  use super::*;

  fn project() -> Project {
    Project {
      project_id: Uuid::new_v4(),
      name:       "Storgata 12, Flat 4B".into(),
      created_at: Utc::now(),
      legal_lock_activated_at: Some(Utc::now()),
    }
  }

  fn report(project: &Project) -> ReportInstance {
    ReportInstance {
      report_id:            Uuid::new_v4(),
      project_id:           project.project_id,
      version_number:       2,
      total_evidence_count: 1,
      content_snapshot:     DraftContent {
        summary: "Water damage in the kitchen.".into(),
        ..Default::default()
      },
      created_at:           Utc::now(),
      archived:             false,
      backup_downloaded:    false,
    }
  }

  fn snapshot(report: &ReportInstance, number: i64) -> ReportEvidenceSnapshot {
    ReportEvidenceSnapshot {
      snapshot_id:     Uuid::new_v4(),
      report_id:       report.report_id,
      evidence_id:     Uuid::new_v4(),
      evidence_number: number,
      title:           format!("Photo {number}"),
      description:     "Close-up of the damage.".into(),
      file_ref:        format!("objects/{number}"),
      included_at:     report.created_at,
    }
  }

  #[test]
  fn empty_narrative_fields_are_skipped() {
    let p = project();
    let r = report(&p);
    let doc = compose_report_document(&p, &r, &[snapshot(&r, 1)], "Inspector")
      .unwrap();

    // Only the summary is non-empty in the fixture.
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].id, "summary");
    assert_eq!(doc.metadata.version, 2);
  }

  #[test]
  fn evidence_codes_are_zero_padded() {
    let p = project();
    let r = report(&p);
    let doc = compose_report_document(
      &p,
      &r,
      &[snapshot(&r, 7), snapshot(&r, 112)],
      "Inspector",
    )
    .unwrap();

    let codes: Vec<&str> =
      doc.evidence.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["E-007", "E-112"]);
  }

  #[test]
  fn empty_responsible_is_rejected() {
    let p = project();
    let r = report(&p);
    let err =
      compose_report_document(&p, &r, &[snapshot(&r, 1)], "").unwrap_err();
    assert!(matches!(err, docket_core::Error::InvalidDocument(_)));
  }
}
