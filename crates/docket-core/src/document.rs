//! The in-memory report document model.
//!
//! Built once per render request and discarded afterwards; nothing here is
//! persisted. Structural validation happens at [`DocumentBuilder::build`]
//! time so the builder stays cheap to use incrementally.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Publication status of the document being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
  Draft,
  Final,
}

/// The role a party plays in the documented case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
  Claimant,
  Respondent,
  Witness,
  Expert,
  Custom(String),
}

/// An involved party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
  pub name: String,
  pub role: PartyRole,
}

/// Front-matter fields of a rendered report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
  /// Human-readable document type, e.g. "Damage documentation report".
  pub document_type: String,
  pub case_number:   String,
  /// External reference (claim id, policy number), if any.
  pub reference:     Option<String>,
  /// Party responsible for the document's content.
  pub responsible:   String,
  pub parties:       Vec<Party>,
  pub status:        DocumentStatus,
  pub created_at:    DateTime<Utc>,
  /// Version of the underlying report instance.
  pub version:       i64,
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// A typed content block inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Block {
  Paragraph(String),
  List(Vec<String>),
}

/// An ordered, titled run of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
  pub id:     String,
  pub title:  String,
  pub blocks: Vec<Block>,
}

/// One entry in the document's evidence registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
  /// Citation code, e.g. "E-007".
  pub code:        String,
  pub title:       String,
  pub description: String,
  pub category:    String,
  pub date:        Option<NaiveDate>,
  /// Where the underlying material lives (object-storage reference).
  pub source:      String,
}

/// One line of the economic-loss ledger. Amounts are minor units (cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyLine {
  pub description: String,
  pub amount:      i64,
  pub responsible: String,
}

/// A fully-assembled logical document, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub metadata: DocumentMetadata,
  pub sections: Vec<Section>,
  pub evidence: Vec<EvidenceEntry>,
  pub economy:  Vec<EconomyLine>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Fluent accumulator for [`Document`].
///
/// Accepts content in any order and performs no validation until `build()`,
/// where missing required metadata fails with
/// [`Error::InvalidDocument`](crate::Error::InvalidDocument).
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
  metadata: DocumentMetadata,
  sections: Vec<Section>,
  evidence: Vec<EvidenceEntry>,
  economy:  Vec<EconomyLine>,
}

impl DocumentBuilder {
  pub fn new(metadata: DocumentMetadata) -> Self {
    Self {
      metadata,
      sections: Vec::new(),
      evidence: Vec::new(),
      economy: Vec::new(),
    }
  }

  pub fn add_section(mut self, section: Section) -> Self {
    self.sections.push(section);
    self
  }

  pub fn add_evidence(mut self, entry: EvidenceEntry) -> Self {
    self.evidence.push(entry);
    self
  }

  pub fn add_economy_line(mut self, line: EconomyLine) -> Self {
    self.economy.push(line);
    self
  }

  /// Validate structural shape and produce the document.
  pub fn build(self) -> Result<Document> {
    if self.metadata.document_type.trim().is_empty() {
      return Err(Error::InvalidDocument("document_type is empty".into()));
    }
    if self.metadata.case_number.trim().is_empty() {
      return Err(Error::InvalidDocument("case_number is empty".into()));
    }
    if self.metadata.responsible.trim().is_empty() {
      return Err(Error::InvalidDocument("responsible is empty".into()));
    }

    Ok(Document {
      metadata: self.metadata,
      sections: self.sections,
      evidence: self.evidence,
      economy:  self.economy,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn metadata() -> DocumentMetadata {
    DocumentMetadata {
      document_type: "Damage documentation report".into(),
      case_number:   "2026-0142".into(),
      reference:     None,
      responsible:   "A. Inspector".into(),
      parties:       vec![Party {
        name: "B. Tenant".into(),
        role: PartyRole::Respondent,
      }],
      status:        DocumentStatus::Final,
      created_at:    Utc::now(),
      version:       1,
    }
  }

  #[test]
  fn build_preserves_insertion_order() {
    let doc = DocumentBuilder::new(metadata())
      .add_section(Section {
        id:     "summary".into(),
        title:  "Summary".into(),
        blocks: vec![Block::Paragraph("First.".into())],
      })
      .add_section(Section {
        id:     "conclusion".into(),
        title:  "Conclusion".into(),
        blocks: vec![Block::List(vec!["a".into(), "b".into()])],
      })
      .add_evidence(EvidenceEntry {
        code:        "E-001".into(),
        title:       "Hallway".into(),
        description: String::new(),
        category:    "exhibit".into(),
        date:        None,
        source:      "objects/1".into(),
      })
      .add_economy_line(EconomyLine {
        description: "Repainting".into(),
        amount:      120_000,
        responsible: "B. Tenant".into(),
      })
      .build()
      .unwrap();

    assert_eq!(doc.sections[0].id, "summary");
    assert_eq!(doc.sections[1].id, "conclusion");
    assert_eq!(doc.evidence[0].code, "E-001");
    assert_eq!(doc.economy[0].amount, 120_000);
  }

  #[test]
  fn build_rejects_empty_document_type() {
    let mut m = metadata();
    m.document_type = "  ".into();
    let err = DocumentBuilder::new(m).build().unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
  }

  #[test]
  fn build_rejects_empty_case_number() {
    let mut m = metadata();
    m.case_number = String::new();
    let err = DocumentBuilder::new(m).build().unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
  }

  #[test]
  fn build_rejects_empty_responsible() {
    let mut m = metadata();
    m.responsible = String::new();
    let err = DocumentBuilder::new(m).build().unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
  }

  #[test]
  fn block_serde_tags_are_stable() {
    let block = Block::Paragraph("text".into());
    let json = serde_json::to_value(&block).unwrap();
    assert_eq!(json["type"], "paragraph");
    assert_eq!(json["data"], "text");
  }
}
