//! Line-oriented page layout.
//!
//! Flows document content into pages of styled text lines. Geometry is A4
//! portrait with fixed margins; wrap widths are budgeted in characters
//! against the built-in Helvetica fonts, so rendering needs no font files.

use docket_core::document::{
  Block, Document, DocumentMetadata, DocumentStatus, EconomyLine,
  EvidenceEntry, PartyRole, Section,
};

// ─── Geometry ────────────────────────────────────────────────────────────────

pub(crate) const PAGE_WIDTH: f32 = 595.0;
pub(crate) const PAGE_HEIGHT: f32 = 842.0;
pub(crate) const MARGIN: f32 = 56.0;

const TEXT_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;

const BODY_WRAP: usize = 88;
const HEADING_WRAP: usize = 60;

// ─── Styled lines ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextStyle {
  Title,
  Heading,
  Body,
  Small,
}

impl TextStyle {
  pub(crate) fn font_size(self) -> i64 {
    match self {
      Self::Title => 20,
      Self::Heading => 13,
      Self::Body => 11,
      Self::Small => 9,
    }
  }

  pub(crate) fn leading(self) -> f32 {
    match self {
      Self::Title => 26.0,
      Self::Heading => 22.0,
      Self::Body => 15.0,
      Self::Small => 13.0,
    }
  }

  pub(crate) fn bold(self) -> bool {
    matches!(self, Self::Title | Self::Heading)
  }
}

/// One laid-out line of text. An empty `text` is vertical whitespace.
#[derive(Debug, Clone)]
pub(crate) struct Line {
  pub style: TextStyle,
  pub text:  String,
}

impl Line {
  fn new(style: TextStyle, text: impl Into<String>) -> Self {
    Self { style, text: text.into() }
  }

  fn blank(style: TextStyle) -> Self { Self::new(style, "") }
}

/// One page worth of lines. The sum of leadings never exceeds the text
/// height, so the PDF layer can place lines top-down without clipping.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageText {
  pub lines: Vec<Line>,
}

// ─── Word wrap ───────────────────────────────────────────────────────────────

/// Word-wrap `text` at `width` characters. Embedded newlines are kept as
/// line breaks; blank input lines come through as empty strings. Words
/// longer than a full line are hard-split.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();
  for raw in text.split('\n') {
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in raw.split_whitespace() {
      let mut word = word;
      while word.chars().count() > width {
        if !current.is_empty() {
          lines.push(std::mem::take(&mut current));
          current_len = 0;
        }
        let cut = word
          .char_indices()
          .nth(width)
          .map(|(i, _)| i)
          .unwrap_or(word.len());
        lines.push(word[..cut].to_string());
        word = &word[cut..];
      }
      let word_len = word.chars().count();
      if word_len == 0 {
        continue;
      }
      if current.is_empty() {
        current.push_str(word);
        current_len = word_len;
      } else if current_len + 1 + word_len <= width {
        current.push(' ');
        current.push_str(word);
        current_len += 1 + word_len;
      } else {
        lines.push(std::mem::replace(&mut current, word.to_string()));
        current_len = word_len;
      }
    }
    if !current.is_empty() || raw.trim().is_empty() {
      lines.push(current);
    }
  }
  lines
}

// ─── Page flow ───────────────────────────────────────────────────────────────

/// Accumulates lines into pages, breaking when the next line would overrun
/// the text height.
pub(crate) struct PageFlow {
  pages:   Vec<PageText>,
  current: Vec<Line>,
  used:    f32,
}

impl PageFlow {
  pub(crate) fn new() -> Self {
    Self { pages: Vec::new(), current: Vec::new(), used: 0.0 }
  }

  pub(crate) fn push(&mut self, line: Line) {
    // A spacer carried over a page break would indent the new page's top.
    if line.text.is_empty() && self.current.is_empty() {
      return;
    }
    if self.used + line.style.leading() > TEXT_HEIGHT
      && !self.current.is_empty()
    {
      self.break_page();
      if line.text.is_empty() {
        return;
      }
    }
    self.used += line.style.leading();
    self.current.push(line);
  }

  pub(crate) fn gap(&mut self, style: TextStyle) {
    self.push(Line::blank(style));
  }

  /// Break early so a heading is never orphaned at a page foot.
  fn reserve(&mut self, points: f32) {
    if !self.current.is_empty() && self.used + points > TEXT_HEIGHT {
      self.break_page();
    }
  }

  pub(crate) fn heading(&mut self, text: &str) {
    self
      .reserve(TextStyle::Heading.leading() + 2.0 * TextStyle::Body.leading());
    for wrapped in wrap(text, HEADING_WRAP) {
      self.push(Line::new(TextStyle::Heading, wrapped));
    }
  }

  pub(crate) fn body(&mut self, text: &str) {
    for wrapped in wrap(text, BODY_WRAP) {
      self.push(Line::new(TextStyle::Body, wrapped));
    }
  }

  pub(crate) fn small(&mut self, text: &str) {
    for wrapped in wrap(text, BODY_WRAP) {
      self.push(Line::new(TextStyle::Small, wrapped));
    }
  }

  pub(crate) fn title(&mut self, text: &str) {
    for wrapped in wrap(text, HEADING_WRAP) {
      self.push(Line::new(TextStyle::Title, wrapped));
    }
  }

  pub(crate) fn break_page(&mut self) {
    if !self.current.is_empty() {
      self.pages.push(PageText { lines: std::mem::take(&mut self.current) });
      self.used = 0.0;
    }
  }

  pub(crate) fn finish(mut self) -> Vec<PageText> {
    self.break_page();
    self.pages
  }
}

// ─── Labels & formatting ─────────────────────────────────────────────────────

fn status_label(status: DocumentStatus) -> &'static str {
  match status {
    DocumentStatus::Draft => "draft",
    DocumentStatus::Final => "final",
  }
}

fn role_label(role: &PartyRole) -> String {
  match role {
    PartyRole::Claimant => "claimant".into(),
    PartyRole::Respondent => "respondent".into(),
    PartyRole::Witness => "witness".into(),
    PartyRole::Expert => "expert".into(),
    PartyRole::Custom(s) => s.clone(),
  }
}

/// Format a minor-unit amount as `units.cc`.
pub(crate) fn format_amount(minor: i64) -> String {
  let sign = if minor < 0 { "-" } else { "" };
  let abs = minor.unsigned_abs();
  format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

// ─── Front matter ────────────────────────────────────────────────────────────

pub(crate) fn front_matter_pages(meta: &DocumentMetadata) -> Vec<PageText> {
  let mut flow = PageFlow::new();
  flow.title(&meta.document_type);
  flow.gap(TextStyle::Title);

  flow.body(&format!("Case: {}", meta.case_number));
  if let Some(reference) = &meta.reference {
    flow.body(&format!("Reference: {reference}"));
  }
  flow.body(&format!(
    "Version {} ({})",
    meta.version,
    status_label(meta.status)
  ));
  flow.body(&format!(
    "Created: {}",
    meta.created_at.format("%Y-%m-%d %H:%M UTC")
  ));
  flow.body(&format!("Responsible: {}", meta.responsible));

  if !meta.parties.is_empty() {
    flow.gap(TextStyle::Body);
    flow.heading("Parties");
    for party in &meta.parties {
      flow.body(&format!("- {} ({})", party.name, role_label(&party.role)));
    }
  }

  flow.finish()
}

// ─── Narrative ───────────────────────────────────────────────────────────────

fn section_into(flow: &mut PageFlow, section: &Section) {
  flow.heading(&section.title);
  for block in &section.blocks {
    match block {
      Block::Paragraph(text) => flow.body(text),
      Block::List(items) => {
        for item in items {
          flow.body(&format!("- {item}"));
        }
      }
    }
    flow.gap(TextStyle::Body);
  }
}

fn economy_into(flow: &mut PageFlow, lines: &[EconomyLine]) {
  flow.heading("Economic loss");
  let mut total = 0i64;
  for line in lines {
    total += line.amount;
    flow.body(&format!(
      "- {}: {} ({})",
      line.description,
      format_amount(line.amount),
      line.responsible
    ));
  }
  flow.body(&format!("Total: {}", format_amount(total)));
  flow.gap(TextStyle::Body);
}

fn register_into(flow: &mut PageFlow, evidence: &[EvidenceEntry]) {
  flow.heading("Evidence register");
  for entry in evidence {
    flow.body(&format!("{}  {}", entry.code, entry.title));
  }
  flow.gap(TextStyle::Body);
}

/// The narrative sequence: sections, economy ledger, evidence register.
/// Exhibit pages come separately so the split policy can move them.
pub(crate) fn narrative_pages(document: &Document) -> Vec<PageText> {
  let mut flow = PageFlow::new();
  for section in &document.sections {
    section_into(&mut flow, section);
  }
  if !document.economy.is_empty() {
    economy_into(&mut flow, &document.economy);
  }
  if !document.evidence.is_empty() {
    register_into(&mut flow, &document.evidence);
  }
  flow.finish()
}

// ─── Exhibits ────────────────────────────────────────────────────────────────

/// Pages for one exhibit. Every exhibit starts on its own page so the split
/// policy can move it between files without cutting content.
pub(crate) fn exhibit_pages(entry: &EvidenceEntry) -> Vec<PageText> {
  let mut flow = PageFlow::new();
  flow.heading(&format!("Exhibit {}", entry.code));
  flow.body(&entry.title);
  flow.small(&format!("Category: {}", entry.category));
  if let Some(date) = entry.date {
    flow.small(&format!("Date: {}", date.format("%Y-%m-%d")));
  }
  flow.small(&format!("Source: {}", entry.source));
  if !entry.description.trim().is_empty() {
    flow.gap(TextStyle::Body);
    flow.body(&entry.description);
  }
  flow.finish()
}

// ─── Appendix plumbing ───────────────────────────────────────────────────────

/// What the main file's index says about one appendix file.
#[derive(Debug, Clone)]
pub(crate) struct PartSummary {
  pub name:          String,
  pub first_code:    String,
  pub last_code:     String,
  pub exhibit_count: usize,
}

impl PartSummary {
  fn code_range(&self) -> String {
    if self.exhibit_count == 1 {
      format!("exhibit {}", self.first_code)
    } else {
      format!("exhibits {} to {}", self.first_code, self.last_code)
    }
  }
}

/// Title page for an appendix file, carrying enough front matter that the
/// file can be read standalone.
pub(crate) fn part_title_pages(
  meta: &DocumentMetadata,
  part_number: usize,
  part_count: usize,
  summary: &PartSummary,
) -> Vec<PageText> {
  let mut flow = PageFlow::new();
  flow.title(&meta.document_type);
  flow.gap(TextStyle::Title);
  flow.body(&format!("Case: {}", meta.case_number));
  flow.body(&format!(
    "Version {} ({})",
    meta.version,
    status_label(meta.status)
  ));
  flow.body(&format!("Responsible: {}", meta.responsible));
  flow.gap(TextStyle::Body);
  flow.heading(&format!("Appendix {part_number} of {part_count}"));
  flow.body(&format!("Contains {}.", summary.code_range()));
  flow.finish()
}

/// Index of appendix files, appended to the main file's narrative.
pub(crate) fn appendix_index_pages(parts: &[PartSummary]) -> Vec<PageText> {
  let mut flow = PageFlow::new();
  flow.heading("Appendices");
  for (i, part) in parts.iter().enumerate() {
    flow.body(&format!(
      "Appendix {}: {} ({})",
      i + 1,
      part.code_range(),
      part.name
    ));
  }
  flow.finish()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use docket_core::document::{Block, Party};

  use super::*;

  fn metadata() -> DocumentMetadata {
    DocumentMetadata {
      document_type: "Damage documentation report".into(),
      case_number:   "2026-0142".into(),
      reference:     Some("claim/88".into()),
      responsible:   "A. Inspector".into(),
      parties:       vec![Party {
        name: "B. Tenant".into(),
        role: PartyRole::Respondent,
      }],
      status:        DocumentStatus::Final,
      created_at:    Utc::now(),
      version:       3,
    }
  }

  fn exhibit(code: &str, description: &str) -> EvidenceEntry {
    EvidenceEntry {
      code:        code.into(),
      title:       "Kitchen ceiling".into(),
      description: description.into(),
      category:    "exhibit".into(),
      date:        None,
      source:      "objects/abc".into(),
    }
  }

  #[test]
  fn wrap_respects_width() {
    let text = "alpha beta gamma delta epsilon zeta";
    for line in wrap(text, 12) {
      assert!(line.chars().count() <= 12, "too wide: {line:?}");
    }
  }

  #[test]
  fn wrap_hard_splits_long_words() {
    let lines = wrap(&"x".repeat(25), 10);
    assert_eq!(lines, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
  }

  #[test]
  fn wrap_keeps_blank_lines() {
    let lines = wrap("one\n\ntwo", 20);
    assert_eq!(lines, vec!["one", "", "two"]);
  }

  #[test]
  fn flow_breaks_pages_within_text_height() {
    let mut flow = PageFlow::new();
    for i in 0..200 {
      flow.body(&format!("line {i}"));
    }
    let pages = flow.finish();
    assert!(pages.len() > 1);
    for page in &pages {
      let used: f32 = page.lines.iter().map(|l| l.style.leading()).sum();
      assert!(used <= TEXT_HEIGHT + 0.01);
    }
  }

  #[test]
  fn pages_never_open_with_a_spacer() {
    let mut flow = PageFlow::new();
    for _ in 0..100 {
      flow.body("text");
      flow.gap(TextStyle::Body);
    }
    for page in flow.finish() {
      assert!(!page.lines[0].text.is_empty());
    }
  }

  #[test]
  fn front_matter_names_the_case() {
    let pages = front_matter_pages(&metadata());
    assert_eq!(pages.len(), 1);
    let all: Vec<&str> =
      pages[0].lines.iter().map(|l| l.text.as_str()).collect();
    assert!(all.contains(&"Damage documentation report"));
    assert!(all.contains(&"Case: 2026-0142"));
    assert!(all.contains(&"Version 3 (final)"));
    assert!(all.contains(&"- B. Tenant (respondent)"));
  }

  #[test]
  fn narrative_covers_sections_economy_and_register() {
    let document = Document {
      metadata: metadata(),
      sections: vec![Section {
        id:     "summary".into(),
        title:  "Summary".into(),
        blocks: vec![Block::Paragraph("Water damage.".into())],
      }],
      evidence: vec![exhibit("E-001", "")],
      economy:  vec![EconomyLine {
        description: "Repainting".into(),
        amount:      150_000,
        responsible: "Tenant".into(),
      }],
    };

    let pages = narrative_pages(&document);
    let all: Vec<String> = pages
      .iter()
      .flat_map(|p| p.lines.iter().map(|l| l.text.clone()))
      .collect();
    assert!(all.contains(&"Summary".to_string()));
    assert!(all.contains(&"- Repainting: 1500.00 (Tenant)".to_string()));
    assert!(all.contains(&"Total: 1500.00".to_string()));
    assert!(all.contains(&"E-001  Kitchen ceiling".to_string()));
  }

  #[test]
  fn exhibit_opens_with_its_code() {
    let pages = exhibit_pages(&exhibit("E-007", "Short description."));
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].lines[0].text, "Exhibit E-007");
  }

  #[test]
  fn long_exhibit_spans_multiple_pages() {
    let description = "damage detail\n".repeat(300);
    let pages = exhibit_pages(&exhibit("E-001", &description));
    assert!(pages.len() > 1);
  }

  #[test]
  fn amounts_format_in_minor_units() {
    assert_eq!(format_amount(150_000), "1500.00");
    assert_eq!(format_amount(7), "0.07");
    assert_eq!(format_amount(-2550), "-25.50");
  }
}
