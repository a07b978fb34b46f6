//! The document renderer and its size-based split policy.
//!
//! Narrative content always stays in the main file. When the budgeted output
//! size exceeds [`RenderOptions::part_size_limit`], exhibit pages move into
//! numbered appendix files; each appendix carries its own title page so it
//! reads standalone. Exhibits are never cut across files and never truncated.

use docket_core::document::{Document, DocumentMetadata};
use sha2::{Digest, Sha256};

use crate::{
  Result,
  layout::{self, PageText, PartSummary},
  pdf,
};

// Budgeted bytes for the fixed parts of every emitted file (catalog, fonts,
// page dictionaries, xref) and for an appendix title page. Content streams
// are measured exactly; these cover the envelope around them.
const FILE_OVERHEAD: usize = 1_600;
const PAGE_OVERHEAD: usize = 240;
const TITLE_PAGE_ALLOWANCE: usize = 1_000;

// ─── Options & outputs ───────────────────────────────────────────────────────

/// Rendering knobs.
#[derive(Debug, Clone)]
pub struct RenderOptions {
  /// Budgeted size ceiling per emitted file, in bytes. Output that would
  /// exceed it is split into appendix files instead of truncated.
  pub part_size_limit: usize,
}

impl Default for RenderOptions {
  /// 4 MiB per file, comfortably under common object-storage single-request
  /// limits while keeping part counts low for photo-heavy reports.
  fn default() -> Self {
    Self { part_size_limit: 4 * 1024 * 1024 }
  }
}

/// One emitted file, with a SHA-256 hex digest for upload verification.
#[derive(Debug, Clone)]
pub struct RenderedFile {
  pub name:   String,
  pub data:   Vec<u8>,
  pub digest: String,
}

/// The main file plus zero or more appendix files.
#[derive(Debug, Clone)]
pub struct ReportPackage {
  pub main:  RenderedFile,
  pub parts: Vec<RenderedFile>,
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Stateless converter from a built [`Document`] to PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
  options: RenderOptions,
}

impl DocumentRenderer {
  pub fn new(options: RenderOptions) -> Self { Self { options } }

  /// Render the whole document as a single PDF, regardless of size.
  pub fn render(&self, document: &Document) -> Result<Vec<u8>> {
    let mut pages = layout::front_matter_pages(&document.metadata);
    pages.extend(layout::narrative_pages(document));
    for entry in &document.evidence {
      pages.extend(layout::exhibit_pages(entry));
    }
    pdf::build_pdf(&pdf_title(&document.metadata), &pages)
  }

  /// Render the document as a package, splitting exhibits into appendix
  /// files when the budgeted total exceeds the per-file limit.
  pub fn render_package(&self, document: &Document) -> Result<ReportPackage> {
    let stem = file_stem(&document.metadata);
    let title = pdf_title(&document.metadata);

    let mut narrative = layout::front_matter_pages(&document.metadata);
    narrative.extend(layout::narrative_pages(document));

    let exhibits: Vec<Vec<PageText>> =
      document.evidence.iter().map(layout::exhibit_pages).collect();
    let exhibit_sizes = exhibits
      .iter()
      .map(|pages| budgeted_size(pages))
      .collect::<Result<Vec<_>>>()?;

    let total = FILE_OVERHEAD
      + budgeted_size(&narrative)?
      + exhibit_sizes.iter().sum::<usize>();

    if total <= self.options.part_size_limit || exhibits.is_empty() {
      let mut pages = narrative;
      for exhibit in exhibits {
        pages.extend(exhibit);
      }
      let main = seal(format!("{stem}.pdf"), pdf::build_pdf(&title, &pages)?);
      return Ok(ReportPackage { main, parts: Vec::new() });
    }

    // Pack whole exhibits into appendix files, in citation order.
    let budget = self
      .options
      .part_size_limit
      .saturating_sub(FILE_OVERHEAD + TITLE_PAGE_ALLOWANCE)
      .max(1);
    let plan = plan_parts(&exhibit_sizes, budget);
    let part_count = plan.len();

    let summaries: Vec<PartSummary> = plan
      .iter()
      .enumerate()
      .map(|(i, group)| PartSummary {
        name:          format!("{stem}-appendix-{}.pdf", i + 1),
        first_code:    document.evidence[group[0]].code.clone(),
        last_code:     document.evidence[group[group.len() - 1]].code.clone(),
        exhibit_count: group.len(),
      })
      .collect();

    let mut parts = Vec::with_capacity(part_count);
    for (i, (group, summary)) in plan.iter().zip(&summaries).enumerate() {
      let mut pages = layout::part_title_pages(
        &document.metadata,
        i + 1,
        part_count,
        summary,
      );
      for &index in group {
        pages.extend(exhibits[index].iter().cloned());
      }
      let data =
        pdf::build_pdf(&format!("{title}, appendix {}", i + 1), &pages)?;
      parts.push(seal(summary.name.clone(), data));
    }

    let mut main_pages = narrative;
    main_pages.extend(layout::appendix_index_pages(&summaries));
    let main =
      seal(format!("{stem}.pdf"), pdf::build_pdf(&title, &main_pages)?);

    Ok(ReportPackage { main, parts })
  }
}

// ─── Split planning ──────────────────────────────────────────────────────────

/// Budgeted size of a run of pages: exact content-stream bytes plus the
/// fixed per-page envelope.
fn budgeted_size(pages: &[PageText]) -> Result<usize> {
  let mut total = 0;
  for page in pages {
    total += pdf::content_stream_len(page)? + PAGE_OVERHEAD;
  }
  Ok(total)
}

/// Greedily group exhibit indices into parts that fit `budget`. An exhibit
/// larger than the budget still gets a part of its own; splitting below the
/// exhibit level is never an option.
fn plan_parts(sizes: &[usize], budget: usize) -> Vec<Vec<usize>> {
  let mut parts: Vec<Vec<usize>> = Vec::new();
  let mut current: Vec<usize> = Vec::new();
  let mut used = 0usize;

  for (index, &size) in sizes.iter().enumerate() {
    if !current.is_empty() && used + size > budget {
      parts.push(std::mem::take(&mut current));
      used = 0;
    }
    current.push(index);
    used += size;
  }
  if !current.is_empty() {
    parts.push(current);
  }
  parts
}

// ─── Naming & digests ────────────────────────────────────────────────────────

fn seal(name: String, data: Vec<u8>) -> RenderedFile {
  let digest = hex::encode(Sha256::digest(&data));
  RenderedFile { name, data, digest }
}

fn pdf_title(meta: &DocumentMetadata) -> String {
  format!("{} v{}, {}", meta.document_type, meta.version, meta.case_number)
}

/// Filesystem-safe base name derived from the case number and version.
fn file_stem(meta: &DocumentMetadata) -> String {
  let mut stem = String::new();
  for c in meta.case_number.to_lowercase().chars() {
    if c.is_ascii_alphanumeric() {
      stem.push(c);
    } else if !stem.ends_with('-') {
      stem.push('-');
    }
  }
  let stem = stem.trim_matches('-');
  let stem = if stem.is_empty() { "report" } else { stem };
  format!("{stem}-v{}", meta.version)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
