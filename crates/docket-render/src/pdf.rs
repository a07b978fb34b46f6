//! PDF assembly over `lopdf`.
//!
//! Builds each file from scratch: catalog, page tree, one content stream per
//! laid-out page, and the two built-in Helvetica fonts. No font embedding,
//! so every emitted file is self-contained.

use lopdf::{
  Dictionary, Document as PdfDocument, Object, Stream, StringFormat,
  content::{Content, Operation},
};

use crate::{
  Error, Result,
  layout::{MARGIN, PAGE_HEIGHT, PAGE_WIDTH, PageText},
};

// ─── Text encoding ───────────────────────────────────────────────────────────

/// Map a line to WinAnsi bytes. Characters outside Latin-1 degrade to `?`
/// rather than corrupting the stream.
fn encode_text(text: &str) -> Vec<u8> {
  text
    .chars()
    .map(|c| match c as u32 {
      0x20..=0xFF => c as u8,
      _ => b'?',
    })
    .collect()
}

// ─── Content streams ─────────────────────────────────────────────────────────

fn page_operations(page: &PageText) -> Vec<Operation> {
  let mut ops = Vec::new();
  let mut y = PAGE_HEIGHT - MARGIN;
  for line in &page.lines {
    y -= line.style.leading();
    if line.text.is_empty() {
      continue;
    }
    let font = if line.style.bold() { b"F2".to_vec() } else { b"F1".to_vec() };
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
      "Tf",
      vec![Object::Name(font), Object::Integer(line.style.font_size())],
    ));
    ops.push(Operation::new(
      "Td",
      vec![
        Object::Integer(MARGIN as i64),
        Object::Integer(y.round() as i64),
      ],
    ));
    ops.push(Operation::new(
      "Tj",
      vec![Object::String(encode_text(&line.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
  }
  ops
}

/// Encoded size of a page's content stream, used by the split policy to
/// budget file sizes before any file is written.
pub(crate) fn content_stream_len(page: &PageText) -> Result<usize> {
  Content { operations: page_operations(page) }
    .encode()
    .map(|bytes| bytes.len())
    .map_err(|e| Error::Pdf(e.to_string()))
}

// ─── Document assembly ───────────────────────────────────────────────────────

fn base_font(name: &str) -> Dictionary {
  Dictionary::from_iter(vec![
    ("Type", Object::Name(b"Font".to_vec())),
    ("Subtype", Object::Name(b"Type1".to_vec())),
    ("BaseFont", Object::Name(name.as_bytes().to_vec())),
    ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
  ])
}

/// Assemble a complete PDF from laid-out pages.
pub(crate) fn build_pdf(title: &str, pages: &[PageText]) -> Result<Vec<u8>> {
  if pages.is_empty() {
    return Err(Error::Pdf("document has no pages".into()));
  }

  let mut doc = PdfDocument::with_version("1.7");
  let pages_id = doc.new_object_id();

  let regular_id = doc.add_object(base_font("Helvetica"));
  let bold_id = doc.add_object(base_font("Helvetica-Bold"));
  let resources_id = doc.add_object(Dictionary::from_iter(vec![(
    "Font",
    Object::Dictionary(Dictionary::from_iter(vec![
      ("F1", Object::Reference(regular_id)),
      ("F2", Object::Reference(bold_id)),
    ])),
  )]));

  let mut page_ids = Vec::with_capacity(pages.len());
  for page in pages {
    let encoded = Content { operations: page_operations(page) }
      .encode()
      .map_err(|e| Error::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page_dict = Dictionary::from_iter(vec![
      ("Type", Object::Name(b"Page".to_vec())),
      ("Parent", Object::Reference(pages_id)),
      (
        "MediaBox",
        Object::Array(vec![
          Object::Integer(0),
          Object::Integer(0),
          Object::Integer(PAGE_WIDTH as i64),
          Object::Integer(PAGE_HEIGHT as i64),
        ]),
      ),
      ("Resources", Object::Reference(resources_id)),
      ("Contents", Object::Reference(content_id)),
    ]);
    page_ids.push(doc.add_object(page_dict));
  }

  let pages_dict = Dictionary::from_iter(vec![
    ("Type", Object::Name(b"Pages".to_vec())),
    ("Count", Object::Integer(pages.len() as i64)),
    (
      "Kids",
      Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    ),
  ]);
  doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

  let catalog_id = doc.add_object(Dictionary::from_iter(vec![
    ("Type", Object::Name(b"Catalog".to_vec())),
    ("Pages", Object::Reference(pages_id)),
  ]));
  doc.trailer.set("Root", Object::Reference(catalog_id));

  let info_id = doc.add_object(Dictionary::from_iter(vec![(
    "Title",
    Object::String(encode_text(title), StringFormat::Literal),
  )]));
  doc.trailer.set("Info", Object::Reference(info_id));

  doc.compress();

  let mut buffer = Vec::new();
  doc
    .save_to(&mut buffer)
    .map_err(|e| Error::Pdf(format!("save failed: {e}")))?;
  Ok(buffer)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use crate::layout::{PageFlow, TextStyle};

  use super::*;

  fn sample_pages(count: usize) -> Vec<PageText> {
    let mut flow = PageFlow::new();
    for i in 0..count {
      flow.heading(&format!("Page {i}"));
      flow.body("Some body text.");
      flow.gap(TextStyle::Body);
      flow.break_page();
    }
    flow.finish()
  }

  #[test]
  fn build_produces_loadable_pdf_with_page_count() {
    let bytes = build_pdf("Test report", &sample_pages(3)).unwrap();
    let doc = PdfDocument::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
  }

  #[test]
  fn empty_page_list_is_rejected() {
    let err = build_pdf("Test", &[]).unwrap_err();
    assert!(matches!(err, Error::Pdf(_)));
  }

  #[test]
  fn content_stream_len_grows_with_content() {
    let short = sample_pages(1);
    let mut flow = PageFlow::new();
    flow.body(&"Much longer body text repeated over and over. ".repeat(40));
    let long = flow.finish();

    assert!(
      content_stream_len(&long[0]).unwrap()
        > content_stream_len(&short[0]).unwrap()
    );
  }

  #[test]
  fn non_latin_characters_degrade_to_question_marks() {
    assert_eq!(encode_text("a\u{1F600}b"), b"a?b".to_vec());
    assert_eq!(encode_text("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
  }
}
