//! Rendering pipeline for Docket report documents.
//!
//! Converts a [`docket_core::document::Document`] into one or more
//! standalone PDF files. Narrative content always stays in the main file;
//! when the estimated output would exceed the configured per-file limit,
//! exhibit pages move into numbered appendix files, each of which is an
//! independently valid document.

pub mod compose;
pub mod error;
pub mod render;

mod layout;
mod pdf;

pub use compose::compose_report_document;
pub use error::{Error, Result};
pub use render::{DocumentRenderer, RenderOptions, RenderedFile, ReportPackage};
