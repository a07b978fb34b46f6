//! Error type for `docket-render`.
//!
//! Rendering failures are fatal to the call that raised them; the renderer
//! never emits a truncated document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid document: {0}")]
  Document(#[from] docket_core::Error),

  #[error("pdf generation failed: {0}")]
  Pdf(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
