//! Document text extraction.
//!
//! Ingestion accepts two formats. PDF bytes are staged in a scoped temporary
//! file for the parser; DOCX bytes are read directly from memory. Both paths
//! return plain text that feeds the chunking step.

mod docx;
mod pdf;

#[cfg(test)]
pub(crate) use pdf::sample_pdf_bytes;

use thiserror::Error;

/// Supported document formats, derived from the link's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl DocumentKind {
    /// Derive the document kind from a file name, matching extensions
    /// case-insensitively. Returns `None` for unsupported formats.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase();
        if lowered.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lowered.ends_with(".docx") {
            Some(Self::Docx)
        } else {
            None
        }
    }
}

/// Errors raised while extracting text from a downloaded document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Temporary-file staging failed.
    #[error("Failed to stage document for parsing: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF parser rejected the document.
    #[error("Failed to parse PDF document: {0}")]
    Pdf(#[from] lopdf::Error),
    /// The DOCX parser rejected the document.
    #[error("Failed to parse DOCX document: {0}")]
    Docx(String),
}

/// Extract plain text from a downloaded document according to its kind.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
    }
}
