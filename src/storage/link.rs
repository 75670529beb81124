//! Parsing and validation of document links.

use crate::document::DocumentKind;
use thiserror::Error;

const EXPECTED_STORAGE_DOMAIN: &str = "blob.core.windows.net";

/// Errors raised while validating a document link. Each variant carries the
/// message returned to the client, so validation failures stay descriptive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The value was not a well-formed absolute URL.
    #[error("Invalid document link: not a well-formed URL")]
    Malformed,
    /// The URL did not use the https scheme.
    #[error("Invalid document link: it must be an https Blob Storage URL")]
    InsecureScheme,
    /// The URL host was outside the expected storage domain.
    #[error("Invalid document link: it must point at the blob.core.windows.net storage domain")]
    WrongDomain,
    /// The file extension was neither `.pdf` nor `.docx`.
    #[error("Invalid or unsupported file link: only .pdf and .docx files are allowed")]
    UnsupportedExtension,
    /// The URL path did not contain container and blob segments.
    #[error("Invalid document link: expected container and blob path segments")]
    MissingPathSegments,
}

/// A validated document link with its derived storage coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// Storage container holding the blob.
    pub container: String,
    /// Name of the blob within the container.
    pub blob_name: String,
    /// Document format derived from the blob's extension.
    pub kind: DocumentKind,
}

impl DocumentLink {
    /// Validate a raw link and derive the container, blob name, and kind.
    ///
    /// Runs entirely offline; callers rely on rejection happening before any
    /// network call is attempted.
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let url = reqwest::Url::parse(raw.trim()).map_err(|_| LinkError::Malformed)?;

        if url.scheme() != "https" {
            return Err(LinkError::InsecureScheme);
        }

        let host = url.host_str().ok_or(LinkError::Malformed)?;
        if host != EXPECTED_STORAGE_DOMAIN
            && !host.ends_with(&format!(".{EXPECTED_STORAGE_DOMAIN}"))
        {
            return Err(LinkError::WrongDomain);
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|parts| parts.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        let blob_name = *segments.last().ok_or(LinkError::MissingPathSegments)?;
        let kind = DocumentKind::from_file_name(blob_name).ok_or(LinkError::UnsupportedExtension)?;
        if segments.len() < 2 {
            return Err(LinkError::MissingPathSegments);
        }
        let container = segments[segments.len() - 2];

        Ok(Self {
            container: container.to_string(),
            blob_name: blob_name.to_string(),
            kind,
        })
    }
}
