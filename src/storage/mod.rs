//! Blob storage access and document-link validation.
//!
//! Documents are referenced by URL. [`DocumentLink::parse`] enforces the link
//! rules (https scheme, expected storage domain, supported extension) before
//! any network traffic, and [`BlobClient`] downloads the referenced blob with
//! the account's shared-access signature.

mod client;
mod link;

pub use client::{BlobClient, BlobStore, StorageAccount, StorageError};
pub use link::{DocumentLink, LinkError};
