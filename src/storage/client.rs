//! HTTP client for downloading blobs with shared-access-signature auth.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Errors returned while talking to blob storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Storage responded with an unexpected status code.
    #[error("Unexpected blob storage response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from storage.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Storage account coordinates parsed from a connection string.
///
/// The recognized form is a `;`-separated list of `key=value` pairs carrying
/// `BlobEndpoint` and `SharedAccessSignature`; unknown keys are ignored and
/// pair order does not matter.
#[derive(Debug, Clone)]
pub struct StorageAccount {
    /// Base URL of the blob endpoint, without a trailing slash.
    pub blob_endpoint: String,
    /// Shared-access-signature query string, without a leading `?`.
    pub sas_token: String,
}

impl StorageAccount {
    /// Parse a connection string into account coordinates.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut blob_endpoint = None;
        let mut sas_token = None;

        for pair in raw.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                return Err(format!("malformed segment '{pair}', expected key=value"));
            };
            match key.trim() {
                "BlobEndpoint" => {
                    blob_endpoint = Some(value.trim().trim_end_matches('/').to_string());
                }
                "SharedAccessSignature" => {
                    sas_token = Some(value.trim().trim_start_matches('?').to_string());
                }
                _ => {}
            }
        }

        Ok(Self {
            blob_endpoint: blob_endpoint.ok_or("missing BlobEndpoint")?,
            sas_token: sas_token.ok_or("missing SharedAccessSignature")?,
        })
    }
}

/// Interface for fetching document blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download the full contents of a blob.
    async fn download(&self, container: &str, blob_name: &str) -> Result<Vec<u8>, StorageError>;
}

/// Blob download client authenticated with a shared-access signature.
pub struct BlobClient {
    pub(crate) client: Client,
    pub(crate) account: StorageAccount,
}

impl BlobClient {
    /// Construct a client for the given storage account.
    pub fn new(client: Client, account: StorageAccount) -> Self {
        tracing::debug!(endpoint = %account.blob_endpoint, "Initialized blob storage client");
        Self { client, account }
    }
}

#[async_trait]
impl BlobStore for BlobClient {
    async fn download(&self, container: &str, blob_name: &str) -> Result<Vec<u8>, StorageError> {
        let url = format!(
            "{}/{container}/{blob_name}?{}",
            self.account.blob_endpoint, self.account.sas_token
        );
        tracing::debug!(container, blob = blob_name, "Downloading blob");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StorageError::UnexpectedStatus { status, body };
            tracing::error!(container, blob = blob_name, error = %error, "Blob download failed");
            return Err(error);
        }

        Ok(response.bytes().await?.to_vec())
    }
}
