//! Remote nickname document fetcher

use std::time::Duration;

use async_trait::async_trait;
use nick_core::{DomainError, DomainResult, PlatformError, PlatformResult, RemoteDocumentSource};
use tracing::{debug, instrument};

/// Largest document body accepted (8 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

/// Fetches documents with a plain HTTP GET
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpDocumentFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> PlatformResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            max_bytes: MAX_DOCUMENT_BYTES,
        })
    }

    /// Override the body size limit
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, location: &str) -> DomainError {
        DomainError::RemoteFetchFailed(format!(
            "{location} exceeds the {} byte document limit",
            self.max_bytes
        ))
    }
}

#[async_trait]
impl RemoteDocumentSource for HttpDocumentFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> DomainResult<Vec<u8>> {
        let mut response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| DomainError::RemoteFetchFailed(format!("{location}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteFetchFailed(format!(
                "{location} returned {status}"
            )));
        }

        // The declared length may be absent or wrong; the streamed count decides
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large(location));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DomainError::RemoteFetchFailed(format!("{location}: {e}")))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(location));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(bytes = body.len(), "Fetched remote document");
        Ok(body)
    }
}
