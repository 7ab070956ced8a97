//! Raw pages returned by the provider's collection endpoints.
//!
//! Decoding happens in two explicit steps: [`Page::from_body`] reads only the
//! paging envelope, then [`Page::decode`] reads the typed item list from the
//! same payload once the caller knows which resource it holds.

use async_trait::async_trait;
use ipam_core::FetchError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Paging fields shared by every collection response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageEnvelope {
    /// Page size the provider applied.
    #[serde(default)]
    pub limit: u64,
    /// Offset of the first item in the page.
    #[serde(default)]
    pub offset: u64,
    /// Number of items in the whole collection.
    pub total_count: u64,
}

/// One page of a collection: its envelope plus the undecoded body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    envelope: PageEnvelope,
    body: Vec<u8>,
}

impl Page {
    /// A page carrying no items and no body.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            envelope: PageEnvelope {
                limit: 0,
                offset: 0,
                total_count: 0,
            },
            body: Vec::new(),
        }
    }

    /// Read the envelope of `body`, keeping the bytes for a typed decode.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] when the body is not JSON or lacks
    /// `total_count`.
    pub fn from_body(resource: &'static str, body: Vec<u8>) -> Result<Self, FetchError> {
        let envelope = serde_json::from_slice(&body).map_err(|err| decode_error(resource, &err))?;
        Ok(Self { envelope, body })
    }

    /// Paging fields reported by the provider.
    #[must_use]
    pub const fn envelope(&self) -> PageEnvelope {
        self.envelope
    }

    /// Undecoded response body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] when the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self, resource: &'static str) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|err| decode_error(resource, &err))
    }
}

pub(crate) fn decode_error(resource: &'static str, err: &serde_json::Error) -> FetchError {
    FetchError::Decode {
        resource,
        message: err.to_string(),
    }
}

/// Request a single page of a collection.
#[async_trait(?Send)]
pub trait PageFetcher {
    /// Fetch up to `limit` items starting at `offset`.
    async fn fetch_page(&self, limit: u32, offset: u64) -> Result<Page, FetchError>;
}

#[async_trait(?Send)]
impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    async fn fetch_page(&self, limit: u32, offset: u64) -> Result<Page, FetchError> {
        (**self).fetch_page(limit, offset).await
    }
}

/// Request an unpaginated document.
#[async_trait(?Send)]
pub trait DocumentFetcher {
    /// Fetch the whole document body.
    async fn fetch_document(&self) -> Result<Vec<u8>, FetchError>;
}

#[async_trait(?Send)]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for &T {
    async fn fetch_document(&self) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_document().await
    }
}
