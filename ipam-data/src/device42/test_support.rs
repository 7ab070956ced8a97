//! In-memory page and document sources for exercising the fetchers without
//! a Device42 instance.

use std::cell::RefCell;

use async_trait::async_trait;
use ipam_core::FetchError;
use serde_json::{Value, json};

use super::page::{DocumentFetcher, Page, PageFetcher};

/// Serves a fixed collection in pages sized by each request.
#[derive(Debug)]
pub struct StubPageFetcher {
    key: &'static str,
    items: Vec<Value>,
    failure: Option<(u64, FetchError)>,
    requests: RefCell<Vec<(u32, u64)>>,
}

impl StubPageFetcher {
    /// Serve `items` under the envelope key `key`.
    #[must_use]
    pub const fn with_items(key: &'static str, items: Vec<Value>) -> Self {
        Self {
            key,
            items,
            failure: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Serve `total` empty objects under the key `items`.
    #[must_use]
    pub fn with_total(total: u64) -> Self {
        let count = usize::try_from(total).unwrap_or(usize::MAX);
        Self::with_items("items", vec![json!({}); count])
    }

    /// Fail the request for `offset` with `error`.
    #[must_use]
    pub fn failing_at(mut self, offset: u64, error: FetchError) -> Self {
        self.failure = Some((offset, error));
        self
    }

    /// `(limit, offset)` of every request so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(u32, u64)> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PageFetcher for StubPageFetcher {
    async fn fetch_page(&self, limit: u32, offset: u64) -> Result<Page, FetchError> {
        self.requests.borrow_mut().push((limit, offset));
        if let Some((failing_offset, error)) = &self.failure {
            if *failing_offset == offset {
                return Err(error.clone());
            }
        }
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let window: Vec<&Value> = self.items.iter().skip(skip).take(take).collect();
        let mut body = json!({
            "limit": limit,
            "offset": offset,
            "total_count": self.items.len(),
        });
        if let Some(envelope) = body.as_object_mut() {
            envelope.insert(self.key.to_owned(), json!(window));
        }
        Page::from_body(self.key, body.to_string().into_bytes())
    }
}

/// Serves one fixed document body.
#[derive(Debug, Clone)]
pub struct StubDocument {
    body: Result<Vec<u8>, FetchError>,
}

impl StubDocument {
    /// Serve `document` serialised as JSON.
    #[must_use]
    pub fn json(document: &Value) -> Self {
        Self {
            body: Ok(document.to_string().into_bytes()),
        }
    }

    /// Serve `body` verbatim.
    #[must_use]
    pub fn raw(body: &[u8]) -> Self {
        Self {
            body: Ok(body.to_vec()),
        }
    }

    /// Fail every request with `error`.
    #[must_use]
    pub const fn failing(error: FetchError) -> Self {
        Self { body: Err(error) }
    }
}

#[async_trait(?Send)]
impl DocumentFetcher for StubDocument {
    async fn fetch_document(&self) -> Result<Vec<u8>, FetchError> {
        self.body.clone()
    }
}

/// Drive a future to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime")
        .block_on(future)
}
