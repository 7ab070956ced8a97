//! Opaque continuation tokens for paged listings.
//!
//! A token is the RFC 4648 base32 encoding, without padding, of the JSON
//! object `{"limit": n, "offset": m}` describing the next page to request.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `{limit, offset}` pair a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    /// Page size.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
}

/// Errors raised while encoding or decoding a [`PageToken`].
#[derive(Debug, Error)]
pub enum PageTokenError {
    /// The token is not valid unpadded base32.
    #[error("token is not valid base32: {0}")]
    Base32(#[source] data_encoding::DecodeError),
    /// The decoded bytes are not a `{limit, offset}` object.
    #[error("token does not hold a page position: {0}")]
    Json(#[source] serde_json::Error),
}

impl PageToken {
    /// A token for the given position.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The token for the page after one that returned `returned` rows.
    ///
    /// Only a full page (`returned == limit`) signals that more rows may
    /// follow; a short page is the last one. Returns `None` when the next
    /// offset would overflow.
    ///
    /// ```
    /// use ipam_core::PageToken;
    ///
    /// assert_eq!(PageToken::following(10, 0, 10), Some(PageToken::new(10, 10)));
    /// assert_eq!(PageToken::following(10, 0, 3), None);
    /// ```
    #[must_use]
    pub fn following(limit: u32, offset: u32, returned: usize) -> Option<Self> {
        let full = usize::try_from(limit).is_ok_and(|limit| limit == returned);
        if limit == 0 || !full {
            return None;
        }
        offset
            .checked_add(limit)
            .map(|next| Self::new(limit, next))
    }

    /// Encode as an opaque string.
    pub fn encode(&self) -> Result<String, PageTokenError> {
        let json = serde_json::to_vec(self).map_err(PageTokenError::Json)?;
        Ok(BASE32_NOPAD.encode(&json))
    }

    /// Decode a string produced by [`PageToken::encode`].
    ///
    /// ```
    /// use ipam_core::PageToken;
    ///
    /// let token = PageToken::new(100, 200);
    /// let encoded = token.encode().unwrap();
    /// assert_eq!(PageToken::decode(&encoded).unwrap(), token);
    /// assert!(PageToken::decode("not a token").is_err());
    /// ```
    pub fn decode(token: &str) -> Result<Self, PageTokenError> {
        let bytes = BASE32_NOPAD
            .decode(token.as_bytes())
            .map_err(PageTokenError::Base32)?;
        serde_json::from_slice(&bytes).map_err(PageTokenError::Json)
    }
}
