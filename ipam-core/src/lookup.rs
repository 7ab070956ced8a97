//! Lookup errors and input validation shared by resolvers and handlers.

use std::net::IpAddr;

use thiserror::Error;

use crate::{PageTokenError, StoreError};

/// Errors returned by point lookups and paged listings.
///
/// The variants map one-to-one onto the caller-facing taxonomy so a boundary
/// layer can branch on them; see [`LookupError::status_code`].
#[derive(Debug, Error)]
pub enum LookupError {
    /// The caller supplied a malformed value. Never retried.
    #[error("invalid {field} {input:?}: {reason}")]
    InvalidInput {
        /// Name of the offending request field.
        field: &'static str,
        /// Value as supplied.
        input: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The query was well formed but no subnet contains the address.
    #[error("no physical asset found for {ip}")]
    NotFound {
        /// Address that was looked up.
        ip: IpAddr,
    },
    /// The store failed while answering the query.
    #[error("failed to query asset store: {0}")]
    Storage(#[from] StoreError),
    /// A continuation token could not be produced for a full page.
    #[error("failed to encode next page token: {0}")]
    PageToken(#[source] PageTokenError),
}

impl LookupError {
    /// HTTP-style status class for the error.
    ///
    /// ```
    /// use ipam_core::parse_ip_address;
    ///
    /// let err = parse_ip_address("not-an-ip").unwrap_err();
    /// assert_eq!(err.status_code(), 400);
    /// ```
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::PageToken(_) => 500,
        }
    }
}

/// Parse an IPv4 or IPv6 literal, rejecting anything else before I/O.
///
/// # Examples
///
/// ```
/// use ipam_core::{LookupError, parse_ip_address};
///
/// assert!(parse_ip_address("127.0.0.1").is_ok());
/// assert!(parse_ip_address("::1").is_ok());
/// assert!(matches!(
///     parse_ip_address("127.0.0.0/24"),
///     Err(LookupError::InvalidInput { .. })
/// ));
/// ```
pub fn parse_ip_address(input: &str) -> Result<IpAddr, LookupError> {
    input
        .trim()
        .parse::<IpAddr>()
        .map_err(|err| LookupError::InvalidInput {
            field: "ipAddress",
            input: input.to_owned(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("256.0.0.1")]
    #[case("10.0.0")]
    #[case("localhost")]
    #[case("2001:db8::g")]
    fn rejects_malformed_addresses(#[case] input: &str) {
        let err = parse_ip_address(input).expect_err("malformed input should fail");
        assert!(matches!(err, LookupError::InvalidInput { field: "ipAddress", .. }));
    }

    #[rstest]
    #[case(" 10.0.0.1 ", "10.0.0.1")]
    #[case("2001:DB8::1", "2001:db8::1")]
    fn canonicalises_addresses(#[case] input: &str, #[case] expected: &str) {
        let ip = parse_ip_address(input).expect("valid address");
        assert_eq!(ip.to_string(), expected);
    }

    #[rstest]
    fn not_found_maps_to_404() {
        let err = LookupError::NotFound {
            ip: "10.0.0.1".parse().expect("valid address"),
        };
        assert_eq!(err.status_code(), 404);
    }

    #[rstest]
    fn storage_maps_to_500() {
        let err = LookupError::from(StoreError::Unavailable {
            reason: "offline".to_owned(),
        });
        assert_eq!(err.status_code(), 500);
    }
}
