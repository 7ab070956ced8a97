use thiserror::Error;

/// Errors raised while fetching records from the upstream provider.
///
/// Every variant aborts the fetch for its resource; no partial results are
/// returned. Failures may be transient and are left to the caller to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short description of the failure.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request exceeded its deadline.
    #[error("request to {url} timed out after {timeout_secs} seconds")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode {resource} response: {message}")]
    Decode {
        /// Resource whose payload was being decoded.
        resource: &'static str,
        /// Decoder error description.
        message: String,
    },
    /// A record decoded but carried an unusable value.
    #[error("{resource} record {record} is invalid: {reason}")]
    InvalidRecord {
        /// Resource the record belongs to.
        resource: &'static str,
        /// Provider identifier of the record.
        record: i64,
        /// What was wrong with it.
        reason: String,
    },
}
