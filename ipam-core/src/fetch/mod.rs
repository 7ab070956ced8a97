//! Fetch inventory records from an upstream provider.
//!
//! One trait per provider resource keeps adapters substitutable in tests.
//! [`IpamDataFetcher`] assembles the full snapshot; the
//! [`SyncOrchestrator`](crate::SyncOrchestrator) is the stock implementation.

mod error;
mod provider;

pub use error::FetchError;
pub use provider::{CustomerFetcher, DeviceFetcher, IpamDataFetcher, SubnetFetcher};
