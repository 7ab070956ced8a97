//! Device42 adapter for the inventory fetcher traits.
//!
//! [`Device42Client`] issues the HTTP requests; the resource fetchers map
//! provider JSON into `ipam-core` records:
//!
//! | resource  | path               | paged | envelope key |
//! |-----------|--------------------|-------|--------------|
//! | customers | `api/1.0/customers`| no    | `Customers`  |
//! | subnets   | `api/1.0/subnets`  | yes   | `subnets`    |
//! | addresses | `api/1.0/ips`      | yes   | `ips`        |
//!
//! Paged collections are drained sequentially with [`PageIterator`]; any
//! failed page aborts the whole resource.
//!
//! # Example
//!
//! ```no_run
//! use ipam_core::{IpamDataFetcher, MultiDependencyCheck, DependencyCheck};
//! use ipam_data::device42::{ContactSearchOrder, Device42Client, Device42Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Device42Config::new("https://d42.example.com")
//!     .with_contact_search_order(ContactSearchOrder::from_csv("SRE,Technical"));
//! let client = Device42Client::with_config(config)?;
//!
//! MultiDependencyCheck::new().with(&client).check_dependencies().await?;
//! let snapshot = client.orchestrator().fetch_ipam_data().await?;
//! # let _ = snapshot;
//! # Ok(())
//! # }
//! ```

mod client;
mod contacts;
mod custom_fields;
mod customer;
mod device;
mod iterator;
mod page;
mod subnet;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use client::{
    DEFAULT_PAGE_LIMIT, DEFAULT_USER_AGENT, Device42Client, Device42Config, Device42Orchestrator,
    HttpResource, ProviderBuildError,
};
pub use contacts::{ContactSearchOrder, DEFAULT_CONTACT_TYPES};
pub use customer::Device42CustomerFetcher;
pub use device::Device42DeviceFetcher;
pub use iterator::{IteratorPhase, PageIterator};
pub use page::{DocumentFetcher, Page, PageEnvelope, PageFetcher};
pub use subnet::Device42SubnetFetcher;
