//! Core domain types for the IPAM facade.
//!
//! The crate models the inventory records synchronised from an external
//! IPAM/CMDB provider, the collaborator traits used to fetch and persist them,
//! and the read models served by point and paged lookups. Provider adapters
//! live in `ipam-data`; the SQLite-backed store is gated behind the
//! `store-sqlite` feature.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
mod asset;
pub mod dependency;
pub mod fetch;
mod lookup;
mod model;
pub mod page_token;
pub mod store;
mod sync;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use asset::{AssetIp, AssetSubnet, PhysicalAsset};
pub use dependency::{DependencyCheck, DependencyError, MultiDependencyCheck};
pub use fetch::{
    CustomerFetcher, DeviceFetcher, FetchError, IpamDataFetcher, SubnetFetcher,
};
pub use lookup::{LookupError, parse_ip_address};
pub use model::{Customer, Device, IpamData, Subnet};
pub use page_token::{PageToken, PageTokenError};
pub use store::{AssetLister, PhysicalAssetFetcher, PhysicalAssetStorer, StoreError};
pub use sync::{SyncError, SyncJob, SyncOrchestrator, SyncReport, run_sync};

#[cfg(feature = "store-sqlite")]
pub use store::{CancelHandle, SqliteAssetStore};
