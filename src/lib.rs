//! Facade crate for the IPAM facade service.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and the Device42 provider adapter behind feature flags.

#![forbid(unsafe_code)]

pub use ipam_core::api;
pub use ipam_core::{
    AssetIp, AssetLister, AssetSubnet, Customer, CustomerFetcher, DependencyCheck,
    DependencyError, Device, DeviceFetcher, FetchError, IpamData, IpamDataFetcher, LookupError,
    MultiDependencyCheck, PageToken, PageTokenError, PhysicalAsset, PhysicalAssetFetcher,
    PhysicalAssetStorer, StoreError, Subnet, SubnetFetcher, SyncError, SyncJob,
    SyncOrchestrator, SyncReport, parse_ip_address, run_sync,
};

#[cfg(feature = "store-sqlite")]
pub use ipam_core::{CancelHandle, SqliteAssetStore};

#[cfg(feature = "device42")]
pub use ipam_data::device42;
