//! Persistence and lookup traits for synchronised inventory.
//!
//! [`PhysicalAssetStorer`] is the sole writer path: it replaces the whole
//! dataset atomically. [`PhysicalAssetFetcher`] and [`AssetLister`] are
//! read-only and may run concurrently with a replace; readers observe either
//! the old or the new dataset, never a mix.

use crate::{AssetIp, AssetSubnet, IpamData, LookupError, PhysicalAsset};

mod error;
#[cfg(feature = "store-sqlite")]
mod keys;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use error::StoreError;
#[cfg(feature = "store-sqlite")]
pub use schema::{SCHEMA_VERSION, initialise_schema};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{CancelHandle, SqliteAssetStore};

/// Replace the persisted inventory with a fresh snapshot.
pub trait PhysicalAssetStorer {
    /// Delete every stored record and insert `data` in one transaction.
    ///
    /// Customers are inserted before subnets and subnets before devices so
    /// foreign keys hold at every step. On failure the prior dataset is left
    /// exactly as it was.
    fn store_physical_assets(&mut self, data: &IpamData) -> Result<(), StoreError>;
}

/// Resolve the asset that owns an address.
pub trait PhysicalAssetFetcher {
    /// Look up `ip` with longest-prefix-match semantics.
    ///
    /// Among subnets containing the address, a subnet with a device bound to
    /// that exact address wins; ties break on the most specific prefix.
    /// Implementations must reject malformed input with
    /// [`LookupError::InvalidInput`] before touching storage and return
    /// [`LookupError::NotFound`] when no subnet contains the address.
    fn fetch_physical_asset(&self, ip: &str) -> Result<PhysicalAsset, LookupError>;
}

/// Offset/limit scans over stored subnets and addresses.
///
/// Missing customer data renders as empty strings rather than failing.
pub trait AssetLister {
    /// Return up to `limit` subnets starting at `offset`.
    fn fetch_subnets(&self, limit: u32, offset: u32) -> Result<Vec<AssetSubnet>, StoreError>;

    /// Return up to `limit` addresses starting at `offset`.
    fn fetch_ips(&self, limit: u32, offset: u32) -> Result<Vec<AssetIp>, StoreError>;
}
