//! Collaborator traits for the provider's resources.

use async_trait::async_trait;

use crate::{Customer, Device, IpamData, Subnet};

use super::error::FetchError;

/// Fetch every customer known to the provider.
///
/// Implementations apply the resource-owner and business-unit extraction
/// rules while mapping provider records.
#[async_trait(?Send)]
pub trait CustomerFetcher {
    /// Return all customers, or the first error encountered.
    async fn fetch_customers(&self) -> Result<Vec<Customer>, FetchError>;
}

/// Fetch every subnet known to the provider.
#[async_trait(?Send)]
pub trait SubnetFetcher {
    /// Return all subnets, or the first error encountered.
    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, FetchError>;
}

/// Fetch every address record known to the provider.
#[async_trait(?Send)]
pub trait DeviceFetcher {
    /// Return all devices, or the first error encountered.
    async fn fetch_devices(&self) -> Result<Vec<Device>, FetchError>;
}

/// Fetch a complete inventory snapshot.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use ipam_core::{FetchError, IpamData, IpamDataFetcher};
///
/// struct EmptyInventory;
///
/// #[async_trait(?Send)]
/// impl IpamDataFetcher for EmptyInventory {
///     async fn fetch_ipam_data(&self) -> Result<IpamData, FetchError> {
///         Ok(IpamData::default())
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait IpamDataFetcher {
    /// Return one full drain of every resource, or the first error.
    async fn fetch_ipam_data(&self) -> Result<IpamData, FetchError>;
}

#[async_trait(?Send)]
impl<T: CustomerFetcher + ?Sized> CustomerFetcher for &T {
    async fn fetch_customers(&self) -> Result<Vec<Customer>, FetchError> {
        (**self).fetch_customers().await
    }
}

#[async_trait(?Send)]
impl<T: SubnetFetcher + ?Sized> SubnetFetcher for &T {
    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, FetchError> {
        (**self).fetch_subnets().await
    }
}

#[async_trait(?Send)]
impl<T: DeviceFetcher + ?Sized> DeviceFetcher for &T {
    async fn fetch_devices(&self) -> Result<Vec<Device>, FetchError> {
        (**self).fetch_devices().await
    }
}
