//! Assemble a full inventory snapshot and hand it to the store.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    CustomerFetcher, DeviceFetcher, FetchError, IpamData, IpamDataFetcher, PhysicalAssetStorer,
    StoreError, SubnetFetcher,
};

/// Fetches customers, then subnets, then devices, stopping at the first
/// failure.
///
/// Results already fetched are discarded on failure. The order only affects
/// how much work is wasted when a later resource fails.
#[derive(Debug, Clone)]
pub struct SyncOrchestrator<C, S, D> {
    customers: C,
    subnets: S,
    devices: D,
}

impl<C, S, D> SyncOrchestrator<C, S, D> {
    /// Combine one fetcher per resource.
    pub const fn new(customers: C, subnets: S, devices: D) -> Self {
        Self {
            customers,
            subnets,
            devices,
        }
    }
}

#[async_trait(?Send)]
impl<C, S, D> IpamDataFetcher for SyncOrchestrator<C, S, D>
where
    C: CustomerFetcher,
    S: SubnetFetcher,
    D: DeviceFetcher,
{
    async fn fetch_ipam_data(&self) -> Result<IpamData, FetchError> {
        let customers = self.customers.fetch_customers().await?;
        let subnets = self.subnets.fetch_subnets().await?;
        let devices = self.devices.fetch_devices().await?;
        Ok(IpamData {
            devices,
            subnets,
            customers,
        })
    }
}

/// Identifies one sync run in logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncJob {
    /// Opaque identifier supplied by whatever enqueued the job.
    pub id: Option<String>,
}

impl SyncJob {
    /// A job with the given identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }
}

/// Record counts persisted by a successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Customers stored.
    pub customers: usize,
    /// Subnets stored.
    pub subnets: usize,
    /// Devices stored.
    pub devices: usize,
}

/// Errors from [`run_sync`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The provider could not be drained; the store was not touched.
    #[error("failed to fetch inventory: {0}")]
    Fetch(#[source] FetchError),
    /// The snapshot could not be persisted; prior data is intact.
    #[error("failed to store inventory: {0}")]
    Store(#[source] StoreError),
}

/// Fetch a full snapshot and replace the stored inventory with it.
///
/// The store is never called when the fetch fails. No retries are attempted;
/// retry policy belongs to whatever scheduled the job.
pub async fn run_sync<F, S>(
    fetcher: &F,
    storer: &mut S,
    job: &SyncJob,
) -> Result<SyncReport, SyncError>
where
    F: IpamDataFetcher + ?Sized,
    S: PhysicalAssetStorer + ?Sized,
{
    log::info!("sync {} started", job.label());
    let data = fetcher.fetch_ipam_data().await.map_err(|err| {
        log::error!("sync {} failed to fetch inventory: {err}", job.label());
        SyncError::Fetch(err)
    })?;

    storer.store_physical_assets(&data).map_err(|err| {
        log::error!("sync {} failed to store inventory: {err}", job.label());
        SyncError::Store(err)
    })?;

    let report = SyncReport {
        customers: data.customers.len(),
        subnets: data.subnets.len(),
        devices: data.devices.len(),
    };
    log::info!(
        "sync {} completed: {} customers, {} subnets, {} devices",
        job.label(),
        report.customers,
        report.subnets,
        report.devices
    );
    Ok(report)
}
