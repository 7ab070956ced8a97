//! Test helpers for seeding asset stores and stubbing the provider.

use std::cell::RefCell;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use ipam_core::test_support::{StubInventory, customer, device, subnet};
use ipam_core::{
    DependencyCheck, DependencyError, FetchError, IpamData, IpamDataFetcher,
    PhysicalAssetStorer, SqliteAssetStore, SyncOrchestrator,
};
use ipam_data::device42::Device42Config;
use tempfile::TempDir;

use crate::CliError;
use crate::provider::{Provider, ProviderBuilder};

/// A scratch directory holding the asset store used by one test.
pub(super) struct TempDatabase {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl TempDatabase {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            _dir: dir,
            path: root.join("state").join("assets.db"),
        }
    }

    pub(super) fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    pub(super) fn seed(&self, data: &IpamData) {
        let mut store = SqliteAssetStore::open(&self.path).expect("open store");
        store.store_physical_assets(data).expect("seed store");
    }
}

/// One customer owning two nested subnets, with one bound device.
pub(super) fn sample_inventory() -> IpamData {
    IpamData {
        customers: vec![customer(1, "alice@x.com", "Security")],
        subnets: vec![
            subnet(1, "10.0.0.0/8", "dc1", Some(1)),
            subnet(2, "10.1.0.0/16", "dc2", Some(1)),
        ],
        devices: vec![device(Some(7), "10.1.2.3", 2)],
    }
}

/// An inventory unrelated to [`sample_inventory`].
pub(super) fn replacement_inventory() -> IpamData {
    IpamData {
        customers: vec![customer(2, "bob@x.com", "Payments")],
        subnets: vec![subnet(3, "192.168.0.0/24", "dc3", Some(2))],
        devices: vec![device(None, "192.168.0.10", 3)],
    }
}

pub(super) fn upstream_failure() -> FetchError {
    FetchError::Http {
        url: "http://d42.test/api/1.0/subnets".to_owned(),
        status: 503,
        message: "service unavailable".to_owned(),
    }
}

struct StubProvider {
    inventory: StubInventory,
    unhealthy: Option<String>,
}

#[async_trait(?Send)]
impl IpamDataFetcher for StubProvider {
    async fn fetch_ipam_data(&self) -> Result<IpamData, FetchError> {
        let inventory = &self.inventory;
        SyncOrchestrator::new(inventory, inventory, inventory)
            .fetch_ipam_data()
            .await
    }
}

#[async_trait(?Send)]
impl DependencyCheck for StubProvider {
    fn name(&self) -> &'static str {
        "stub-provider"
    }

    async fn check_dependencies(&self) -> Result<(), DependencyError> {
        self.unhealthy
            .as_ref()
            .map_or(Ok(()), |reason| {
                Err(DependencyError::Unavailable {
                    name: self.name(),
                    reason: reason.clone(),
                })
            })
    }
}

/// Builds providers serving a fixed inventory and records the endpoints
/// they were configured for.
#[derive(Debug, Default)]
pub(super) struct StubProviderBuilder {
    data: IpamData,
    subnet_failure: Option<FetchError>,
    unhealthy: Option<String>,
    endpoints: RefCell<Vec<String>>,
}

impl StubProviderBuilder {
    pub(super) fn serving(data: IpamData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub(super) fn failing_subnets(mut self, error: FetchError) -> Self {
        self.subnet_failure = Some(error);
        self
    }

    pub(super) fn unhealthy(mut self, reason: &str) -> Self {
        self.unhealthy = Some(reason.to_owned());
        self
    }

    pub(super) fn endpoints(&self) -> Vec<String> {
        self.endpoints.borrow().clone()
    }
}

impl ProviderBuilder for StubProviderBuilder {
    fn build(&self, config: &Device42Config) -> Result<Box<dyn Provider>, CliError> {
        self.endpoints.borrow_mut().push(config.endpoint.clone());
        let mut inventory = StubInventory::with_data(self.data.clone());
        if let Some(error) = &self.subnet_failure {
            inventory = inventory.failing_subnets(error.clone());
        }
        Ok(Box::new(StubProvider {
            inventory,
            unhealthy: self.unhealthy.clone(),
        }))
    }
}

/// Decode a command's JSON output.
pub(super) fn parse_output<T: serde::de::DeserializeOwned>(stdout: &[u8]) -> T {
    let text = std::str::from_utf8(stdout).expect("stdout utf-8");
    serde_json::from_str(text).expect("output should be JSON")
}
