//! Test doubles for fetchers and stores, shared by unit and behaviour tests.

use std::cell::RefCell;

use async_trait::async_trait;
use ipnetwork::IpNetwork;

use crate::{
    AssetIp, AssetLister, AssetSubnet, Customer, CustomerFetcher, Device, DeviceFetcher,
    FetchError, IpamData, LookupError, PhysicalAsset, PhysicalAssetFetcher, PhysicalAssetStorer,
    StoreError, Subnet, SubnetFetcher, parse_ip_address,
};

/// Build a customer record.
#[must_use]
pub fn customer(id: i64, resource_owner: &str, business_unit: &str) -> Customer {
    Customer {
        id,
        resource_owner: resource_owner.to_owned(),
        business_unit: business_unit.to_owned(),
    }
}

/// Build a subnet record from CIDR text.
///
/// # Panics
///
/// Panics when `network` is not a valid prefix.
#[must_use]
pub fn subnet(id: i64, network: &str, location: &str, customer_id: Option<i64>) -> Subnet {
    let parsed: IpNetwork = network.parse().expect("test prefix should parse");
    Subnet::new(id, parsed, location, customer_id)
}

/// Build a device record from address text.
///
/// # Panics
///
/// Panics when `ip` is not a valid address.
#[must_use]
pub fn device(id: Option<i64>, ip: &str, subnet_id: i64) -> Device {
    Device {
        id,
        ip: ip.parse().expect("test address should parse"),
        subnet_id,
    }
}

/// Stub provider returning canned results and recording call order.
#[derive(Debug)]
pub struct StubInventory {
    customers: Result<Vec<Customer>, FetchError>,
    subnets: Result<Vec<Subnet>, FetchError>,
    devices: Result<Vec<Device>, FetchError>,
    calls: RefCell<Vec<&'static str>>,
}

impl StubInventory {
    /// Serve every record in `data`.
    #[must_use]
    pub fn with_data(data: IpamData) -> Self {
        Self {
            customers: Ok(data.customers),
            subnets: Ok(data.subnets),
            devices: Ok(data.devices),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Fail the customer fetch with `error`.
    #[must_use]
    pub fn failing_customers(mut self, error: FetchError) -> Self {
        self.customers = Err(error);
        self
    }

    /// Fail the subnet fetch with `error`.
    #[must_use]
    pub fn failing_subnets(mut self, error: FetchError) -> Self {
        self.subnets = Err(error);
        self
    }

    /// Fail the device fetch with `error`.
    #[must_use]
    pub fn failing_devices(mut self, error: FetchError) -> Self {
        self.devices = Err(error);
        self
    }

    /// Resources fetched so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, resource: &'static str) {
        self.calls.borrow_mut().push(resource);
    }
}

#[async_trait(?Send)]
impl CustomerFetcher for StubInventory {
    async fn fetch_customers(&self) -> Result<Vec<Customer>, FetchError> {
        self.record("customers");
        self.customers.clone()
    }
}

#[async_trait(?Send)]
impl SubnetFetcher for StubInventory {
    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, FetchError> {
        self.record("subnets");
        self.subnets.clone()
    }
}

#[async_trait(?Send)]
impl DeviceFetcher for StubInventory {
    async fn fetch_devices(&self) -> Result<Vec<Device>, FetchError> {
        self.record("devices");
        self.devices.clone()
    }
}

/// In-memory store with linear-scan lookups.
///
/// The resolver is a direct transcription of the selection rule and serves
/// as a reference model in property tests. Intended for small datasets.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    data: IpamData,
    unavailable: Option<String>,
    replacements: usize,
}

impl MemoryAssetStore {
    /// A store already holding `data`.
    #[must_use]
    pub fn with_data(data: IpamData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Make every subsequent operation fail as unavailable.
    #[must_use]
    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_owned());
        self
    }

    /// Current contents.
    #[must_use]
    pub const fn data(&self) -> &IpamData {
        &self.data
    }

    /// Number of successful replaces.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }

    fn check_available(&self) -> Result<(), StoreError> {
        self.unavailable
            .as_ref()
            .map_or(Ok(()), |reason| {
                Err(StoreError::Unavailable {
                    reason: reason.clone(),
                })
            })
    }

    fn customer_of(&self, subnet: &Subnet) -> Option<&Customer> {
        subnet
            .customer_id
            .and_then(|id| self.data.customers.iter().find(|c| c.id == id))
    }

    fn owner_fields(&self, subnet: &Subnet) -> (String, String, i64) {
        self.customer_of(subnet).map_or_else(
            || (String::new(), String::new(), 0),
            |c| (c.resource_owner.clone(), c.business_unit.clone(), c.id),
        )
    }
}

impl PhysicalAssetStorer for MemoryAssetStore {
    fn store_physical_assets(&mut self, data: &IpamData) -> Result<(), StoreError> {
        self.check_available()?;
        self.data = data.clone();
        self.replacements += 1;
        Ok(())
    }
}

impl PhysicalAssetFetcher for MemoryAssetStore {
    fn fetch_physical_asset(&self, ip: &str) -> Result<PhysicalAsset, LookupError> {
        let address = parse_ip_address(ip)?;
        self.check_available()?;

        let best = self
            .data
            .subnets
            .iter()
            .filter(|s| s.network.contains(address))
            .map(|s| {
                let bound = self
                    .data
                    .devices
                    .iter()
                    .find(|d| d.subnet_id == s.id && d.ip == address);
                (s, bound)
            })
            .min_by(|(a, a_dev), (b, b_dev)| {
                b_dev
                    .is_some()
                    .cmp(&a_dev.is_some())
                    .then(b.network.prefix().cmp(&a.network.prefix()))
                    .then(a.id.cmp(&b.id))
            });

        let Some((subnet, bound)) = best else {
            return Err(LookupError::NotFound { ip: address });
        };
        let (resource_owner, business_unit, customer_id) = self.owner_fields(subnet);
        Ok(PhysicalAsset {
            ip: address,
            resource_owner,
            business_unit,
            network: subnet.network,
            location: subnet.location.clone(),
            device_id: bound.and_then(|d| d.id).unwrap_or(0),
            subnet_id: subnet.id,
            customer_id,
        })
    }
}

impl AssetLister for MemoryAssetStore {
    fn fetch_subnets(&self, limit: u32, offset: u32) -> Result<Vec<AssetSubnet>, StoreError> {
        self.check_available()?;
        let mut subnets: Vec<&Subnet> = self.data.subnets.iter().collect();
        subnets.sort_by_key(|s| s.id);
        Ok(window(subnets, limit, offset)
            .map(|s| {
                let (resource_owner, business_unit, _) = self.owner_fields(s);
                AssetSubnet {
                    network: s.network,
                    resource_owner,
                    business_unit,
                    location: s.location.clone(),
                }
            })
            .collect())
    }

    fn fetch_ips(&self, limit: u32, offset: u32) -> Result<Vec<AssetIp>, StoreError> {
        self.check_available()?;
        let rows = self.data.devices.iter().filter_map(|d| {
            self.data
                .subnets
                .iter()
                .find(|s| s.id == d.subnet_id)
                .map(|s| (d, s))
        });
        Ok(window(rows, limit, offset)
            .map(|(d, s)| {
                let (resource_owner, business_unit, _) = self.owner_fields(s);
                AssetIp {
                    ip: d.ip,
                    network: s.network,
                    resource_owner,
                    business_unit,
                    location: s.location.clone(),
                }
            })
            .collect())
    }
}

fn window<I: IntoIterator>(items: I, limit: u32, offset: u32) -> impl Iterator<Item = I::Item> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take)
}

/// Drive a future to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime")
        .block_on(future)
}
