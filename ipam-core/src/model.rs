//! Inventory records synchronised from the provider.
//!
//! These are the units of transfer between the fetch and store halves of a
//! sync. No cross-references are validated here; referential integrity is
//! enforced by the store's foreign keys.

use std::net::IpAddr;

use ipnetwork::IpNetwork;

/// A network interface record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Provider device identifier, absent when the address has no device.
    pub id: Option<i64>,
    /// Address bound to the interface.
    pub ip: IpAddr,
    /// Subnet the address was allocated from.
    pub subnet_id: i64,
}

/// A block of addresses allocated to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    /// Provider subnet identifier.
    pub id: i64,
    /// Network prefix with host bits cleared.
    pub network: IpNetwork,
    /// Physical location taken from the provider's custom fields.
    pub location: String,
    /// Owning customer, absent when the provider reports none.
    pub customer_id: Option<i64>,
}

impl Subnet {
    /// Build a subnet, clearing any host bits set in `network`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipam_core::Subnet;
    ///
    /// let subnet = Subnet::new(7, "10.1.2.3/16".parse().unwrap(), "dc1", Some(1));
    /// assert_eq!(subnet.network.to_string(), "10.1.0.0/16");
    /// ```
    #[must_use]
    pub fn new(
        id: i64,
        network: IpNetwork,
        location: impl Into<String>,
        customer_id: Option<i64>,
    ) -> Self {
        Self {
            id,
            network: canonical_network(network),
            location: location.into(),
            customer_id,
        }
    }
}

/// The person and team most directly responsible for a subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Provider customer identifier.
    pub id: i64,
    /// Email address of the accountable owner.
    pub resource_owner: String,
    /// Business unit the customer belongs to.
    pub business_unit: String,
}

/// A complete snapshot of the provider's inventory.
///
/// Created fresh on every sync and discarded once handed to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpamData {
    /// Every address record.
    pub devices: Vec<Device>,
    /// Every subnet record.
    pub subnets: Vec<Subnet>,
    /// Every customer record.
    pub customers: Vec<Customer>,
}

impl IpamData {
    /// Whether the snapshot holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.subnets.is_empty() && self.customers.is_empty()
    }
}

/// Clear host bits so equal prefixes compare and render identically.
pub(crate) fn canonical_network(network: IpNetwork) -> IpNetwork {
    IpNetwork::new(network.network(), network.prefix()).unwrap_or(network)
}
