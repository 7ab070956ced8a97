//! Read models served by the asset resolver.
//!
//! Each is a denormalised join of subnet, customer and (optionally) device
//! rows. Identifiers of zero and empty strings mean "no such association".

use std::net::IpAddr;

use ipnetwork::IpNetwork;

/// The asset that owns an address, resolved at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalAsset {
    /// The queried address in canonical form.
    pub ip: IpAddr,
    /// Owning customer's resource owner, empty without a customer.
    pub resource_owner: String,
    /// Owning customer's business unit, empty without a customer.
    pub business_unit: String,
    /// Prefix of the selected subnet.
    pub network: IpNetwork,
    /// Location of the selected subnet.
    pub location: String,
    /// Bound device, `0` when no device is bound to the address.
    pub device_id: i64,
    /// Selected subnet.
    pub subnet_id: i64,
    /// Owning customer, `0` when the subnet has none.
    pub customer_id: i64,
}

/// A subnet row for paged listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSubnet {
    /// Subnet prefix.
    pub network: IpNetwork,
    /// Owning customer's resource owner.
    pub resource_owner: String,
    /// Owning customer's business unit.
    pub business_unit: String,
    /// Subnet location.
    pub location: String,
}

/// An address row for paged listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIp {
    /// Recorded address.
    pub ip: IpAddr,
    /// Prefix of the subnet the address belongs to.
    pub network: IpNetwork,
    /// Owning customer's resource owner.
    pub resource_owner: String,
    /// Owning customer's business unit.
    pub business_unit: String,
    /// Subnet location.
    pub location: String,
}
