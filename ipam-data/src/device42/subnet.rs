//! Subnets from the paged `api/1.0/subnets` collection.

use std::net::IpAddr;
use std::num::NonZeroU32;

use async_trait::async_trait;
use ipam_core::{FetchError, Subnet, SubnetFetcher};
use ipnetwork::IpNetwork;
use log::debug;
use serde::Deserialize;

use super::custom_fields::CustomFields;
use super::iterator::PageIterator;
use super::page::PageFetcher;

const RESOURCE: &str = "subnets";
const LOCATION_FIELD: &str = "Location";

#[derive(Debug, Deserialize)]
struct SubnetsPage {
    #[serde(default)]
    subnets: Vec<SubnetRecord>,
}

#[derive(Debug, Deserialize)]
struct SubnetRecord {
    subnet_id: i64,
    network: String,
    mask_bits: u8,
    #[serde(default)]
    customer_id: Option<i64>,
    #[serde(default)]
    custom_fields: CustomFields,
}

impl SubnetRecord {
    fn into_subnet(self) -> Result<Subnet, FetchError> {
        let invalid = |reason: String| FetchError::InvalidRecord {
            resource: RESOURCE,
            record: self.subnet_id,
            reason,
        };
        let address: IpAddr = self
            .network
            .trim()
            .parse()
            .map_err(|_| invalid(format!("network {:?} is not an address", self.network)))?;
        let network = IpNetwork::new(address, self.mask_bits)
            .map_err(|err| invalid(format!("mask {} is invalid: {err}", self.mask_bits)))?;

        // Zero is the provider's placeholder for "no customer".
        let customer_id = self.customer_id.filter(|id| *id != 0);
        if customer_id.is_none() {
            debug!("subnet {} has no customer; storing without one", self.subnet_id);
        }
        Ok(Subnet::new(
            self.subnet_id,
            network,
            self.custom_fields.value_of(LOCATION_FIELD),
            customer_id,
        ))
    }
}

/// Maps Device42 subnets into [`Subnet`] records.
///
/// Subnets without a customer are kept with no customer reference; lookups
/// then report an empty owner.
#[derive(Debug, Clone)]
pub struct Device42SubnetFetcher<P> {
    pages: P,
    limit: NonZeroU32,
}

impl<P> Device42SubnetFetcher<P> {
    /// Drain `pages` with `limit` records per request.
    pub const fn new(pages: P, limit: NonZeroU32) -> Self {
        Self { pages, limit }
    }
}

#[async_trait(?Send)]
impl<P: PageFetcher> SubnetFetcher for Device42SubnetFetcher<P> {
    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, FetchError> {
        let mut pages = PageIterator::new(&self.pages, self.limit);
        let mut subnets = Vec::new();
        while pages.next().await {
            let page: SubnetsPage = pages.current().decode(RESOURCE)?;
            for record in page.subnets {
                subnets.push(record.into_subnet()?);
            }
        }
        pages.close()?;
        debug!("decoded {} subnets", subnets.len());
        Ok(subnets)
    }
}
