//! Address records from the paged `api/1.0/ips` collection.

use std::num::NonZeroU32;

use async_trait::async_trait;
use ipam_core::{Device, DeviceFetcher, FetchError};
use log::debug;
use serde::Deserialize;

use super::iterator::PageIterator;
use super::page::PageFetcher;

const RESOURCE: &str = "ips";

#[derive(Debug, Deserialize)]
struct IpsPage {
    #[serde(default)]
    ips: Vec<IpRecord>,
}

#[derive(Debug, Deserialize)]
struct IpRecord {
    ip: String,
    #[serde(default)]
    device_id: Option<i64>,
    subnet_id: i64,
}

impl IpRecord {
    fn into_device(self) -> Result<Device, FetchError> {
        let ip = self
            .ip
            .trim()
            .parse()
            .map_err(|_| FetchError::Decode {
                resource: RESOURCE,
                message: format!(
                    "address {:?} in subnet {} is not an IP address",
                    self.ip, self.subnet_id
                ),
            })?;
        Ok(Device {
            // Zero means the address has no associated device.
            id: self.device_id.filter(|id| *id != 0),
            ip,
            subnet_id: self.subnet_id,
        })
    }
}

/// Maps Device42 address records into [`Device`] records.
#[derive(Debug, Clone)]
pub struct Device42DeviceFetcher<P> {
    pages: P,
    limit: NonZeroU32,
}

impl<P> Device42DeviceFetcher<P> {
    /// Drain `pages` with `limit` records per request.
    pub const fn new(pages: P, limit: NonZeroU32) -> Self {
        Self { pages, limit }
    }
}

#[async_trait(?Send)]
impl<P: PageFetcher> DeviceFetcher for Device42DeviceFetcher<P> {
    async fn fetch_devices(&self) -> Result<Vec<Device>, FetchError> {
        let mut pages = PageIterator::new(&self.pages, self.limit);
        let mut devices = Vec::new();
        while pages.next().await {
            let page: IpsPage = pages.current().decode(RESOURCE)?;
            for record in page.ips {
                devices.push(record.into_device()?);
            }
        }
        pages.close()?;
        debug!("decoded {} addresses", devices.len());
        Ok(devices)
    }
}
