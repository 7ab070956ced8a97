//! Request and response models for the caller-facing layer.
//!
//! These are the JSON shapes a dispatch layer exchanges with clients, plus
//! the handler functions that translate them into resolver calls. Transport
//! concerns stay outside; [`LookupError::status_code`] supplies the status
//! mapping.

use serde::{Deserialize, Serialize};

use crate::{
    AssetIp, AssetLister, AssetSubnet, LookupError, PageToken, PhysicalAsset,
    PhysicalAssetFetcher, StoreError,
};

/// Page size used when a request omits `limit` or sets it to zero.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Point lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddressQuery {
    /// Address to resolve.
    pub ip_address: String,
}

/// Point lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAssetDetails {
    /// Resolved address.
    pub ip: String,
    /// Owning customer's resource owner.
    pub resource_owner: String,
    /// Owning customer's business unit.
    pub business_unit: String,
    /// Secondary attributes.
    pub tags: AssetTags,
}

/// Secondary attributes of a resolved asset. Zero identifiers mean "none".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTags {
    /// Prefix of the selected subnet.
    pub network: String,
    /// Location of the selected subnet.
    pub location: String,
    /// Bound device.
    #[serde(rename = "deviceID")]
    pub device_id: i64,
    /// Selected subnet.
    #[serde(rename = "subnetID")]
    pub subnet_id: i64,
    /// Owning customer.
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

impl From<PhysicalAsset> for PhysicalAssetDetails {
    fn from(asset: PhysicalAsset) -> Self {
        Self {
            ip: asset.ip.to_string(),
            resource_owner: asset.resource_owner,
            business_unit: asset.business_unit,
            tags: AssetTags {
                network: asset.network.to_string(),
                location: asset.location,
                device_id: asset.device_id,
                subnet_id: asset.subnet_id,
                customer_id: asset.customer_id,
            },
        }
    }
}

/// First-page request for a paged listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    /// Page size; zero or absent selects the default.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Continuation request for a paged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPageRequest {
    /// Token returned with the previous page.
    pub next_page_token: String,
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse<T> {
    /// Token for the next page, empty on the last page.
    pub next_page_token: String,
    /// Rows in this page.
    pub result: Vec<T>,
}

/// Subnet listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSummary {
    /// Subnet prefix.
    pub network: String,
    /// Owning customer's resource owner.
    pub resource_owner: String,
    /// Owning customer's business unit.
    pub business_unit: String,
    /// Subnet location.
    pub location: String,
}

impl From<AssetSubnet> for SubnetSummary {
    fn from(row: AssetSubnet) -> Self {
        Self {
            network: row.network.to_string(),
            resource_owner: row.resource_owner,
            business_unit: row.business_unit,
            location: row.location,
        }
    }
}

/// Address listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpSummary {
    /// Recorded address.
    pub ip: String,
    /// Prefix of the owning subnet.
    pub network: String,
    /// Owning customer's resource owner.
    pub resource_owner: String,
    /// Owning customer's business unit.
    pub business_unit: String,
    /// Subnet location.
    pub location: String,
}

impl From<AssetIp> for IpSummary {
    fn from(row: AssetIp) -> Self {
        Self {
            ip: row.ip.to_string(),
            network: row.network.to_string(),
            resource_owner: row.resource_owner,
            business_unit: row.business_unit,
            location: row.location,
        }
    }
}

/// Resolve the asset owning the queried address.
pub fn lookup_physical_asset<F>(
    fetcher: &F,
    query: &IpAddressQuery,
) -> Result<PhysicalAssetDetails, LookupError>
where
    F: PhysicalAssetFetcher + ?Sized,
{
    match fetcher.fetch_physical_asset(&query.ip_address) {
        Ok(asset) => Ok(asset.into()),
        Err(err) => {
            match &err {
                LookupError::NotFound { .. } | LookupError::InvalidInput { .. } => {
                    log::debug!("physical asset lookup rejected: {err}");
                }
                LookupError::Storage(_) | LookupError::PageToken(_) => {
                    log::warn!("physical asset lookup failed: {err}");
                }
            }
            Err(err)
        }
    }
}

/// Page through stored subnets.
pub fn list_subnets<L>(
    lister: &L,
    request: PaginationRequest,
    default_page_size: u32,
) -> Result<PaginationResponse<SubnetSummary>, LookupError>
where
    L: AssetLister + ?Sized,
{
    let (limit, offset) = resolve_position(request, default_page_size);
    fetch_page(limit, offset, |l, o| lister.fetch_subnets(l, o))
}

/// Continue paging through stored subnets.
///
/// A token carrying a zero limit falls back to `default_page_size`.
pub fn list_subnets_from_token<L>(
    lister: &L,
    request: &NextPageRequest,
    default_page_size: u32,
) -> Result<PaginationResponse<SubnetSummary>, LookupError>
where
    L: AssetLister + ?Sized,
{
    let (limit, offset) = resolve_position(decode_token(request)?, default_page_size);
    fetch_page(limit, offset, |l, o| lister.fetch_subnets(l, o))
}

/// Page through stored addresses.
pub fn list_ips<L>(
    lister: &L,
    request: PaginationRequest,
    default_page_size: u32,
) -> Result<PaginationResponse<IpSummary>, LookupError>
where
    L: AssetLister + ?Sized,
{
    let (limit, offset) = resolve_position(request, default_page_size);
    fetch_page(limit, offset, |l, o| lister.fetch_ips(l, o))
}

/// Continue paging through stored addresses.
pub fn list_ips_from_token<L>(
    lister: &L,
    request: &NextPageRequest,
    default_page_size: u32,
) -> Result<PaginationResponse<IpSummary>, LookupError>
where
    L: AssetLister + ?Sized,
{
    let (limit, offset) = resolve_position(decode_token(request)?, default_page_size);
    fetch_page(limit, offset, |l, o| lister.fetch_ips(l, o))
}

fn resolve_position(request: PaginationRequest, default_page_size: u32) -> (u32, u32) {
    let limit = request
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(default_page_size);
    (limit, request.offset.unwrap_or(0))
}

/// A token resumes exactly like a first-page request at its position.
fn decode_token(request: &NextPageRequest) -> Result<PaginationRequest, LookupError> {
    let token = &request.next_page_token;
    let position = PageToken::decode(token).map_err(|err| LookupError::InvalidInput {
        field: "nextPageToken",
        input: token.clone(),
        reason: err.to_string(),
    })?;
    Ok(PaginationRequest {
        limit: Some(position.limit),
        offset: Some(position.offset),
    })
}

fn fetch_page<R, T>(
    limit: u32,
    offset: u32,
    fetch: impl FnOnce(u32, u32) -> Result<Vec<R>, StoreError>,
) -> Result<PaginationResponse<T>, LookupError>
where
    T: From<R>,
{
    let rows = fetch(limit, offset)?;
    let next_page_token = match PageToken::following(limit, offset, rows.len()) {
        Some(token) => token.encode().map_err(LookupError::PageToken)?,
        None => String::new(),
    };
    Ok(PaginationResponse {
        next_page_token,
        result: rows.into_iter().map(T::from).collect(),
    })
}
