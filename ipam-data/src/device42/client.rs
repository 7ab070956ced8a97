//! HTTP transport for the Device42 REST API.
//!
//! [`Device42Client`] owns the HTTP client and configuration and hands out one
//! fetcher per resource. Every resource shares the client's timeout and user
//! agent; any non-success status is an error regardless of the body.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use ipam_core::{
    DependencyCheck, DependencyError, FetchError, IpamData, IpamDataFetcher, SyncOrchestrator,
};
use reqwest::{Client, StatusCode, Url};

use super::contacts::ContactSearchOrder;
use super::customer::Device42CustomerFetcher;
use super::device::Device42DeviceFetcher;
use super::page::{DocumentFetcher, Page, PageFetcher};
use super::subnet::Device42SubnetFetcher;

/// Error type for [`Device42Client`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// The endpoint is not an absolute URL.
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser message.
        message: String,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint { endpoint, message } => {
                write!(f, "invalid Device42 endpoint {endpoint:?}: {message}")
            }
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEndpoint { .. } => None,
            Self::HttpClient(err) => Some(err),
        }
    }
}

/// Default user agent for Device42 requests.
pub const DEFAULT_USER_AGENT: &str = "ipam-facade/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_LIMIT: NonZeroU32 = match NonZeroU32::new(1000) {
    Some(limit) => limit,
    None => NonZeroU32::MIN,
};

const CUSTOMERS_PATH: &str = "api/1.0/customers";
const SUBNETS_PATH: &str = "api/1.0/subnets";
const IPS_PATH: &str = "api/1.0/ips";
const HEALTH_PATH: &str = "api/1.0/vrfgroup";

/// Configuration for [`Device42Client`].
#[derive(Debug, Clone)]
pub struct Device42Config {
    /// Base URL of the Device42 instance (e.g., `"https://d42.example.com"`).
    pub endpoint: String,
    /// Records requested per page. Zero would never advance a page iterator.
    pub page_limit: NonZeroU32,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Contact types consulted when choosing a customer's resource owner.
    pub contact_search_order: ContactSearchOrder,
}

impl Default for Device42Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost".to_owned(),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            contact_search_order: ContactSearchOrder::default(),
        }
    }
}

impl Device42Config {
    /// Create a new configuration with the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: NonZeroU32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the contact search order.
    #[must_use]
    pub fn with_contact_search_order(mut self, order: ContactSearchOrder) -> Self {
        self.contact_search_order = order;
        self
    }
}

/// Orchestrator wired to a [`Device42Client`]'s three resources.
pub type Device42Orchestrator<'a> = SyncOrchestrator<
    Device42CustomerFetcher<HttpResource<'a>>,
    Device42SubnetFetcher<HttpResource<'a>>,
    Device42DeviceFetcher<HttpResource<'a>>,
>;

/// Client for one Device42 instance.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use ipam_core::IpamDataFetcher;
/// use ipam_data::device42::{Device42Client, Device42Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Device42Config::new("https://d42.example.com")
///     .with_timeout(Duration::from_secs(60));
/// let client = Device42Client::with_config(config)?;
/// let data = client.orchestrator().fetch_ipam_data().await?;
/// println!("fetched {} subnets", data.subnets.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Device42Client {
    client: Client,
    config: Device42Config,
}

impl Device42Client {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client fails
    /// to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(Device42Config::new(endpoint))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: Device42Config) -> Result<Self, ProviderBuildError> {
        Url::parse(&config.endpoint).map_err(|err| ProviderBuildError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            message: err.to_string(),
        })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Device42Config {
        &self.config
    }

    /// Fetcher for the unpaginated customer resource.
    #[must_use]
    pub fn customers(&self) -> Device42CustomerFetcher<HttpResource<'_>> {
        Device42CustomerFetcher::new(
            self.resource("customers", CUSTOMERS_PATH),
            self.config.contact_search_order.clone(),
        )
    }

    /// Fetcher for the paged subnet resource.
    #[must_use]
    pub fn subnets(&self) -> Device42SubnetFetcher<HttpResource<'_>> {
        Device42SubnetFetcher::new(self.resource("subnets", SUBNETS_PATH), self.config.page_limit)
    }

    /// Fetcher for the paged address resource.
    #[must_use]
    pub fn devices(&self) -> Device42DeviceFetcher<HttpResource<'_>> {
        Device42DeviceFetcher::new(self.resource("ips", IPS_PATH), self.config.page_limit)
    }

    /// Orchestrator draining customers, subnets, then devices.
    #[must_use]
    pub fn orchestrator(&self) -> Device42Orchestrator<'_> {
        SyncOrchestrator::new(self.customers(), self.subnets(), self.devices())
    }

    fn resource(&self, resource: &'static str, path: &str) -> HttpResource<'_> {
        HttpResource {
            client: self,
            resource,
            url: self.resource_url(path),
        }
    }

    /// Join `path` onto the endpoint, tolerating a trailing slash.
    fn resource_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    /// GET `url` and return the body of a successful response.
    async fn get(&self, url: &str, query: &[(&str, u64)]) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        Ok(body.to_vec())
    }

    /// Convert a reqwest error to a `FetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl IpamDataFetcher for Device42Client {
    async fn fetch_ipam_data(&self) -> Result<IpamData, FetchError> {
        self.orchestrator().fetch_ipam_data().await
    }
}

#[async_trait(?Send)]
impl DependencyCheck for Device42Client {
    fn name(&self) -> &'static str {
        "device42"
    }

    /// Succeed only when the instance answers `200 OK`.
    async fn check_dependencies(&self) -> Result<(), DependencyError> {
        let url = self.resource_url(HEALTH_PATH);
        let unavailable = |reason: String| DependencyError::Unavailable {
            name: self.name(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| unavailable(self.convert_reqwest_error(&err, &url).to_string()))?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(unavailable(format!(
                "unexpected status {} from {url}",
                status.as_u16()
            ))),
        }
    }
}

/// One Device42 collection endpoint.
#[derive(Debug, Clone)]
pub struct HttpResource<'a> {
    client: &'a Device42Client,
    resource: &'static str,
    url: String,
}

impl HttpResource<'_> {
    /// Fully qualified collection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl PageFetcher for HttpResource<'_> {
    async fn fetch_page(&self, limit: u32, offset: u64) -> Result<Page, FetchError> {
        let query = [("limit", u64::from(limit)), ("offset", offset)];
        let body = self.client.get(&self.url, &query).await?;
        Page::from_body(self.resource, body)
    }
}

#[async_trait(?Send)]
impl DocumentFetcher for HttpResource<'_> {
    async fn fetch_document(&self) -> Result<Vec<u8>, FetchError> {
        self.client.get(&self.url, &[]).await
    }
}
