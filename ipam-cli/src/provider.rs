//! Device42 client settings shared by the `sync` and `check` commands.

use std::num::NonZeroU32;
use std::time::Duration;

use ipam_core::{DependencyCheck, IpamDataFetcher};
use ipam_data::device42::{
    ContactSearchOrder, DEFAULT_PAGE_LIMIT, Device42Client, Device42Config,
};

use crate::{ARG_ENDPOINT, ARG_PAGE_LIMIT, ARG_TIMEOUT_SECS, CliError};

/// Provider options after configuration layering, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProviderOptions {
    pub(crate) endpoint: Option<String>,
    pub(crate) page_limit: Option<u32>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) contact_search_order: Option<String>,
}

impl ProviderOptions {
    /// Validate the options, naming `env_endpoint` when the endpoint is
    /// missing.
    pub(crate) fn into_config(
        self,
        env_endpoint: &'static str,
    ) -> Result<Device42Config, CliError> {
        let endpoint = self.endpoint.ok_or(CliError::MissingArgument {
            field: ARG_ENDPOINT,
            env: env_endpoint,
        })?;
        let page_limit = match self.page_limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(limit) => NonZeroU32::new(limit).ok_or(CliError::InvalidArgument {
                field: ARG_PAGE_LIMIT,
                reason: "must be greater than zero",
            })?,
        };
        let contact_search_order = self
            .contact_search_order
            .as_deref()
            .map_or_else(ContactSearchOrder::default, ContactSearchOrder::from_csv);

        let mut config = Device42Config::new(endpoint)
            .with_page_limit(page_limit)
            .with_contact_search_order(contact_search_order);
        match self.timeout_secs {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_TIMEOUT_SECS,
                    reason: "must be greater than zero",
                });
            }
            Some(secs) => config = config.with_timeout(Duration::from_secs(secs)),
            None => {}
        }
        Ok(config)
    }
}

/// An inventory source that can also report its own health.
pub(crate) trait Provider: IpamDataFetcher + DependencyCheck {}

impl<T: IpamDataFetcher + DependencyCheck> Provider for T {}

/// Builds the provider for the current invocation.
pub(crate) trait ProviderBuilder {
    fn build(&self, config: &Device42Config) -> Result<Box<dyn Provider>, CliError>;
}

/// Connects to a live Device42 instance.
pub(crate) struct Device42ProviderBuilder;

impl ProviderBuilder for Device42ProviderBuilder {
    fn build(&self, config: &Device42Config) -> Result<Box<dyn Provider>, CliError> {
        let client = Device42Client::with_config(config.clone()).map_err(|source| {
            CliError::BuildProvider {
                endpoint: config.endpoint.clone(),
                source,
            }
        })?;
        Ok(Box::new(client))
    }
}
