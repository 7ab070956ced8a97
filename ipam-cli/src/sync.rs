//! Sync command: replace the local asset store with a Device42 snapshot.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ipam_core::{SqliteAssetStore, SyncJob, SyncReport, run_sync};
use ipam_data::device42::Device42Config;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::provider::{Device42ProviderBuilder, ProviderBuilder, ProviderOptions};
use crate::{
    ARG_CONTACT_SEARCH_ORDER, ARG_DATABASE, ARG_ENDPOINT, ARG_JOB_ID, ARG_PAGE_LIMIT,
    ARG_TIMEOUT_SECS, CliError, ENV_SYNC_DATABASE, ENV_SYNC_ENDPOINT, block_on, write_json,
};

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch every customer, subnet and address from Device42 and \
                 replace the contents of the local asset store with them. \
                 The store is left untouched if any fetch fails.",
    about = "Replace the asset store with a fresh Device42 snapshot"
)]
#[ortho_config(prefix = "IPAM")]
pub(crate) struct SyncArgs {
    /// Path to the SQLite asset store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of the Device42 instance.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// Records requested per page (default 1000).
    #[arg(long = ARG_PAGE_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) page_limit: Option<u32>,
    /// Per-request timeout in seconds (default 30).
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Comma-separated contact types searched for a customer's owner.
    #[arg(long = ARG_CONTACT_SEARCH_ORDER, value_name = "types")]
    #[serde(default)]
    pub(crate) contact_search_order: Option<String>,
    /// Identifier reported in sync logs.
    #[arg(long = ARG_JOB_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) job_id: Option<String>,
}

impl SyncArgs {
    pub(crate) fn into_config(self) -> Result<SyncConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncConfig::try_from(merged)
    }
}

/// Resolved `sync` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct SyncConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) provider: Device42Config,
    pub(crate) job: SyncJob,
}

impl TryFrom<SyncArgs> for SyncConfig {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SYNC_DATABASE,
        })?;
        let provider = ProviderOptions {
            endpoint: args.endpoint,
            page_limit: args.page_limit,
            timeout_secs: args.timeout_secs,
            contact_search_order: args.contact_search_order,
        }
        .into_config(ENV_SYNC_ENDPOINT)?;
        let job = args.job_id.map_or_else(SyncJob::default, SyncJob::with_id);
        Ok(Self {
            database,
            provider,
            job,
        })
    }
}

/// Counts reported after a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SyncSummary {
    pub(crate) job_id: Option<String>,
    pub(crate) customers: usize,
    pub(crate) subnets: usize,
    pub(crate) devices: usize,
}

impl SyncSummary {
    fn new(job: &SyncJob, report: SyncReport) -> Self {
        Self {
            job_id: job.id.clone(),
            customers: report.customers,
            subnets: report.subnets,
            devices: report.devices,
        }
    }
}

pub(crate) fn run_sync_command(args: SyncArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_sync_with(args, &Device42ProviderBuilder, &mut stdout)
}

pub(crate) fn run_sync_with(
    args: SyncArgs,
    builder: &dyn ProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    // Open the store first so a bad path fails before any provider traffic.
    let mut store = SqliteAssetStore::open(&config.database)?;
    let provider = builder.build(&config.provider)?;
    log::debug!(
        "syncing {} into {}",
        config.provider.endpoint,
        config.database
    );
    let report = block_on(run_sync(&*provider, &mut store, &config.job))??;
    write_json(writer, &SyncSummary::new(&config.job, report))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SyncConfig, CliError> {
    let merged = SyncArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SyncConfig::try_from(merged)
}
