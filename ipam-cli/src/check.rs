//! Check command: probe Device42 and the asset store.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ipam_core::{DependencyCheck, MultiDependencyCheck, SqliteAssetStore};
use ipam_data::device42::Device42Config;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::provider::{Device42ProviderBuilder, ProviderBuilder, ProviderOptions};
use crate::{
    ARG_DATABASE, ARG_ENDPOINT, ARG_TIMEOUT_SECS, CliError, ENV_CHECK_DATABASE,
    ENV_CHECK_ENDPOINT, block_on, write_json,
};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Verify that Device42 answers its health endpoint and that \
                 the asset store accepts queries. Checks run in order and \
                 stop at the first failure.",
    about = "Probe Device42 and the asset store"
)]
#[ortho_config(prefix = "IPAM")]
pub(crate) struct CheckArgs {
    /// Path to the SQLite asset store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of the Device42 instance.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// Request timeout in seconds (default 30).
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl CheckArgs {
    pub(crate) fn into_config(self) -> Result<CheckConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CheckConfig::try_from(merged)
    }
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct CheckConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) provider: Device42Config,
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_CHECK_DATABASE,
        })?;
        let provider = ProviderOptions {
            endpoint: args.endpoint,
            timeout_secs: args.timeout_secs,
            ..ProviderOptions::default()
        }
        .into_config(ENV_CHECK_ENDPOINT)?;
        Ok(Self { database, provider })
    }
}

/// Outcome of a passing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CheckReport {
    pub(crate) healthy: bool,
    pub(crate) dependencies: Vec<String>,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_check_with(args, &Device42ProviderBuilder, &mut stdout)
}

pub(crate) fn run_check_with(
    args: CheckArgs,
    builder: &dyn ProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let provider = builder.build(&config.provider)?;
    let store = SqliteAssetStore::open(&config.database)?;
    let checks = MultiDependencyCheck::new().with(&*provider).with(&store);
    block_on(checks.check_dependencies())??;
    let report = CheckReport {
        healthy: true,
        dependencies: vec![provider.name().to_owned(), store.name().to_owned()],
    };
    write_json(writer, &report)
}
