//! Lookup command: resolve one address against the stored inventory.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ipam_core::SqliteAssetStore;
use ipam_core::api::{IpAddressQuery, lookup_physical_asset};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, ARG_IP, CliError, ENV_LOOKUP_DATABASE, ENV_LOOKUP_IP, write_json};

/// CLI arguments for the `lookup` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve an IPv4 or IPv6 address to the subnet that owns it. \
                 A subnet holding a device bound to the address wins; \
                 otherwise the most specific containing subnet is used.",
    about = "Resolve an address to its physical asset"
)]
#[ortho_config(prefix = "IPAM")]
pub(crate) struct LookupArgs {
    /// Address to resolve.
    #[arg(value_name = ARG_IP)]
    #[serde(default)]
    pub(crate) ip: Option<String>,
    /// Path to the SQLite asset store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl LookupArgs {
    pub(crate) fn into_config(self) -> Result<LookupConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LookupConfig::try_from(merged)
    }
}

/// Resolved `lookup` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LookupConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) query: IpAddressQuery,
}

impl TryFrom<LookupArgs> for LookupConfig {
    type Error = CliError;

    fn try_from(args: LookupArgs) -> Result<Self, Self::Error> {
        let ip_address = args.ip.ok_or(CliError::MissingArgument {
            field: ARG_IP,
            env: ENV_LOOKUP_IP,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_LOOKUP_DATABASE,
        })?;
        Ok(Self {
            database,
            query: IpAddressQuery { ip_address },
        })
    }
}

pub(crate) fn run_lookup(args: LookupArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_lookup_with(args, &mut stdout)
}

pub(crate) fn run_lookup_with(args: LookupArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = SqliteAssetStore::open_existing(&config.database)?;
    let details = lookup_physical_asset(&store, &config.query)?;
    write_json(writer, &details)
}
