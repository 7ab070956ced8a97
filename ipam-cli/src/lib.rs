//! Command-line interface for the IPAM facade.
//!
//! `ipam sync` drains Device42 into the local asset store, `ipam lookup`
//! resolves one address, `ipam list` pages through stored subnets or
//! addresses, and `ipam check` probes both dependencies. Every command
//! prints JSON on stdout; diagnostics go to stderr through the log
//! subscriber.
#![forbid(unsafe_code)]

use std::future::Future;
use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod check;
mod error;
mod list;
mod logging;
mod lookup;
mod provider;
mod sync;

pub use error::CliError;

use check::{CheckArgs, run_check};
use list::{ListArgs, run_list};
use lookup::{LookupArgs, run_lookup};
use sync::{SyncArgs, run_sync_command};

const ARG_DATABASE: &str = "database";
const ARG_ENDPOINT: &str = "endpoint";
const ARG_PAGE_LIMIT: &str = "page-limit";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_CONTACT_SEARCH_ORDER: &str = "contact-search-order";
const ARG_JOB_ID: &str = "job-id";
const ARG_IP: &str = "ip";
const ARG_RESOURCE: &str = "resource";
const ARG_LIMIT: &str = "limit";
const ARG_OFFSET: &str = "offset";
const ARG_NEXT_PAGE_TOKEN: &str = "next-page-token";
const ARG_DEFAULT_PAGE_SIZE: &str = "default-page-size";
const ENV_SYNC_DATABASE: &str = "IPAM_CMDS_SYNC_DATABASE";
const ENV_SYNC_ENDPOINT: &str = "IPAM_CMDS_SYNC_ENDPOINT";
const ENV_CHECK_DATABASE: &str = "IPAM_CMDS_CHECK_DATABASE";
const ENV_CHECK_ENDPOINT: &str = "IPAM_CMDS_CHECK_ENDPOINT";
const ENV_LOOKUP_DATABASE: &str = "IPAM_CMDS_LOOKUP_DATABASE";
const ENV_LOOKUP_IP: &str = "IPAM_CMDS_LOOKUP_IP";
const ENV_LIST_DATABASE: &str = "IPAM_CMDS_LIST_DATABASE";
const ENV_LIST_RESOURCE: &str = "IPAM_CMDS_LIST_RESOURCE";

/// Run the `ipam` CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::init_logging()?;
    match cli.command {
        Command::Sync(args) => run_sync_command(args),
        Command::Lookup(args) => run_lookup(args),
        Command::List(args) => run_list(args),
        Command::Check(args) => run_check(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ipam",
    about = "Synchronise IPAM/CMDB inventory and resolve addresses to assets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the local asset store with a fresh Device42 snapshot.
    Sync(SyncArgs),
    /// Resolve an IP address to its owning subnet, customer and device.
    Lookup(LookupArgs),
    /// Page through stored subnets or addresses.
    List(ListArgs),
    /// Probe Device42 and the asset store.
    Check(CheckArgs),
}

/// Drive `future` on a current-thread runtime private to this command.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
