//! List command: page through stored subnets or addresses.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ipam_core::SqliteAssetStore;
use ipam_core::api::{
    DEFAULT_PAGE_SIZE, NextPageRequest, PaginationRequest, list_ips, list_ips_from_token,
    list_subnets, list_subnets_from_token,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_DEFAULT_PAGE_SIZE, ARG_LIMIT, ARG_NEXT_PAGE_TOKEN, ARG_OFFSET,
    ARG_RESOURCE, CliError, ENV_LIST_DATABASE, ENV_LIST_RESOURCE, write_json,
};

/// Collections that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ListResource {
    /// Stored subnets, with their customer's owner and business unit.
    Subnets,
    /// Stored device addresses, with their subnet's attributes.
    Ips,
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Page through stored subnets or addresses. A full page \
                 carries a next page token; pass it back with \
                 --next-page-token to continue, in which case --limit and \
                 --offset are ignored.",
    about = "Page through stored subnets or addresses"
)]
#[ortho_config(prefix = "IPAM")]
pub(crate) struct ListArgs {
    /// Collection to list.
    #[arg(value_enum, value_name = ARG_RESOURCE)]
    #[serde(default)]
    pub(crate) resource: Option<ListResource>,
    /// Path to the SQLite asset store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Rows per page; zero selects the default page size.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<u32>,
    /// Rows to skip.
    #[arg(long = ARG_OFFSET, value_name = "count")]
    #[serde(default)]
    pub(crate) offset: Option<u32>,
    /// Token returned with a previous page.
    #[arg(long = ARG_NEXT_PAGE_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
    /// Page size used when no limit is given (default 100).
    #[arg(long = ARG_DEFAULT_PAGE_SIZE, value_name = "count")]
    #[serde(default)]
    pub(crate) default_page_size: Option<u32>,
}

impl ListArgs {
    pub(crate) fn into_config(self) -> Result<ListConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ListConfig::try_from(merged)
    }
}

/// Which page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageSelector {
    First(PaginationRequest),
    Next(NextPageRequest),
}

/// Resolved `list` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) resource: ListResource,
    pub(crate) page: PageSelector,
    pub(crate) default_page_size: u32,
}

impl TryFrom<ListArgs> for ListConfig {
    type Error = CliError;

    fn try_from(args: ListArgs) -> Result<Self, Self::Error> {
        let resource = args.resource.ok_or(CliError::MissingArgument {
            field: ARG_RESOURCE,
            env: ENV_LIST_RESOURCE,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_LIST_DATABASE,
        })?;
        let default_page_size = match args.default_page_size {
            None => DEFAULT_PAGE_SIZE,
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_DEFAULT_PAGE_SIZE,
                    reason: "must be greater than zero",
                });
            }
            Some(size) => size,
        };
        let page = match args.next_page_token {
            Some(next_page_token) => PageSelector::Next(NextPageRequest { next_page_token }),
            None => PageSelector::First(PaginationRequest {
                limit: args.limit,
                offset: args.offset,
            }),
        };
        Ok(Self {
            database,
            resource,
            page,
            default_page_size,
        })
    }
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_list_with(args, &mut stdout)
}

pub(crate) fn run_list_with(args: ListArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = SqliteAssetStore::open_existing(&config.database)?;
    match (config.resource, &config.page) {
        (ListResource::Subnets, PageSelector::First(request)) => {
            let page = list_subnets(&store, *request, config.default_page_size)?;
            write_json(writer, &page)
        }
        (ListResource::Subnets, PageSelector::Next(request)) => {
            let page = list_subnets_from_token(&store, request, config.default_page_size)?;
            write_json(writer, &page)
        }
        (ListResource::Ips, PageSelector::First(request)) => {
            let page = list_ips(&store, *request, config.default_page_size)?;
            write_json(writer, &page)
        }
        (ListResource::Ips, PageSelector::Next(request)) => {
            let page = list_ips_from_token(&store, request, config.default_page_size)?;
            write_json(writer, &page)
        }
    }
}
