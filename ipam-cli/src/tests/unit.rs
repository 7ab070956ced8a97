//! Focused unit tests covering argument parsing and configuration
//! resolution.

use super::*;
use crate::check::{CheckArgs, CheckConfig};
use crate::list::{ListArgs, ListConfig, ListResource, PageSelector};
use crate::lookup::{LookupArgs, LookupConfig};
use crate::sync::{SyncArgs, SyncConfig, config_from_layers_for_test};
use camino::Utf8PathBuf;
use ipam_core::api::{DEFAULT_PAGE_SIZE, NextPageRequest, PaginationRequest};
use ipam_data::device42::{ContactSearchOrder, DEFAULT_PAGE_LIMIT};
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;

fn sync_args() -> SyncArgs {
    SyncArgs {
        database: Some(Utf8PathBuf::from("state/assets.db")),
        endpoint: Some("https://d42.example.com".to_owned()),
        ..SyncArgs::default()
    }
}

fn expect_missing(err: CliError, expected_field: &str, expected_env: &str) {
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

fn expect_invalid(err: CliError, expected_field: &str) {
    match err {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn sync_without_database_errors() {
    let args = SyncArgs {
        database: None,
        ..sync_args()
    };
    let err = SyncConfig::try_from(args).expect_err("missing database should error");
    expect_missing(err, ARG_DATABASE, ENV_SYNC_DATABASE);
}

#[rstest]
fn sync_without_endpoint_errors() {
    let args = SyncArgs {
        endpoint: None,
        ..sync_args()
    };
    let err = SyncConfig::try_from(args).expect_err("missing endpoint should error");
    expect_missing(err, ARG_ENDPOINT, ENV_SYNC_ENDPOINT);
}

#[rstest]
fn sync_config_applies_provider_defaults() {
    let config = SyncConfig::try_from(sync_args()).expect("config should build");
    assert_eq!(config.database, Utf8PathBuf::from("state/assets.db"));
    assert_eq!(config.provider.endpoint, "https://d42.example.com");
    assert_eq!(config.provider.page_limit, DEFAULT_PAGE_LIMIT);
    assert_eq!(config.provider.timeout, Duration::from_secs(30));
    assert_eq!(
        config.provider.contact_search_order,
        ContactSearchOrder::default()
    );
    assert_eq!(config.job.id, None);
}

#[rstest]
fn sync_config_honours_explicit_settings() {
    let args = SyncArgs {
        page_limit: Some(250),
        timeout_secs: Some(5),
        contact_search_order: Some("SRE, Technical".to_owned()),
        job_id: Some("nightly".to_owned()),
        ..sync_args()
    };
    let config = SyncConfig::try_from(args).expect("config should build");
    assert_eq!(config.provider.page_limit.get(), 250);
    assert_eq!(config.provider.timeout, Duration::from_secs(5));
    assert_eq!(
        config.provider.contact_search_order.types(),
        ["SRE", "Technical"]
    );
    assert_eq!(config.job.id.as_deref(), Some("nightly"));
}

#[rstest]
#[case::page_limit(Some(0), None, ARG_PAGE_LIMIT)]
#[case::timeout(None, Some(0), ARG_TIMEOUT_SECS)]
fn sync_rejects_zero_provider_settings(
    #[case] page_limit: Option<u32>,
    #[case] timeout_secs: Option<u64>,
    #[case] expected_field: &str,
) {
    let args = SyncArgs {
        page_limit,
        timeout_secs,
        ..sync_args()
    };
    let err = SyncConfig::try_from(args).expect_err("zero setting should error");
    expect_invalid(err, expected_field);
}

#[rstest]
fn check_requires_an_endpoint() {
    let args = CheckArgs {
        database: Some(Utf8PathBuf::from("assets.db")),
        ..CheckArgs::default()
    };
    let err = CheckConfig::try_from(args).expect_err("missing endpoint should error");
    expect_missing(err, ARG_ENDPOINT, ENV_CHECK_ENDPOINT);
}

#[rstest]
fn check_requires_a_database() {
    let args = CheckArgs {
        endpoint: Some("https://d42.example.com".to_owned()),
        ..CheckArgs::default()
    };
    let err = CheckConfig::try_from(args).expect_err("missing database should error");
    expect_missing(err, ARG_DATABASE, ENV_CHECK_DATABASE);
}

#[rstest]
#[case::missing_ip(None, Some("assets.db"), ARG_IP, ENV_LOOKUP_IP)]
#[case::missing_database(Some("10.0.0.1"), None, ARG_DATABASE, ENV_LOOKUP_DATABASE)]
fn lookup_reports_missing_arguments(
    #[case] ip: Option<&str>,
    #[case] database: Option<&str>,
    #[case] expected_field: &str,
    #[case] expected_env: &str,
) {
    let args = LookupArgs {
        ip: ip.map(str::to_owned),
        database: database.map(Utf8PathBuf::from),
    };
    let err = LookupConfig::try_from(args).expect_err("missing argument should error");
    expect_missing(err, expected_field, expected_env);
}

#[rstest]
fn list_without_resource_errors() {
    let args = ListArgs {
        database: Some(Utf8PathBuf::from("assets.db")),
        ..ListArgs::default()
    };
    let err = ListConfig::try_from(args).expect_err("missing resource should error");
    expect_missing(err, ARG_RESOURCE, ENV_LIST_RESOURCE);
}

#[rstest]
fn list_defaults_to_the_first_page() {
    let args = ListArgs {
        resource: Some(ListResource::Ips),
        database: Some(Utf8PathBuf::from("assets.db")),
        ..ListArgs::default()
    };
    let config = ListConfig::try_from(args).expect("config should build");
    assert_eq!(config.resource, ListResource::Ips);
    assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(
        config.page,
        PageSelector::First(PaginationRequest::default())
    );
}

#[rstest]
fn list_token_takes_precedence_over_position() {
    let args = ListArgs {
        resource: Some(ListResource::Subnets),
        database: Some(Utf8PathBuf::from("assets.db")),
        limit: Some(5),
        offset: Some(10),
        next_page_token: Some("token".to_owned()),
        default_page_size: None,
    };
    let config = ListConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.page,
        PageSelector::Next(NextPageRequest {
            next_page_token: "token".to_owned(),
        })
    );
}

#[rstest]
fn list_rejects_zero_default_page_size() {
    let args = ListArgs {
        resource: Some(ListResource::Subnets),
        database: Some(Utf8PathBuf::from("assets.db")),
        default_page_size: Some(0),
        ..ListArgs::default()
    };
    let err = ListConfig::try_from(args).expect_err("zero page size should error");
    expect_invalid(err, ARG_DEFAULT_PAGE_SIZE);
}

#[rstest]
fn parses_list_positional_resource() {
    let cli = Cli::try_parse_from([
        "ipam",
        "list",
        "subnets",
        "--database",
        "assets.db",
        "--limit",
        "5",
    ])
    .expect("arguments parse");
    match cli.command {
        Command::List(args) => {
            assert_eq!(args.resource, Some(ListResource::Subnets));
            assert_eq!(args.limit, Some(5));
            assert_eq!(args.database, Some(Utf8PathBuf::from("assets.db")));
        }
        other => panic!("expected list command, found {other:?}"),
    }
}

#[rstest]
fn rejects_unknown_list_resource() {
    let err = Cli::try_parse_from(["ipam", "list", "routers"]).expect_err("unknown resource");
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
}

#[rstest]
fn parses_sync_provider_flags() {
    let cli = Cli::try_parse_from([
        "ipam",
        "sync",
        "--endpoint",
        "https://d42.example.com",
        "--page-limit",
        "50",
        "--contact-search-order",
        "SRE,Technical",
        "--job-id",
        "manual",
    ])
    .expect("arguments parse");
    match cli.command {
        Command::Sync(args) => {
            assert_eq!(args.endpoint.as_deref(), Some("https://d42.example.com"));
            assert_eq!(args.page_limit, Some(50));
            assert_eq!(args.contact_search_order.as_deref(), Some("SRE,Technical"));
            assert_eq!(args.job_id.as_deref(), Some("manual"));
        }
        other => panic!("expected sync command, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "page_limit": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "endpoint": "https://file.example.com",
            "page_limit": 10,
        }),
        None,
    );
    composer.push_environment(json!({
        "endpoint": "https://env.example.com",
        "contact_search_order": "Technical",
    }));
    composer.push_cli(json!({ "page_limit": 20 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.database, Utf8PathBuf::from("from-file.db"));
    assert_eq!(config.provider.endpoint, "https://env.example.com");
    assert_eq!(config.provider.page_limit.get(), 20);
    assert_eq!(config.provider.contact_search_order.types(), ["Technical"]);
}

#[rstest]
fn report_includes_underlying_store_failure() {
    let mut store = ipam_core::SqliteAssetStore::open_in_memory().expect("open store");
    let orphan = ipam_core::IpamData {
        devices: vec![ipam_core::test_support::device(Some(1), "10.0.0.1", 99)],
        ..ipam_core::IpamData::default()
    };
    let err = ipam_core::PhysicalAssetStorer::store_physical_assets(&mut store, &orphan)
        .expect_err("dangling subnet reference");

    let report = CliError::from(err).report();
    assert!(report.contains("insert device"), "{report}");
    assert!(report.contains("FOREIGN KEY constraint failed"), "{report}");
}

#[rstest]
fn report_does_not_repeat_inlined_causes() {
    let err = CliError::WriteOutput(std::io::Error::other("pipe closed"));
    assert_eq!(err.report(), "failed to write output: pipe closed");
}
