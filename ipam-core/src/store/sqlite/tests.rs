//! Unit tests for the SQLite asset store.

use super::*;
use crate::test_support::{customer, device, subnet};
use rstest::{fixture, rstest};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

#[fixture]
fn store() -> SqliteAssetStore {
    SqliteAssetStore::open_in_memory().expect("open in-memory store")
}

#[fixture]
fn inventory() -> IpamData {
    IpamData {
        customers: vec![
            customer(1, "alice@x.com", "Sec"),
            customer(2, "bob@x.com", "Ops"),
        ],
        subnets: vec![
            subnet(1, "127.0.0.0/24", "dc1", Some(1)),
            subnet(2, "127.0.0.252/30", "dc1-rack4", Some(1)),
            subnet(3, "10.0.0.0/8", "dc2", None),
            subnet(4, "2001:db8::/32", "dc3", Some(2)),
        ],
        devices: vec![
            device(Some(42), "10.0.0.5", 3),
            device(None, "10.0.0.6", 3),
            device(Some(7), "2001:db8::7", 4),
        ],
    }
}

fn loaded(mut store: SqliteAssetStore, data: &IpamData) -> SqliteAssetStore {
    store.store_physical_assets(data).expect("store inventory");
    store
}

#[rstest]
fn resolves_single_containing_subnet(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let asset = store.fetch_physical_asset("127.0.0.1").expect("asset found");
    assert_eq!(
        asset,
        PhysicalAsset {
            ip: "127.0.0.1".parse().expect("valid address"),
            resource_owner: "alice@x.com".to_owned(),
            business_unit: "Sec".to_owned(),
            network: "127.0.0.0/24".parse().expect("valid prefix"),
            location: "dc1".to_owned(),
            device_id: 0,
            subnet_id: 1,
            customer_id: 1,
        }
    );
}

#[rstest]
fn prefers_most_specific_subnet(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let asset = store.fetch_physical_asset("127.0.0.253").expect("asset found");
    assert_eq!(asset.subnet_id, 2);
    assert_eq!(asset.network.to_string(), "127.0.0.252/30");
}

#[rstest]
fn bound_device_outranks_specificity(store: SqliteAssetStore) {
    let data = IpamData {
        customers: vec![customer(1, "alice@x.com", "Sec")],
        subnets: vec![
            subnet(1, "10.0.0.0/8", "wide", Some(1)),
            subnet(2, "10.1.0.0/16", "narrow", Some(1)),
        ],
        devices: vec![device(Some(99), "10.1.2.3", 1)],
    };
    let store = loaded(store, &data);

    let asset = store.fetch_physical_asset("10.1.2.3").expect("asset found");
    assert_eq!((asset.subnet_id, asset.device_id), (1, 99));

    let other = store.fetch_physical_asset("10.1.2.4").expect("asset found");
    assert_eq!((other.subnet_id, other.device_id), (2, 0));
}

#[rstest]
fn device_without_identifier_still_binds(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let asset = store.fetch_physical_asset("10.0.0.6").expect("asset found");
    assert_eq!(asset.device_id, 0);
    assert_eq!(asset.subnet_id, 3);
}

#[rstest]
fn missing_customer_defaults_to_empty(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let asset = store.fetch_physical_asset("10.0.0.5").expect("asset found");
    assert_eq!(asset.device_id, 42);
    assert_eq!(asset.customer_id, 0);
    assert!(asset.resource_owner.is_empty());
    assert!(asset.business_unit.is_empty());
}

#[rstest]
fn resolves_ipv6_addresses(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let asset = store.fetch_physical_asset("2001:DB8::7").expect("asset found");
    assert_eq!(asset.ip.to_string(), "2001:db8::7");
    assert_eq!((asset.subnet_id, asset.device_id), (4, 7));
    assert_eq!(asset.resource_owner, "bob@x.com");
}

#[rstest]
#[case("192.168.1.1")]
#[case("::ffff:7f00:1")]
#[case("2001:db9::1")]
fn uncovered_address_is_not_found(
    store: SqliteAssetStore,
    inventory: IpamData,
    #[case] ip: &str,
) {
    let store = loaded(store, &inventory);
    let err = store.fetch_physical_asset(ip).expect_err("no subnet covers address");
    assert!(matches!(err, LookupError::NotFound { .. }));
}

#[rstest]
fn malformed_address_is_rejected(store: SqliteAssetStore) {
    let err = store
        .fetch_physical_asset("127.0.0.0/24")
        .expect_err("prefix is not an address");
    assert!(matches!(err, LookupError::InvalidInput { .. }));
}

#[rstest]
fn replacing_twice_matches_replacing_once(store: SqliteAssetStore, inventory: IpamData) {
    let mut store = loaded(store, &inventory);
    let once = (
        store.fetch_subnets(100, 0).expect("list subnets"),
        store.fetch_ips(100, 0).expect("list addresses"),
    );
    store
        .store_physical_assets(&inventory)
        .expect("store again");
    let twice = (
        store.fetch_subnets(100, 0).expect("list subnets"),
        store.fetch_ips(100, 0).expect("list addresses"),
    );
    assert_eq!(once, twice);
    assert_eq!(twice.0.len(), 4);
    assert_eq!(twice.1.len(), 3);
}

#[rstest]
fn failed_replace_keeps_prior_rows(store: SqliteAssetStore, inventory: IpamData) {
    let mut store = loaded(store, &inventory);
    let before = store.fetch_ips(100, 0).expect("list addresses");

    let mut broken = inventory.clone();
    broken.devices.push(device(Some(1), "172.16.0.1", 404));
    let err = store
        .store_physical_assets(&broken)
        .expect_err("dangling subnet reference");

    assert!(matches!(
        err,
        StoreError::Sqlite {
            operation: "insert device",
            ..
        }
    ));
    assert_eq!(store.fetch_ips(100, 0).expect("list addresses"), before);
    assert_eq!(
        store
            .fetch_physical_asset("127.0.0.1")
            .expect("asset found")
            .resource_owner,
        "alice@x.com"
    );
}

#[rstest]
fn replace_discards_previous_dataset(store: SqliteAssetStore, inventory: IpamData) {
    let mut store = loaded(store, &inventory);
    let replacement = IpamData {
        customers: vec![customer(5, "carol@x.com", "Net")],
        subnets: vec![subnet(9, "172.16.0.0/12", "dc9", Some(5))],
        devices: Vec::new(),
    };
    store
        .store_physical_assets(&replacement)
        .expect("store replacement");

    assert!(matches!(
        store.fetch_physical_asset("127.0.0.1"),
        Err(LookupError::NotFound { .. })
    ));
    assert!(store.fetch_ips(10, 0).expect("list addresses").is_empty());
    assert_eq!(
        store.fetch_physical_asset("172.16.0.1").expect("asset found").customer_id,
        5
    );
}

#[rstest]
fn listings_page_by_offset(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let first = store.fetch_subnets(3, 0).expect("first page");
    let second = store.fetch_subnets(3, 3).expect("second page");

    let networks: Vec<String> = first
        .iter()
        .chain(second.iter())
        .map(|row| row.network.to_string())
        .collect();
    assert_eq!(
        networks,
        ["127.0.0.0/24", "127.0.0.252/30", "10.0.0.0/8", "2001:db8::/32"]
    );
    assert!(
        store
            .fetch_subnets(3, 6)
            .expect("past the end")
            .is_empty()
    );
}

#[rstest]
fn ip_listing_joins_subnet_and_customer(store: SqliteAssetStore, inventory: IpamData) {
    let store = loaded(store, &inventory);
    let rows = store.fetch_ips(1, 2).expect("list addresses");
    assert_eq!(
        rows,
        vec![AssetIp {
            ip: "2001:db8::7".parse().expect("valid address"),
            network: "2001:db8::/32".parse().expect("valid prefix"),
            resource_owner: "bob@x.com".to_owned(),
            business_unit: "Ops".to_owned(),
            location: "dc3".to_owned(),
        }]
    );
}

#[rstest]
fn opening_on_disk_creates_parent_directories() {
    let dir = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let path = root.join("nested/state/assets.db");

    let mut store = SqliteAssetStore::open(&path).expect("open store");
    store
        .store_physical_assets(&IpamData {
            customers: vec![customer(1, "alice@x.com", "Sec")],
            ..IpamData::default()
        })
        .expect("store inventory");
    drop(store);

    let reopened = SqliteAssetStore::open(&path).expect("reopen store");
    reopened.ping().expect("ping");
    assert!(path.is_file());
}

#[rstest]
fn rollback_error_names_both_failures() {
    let err = StoreError::Rollback {
        operation: "insert device",
        source: rusqlite::Error::InvalidQuery,
        rollback: rusqlite::Error::ExecuteReturnedResults,
    };
    let message = err.to_string();
    assert!(message.contains("insert device"));
    assert!(message.contains(&rusqlite::Error::InvalidQuery.to_string()));
    assert!(message.contains(&rusqlite::Error::ExecuteReturnedResults.to_string()));
}

#[rstest]
fn interrupted_statement_maps_to_interrupted() {
    let source = rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
        None,
    );
    assert!(matches!(
        sqlite_error("insert device", source),
        StoreError::Interrupted {
            operation: "insert device"
        }
    ));
}

#[rstest]
fn opening_existing_does_not_create_a_database() {
    let dir = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let path = root.join("missing/assets.db");

    let err = SqliteAssetStore::open_existing(&path).expect_err("missing database");
    assert!(matches!(err, StoreError::Open { .. }));
    assert!(!path.exists());

    drop(SqliteAssetStore::open(&path).expect("create store"));
    SqliteAssetStore::open_existing(&path)
        .expect("reopen store")
        .ping()
        .expect("ping");
}

#[rstest]
fn cancelled_replace_keeps_the_previous_inventory(store: SqliteAssetStore, inventory: IpamData) {
    let mut store = loaded(store, &inventory);
    let oversized = IpamData {
        customers: (1..=400_000)
            .map(|id| customer(id, "owner@x.com", "Unit"))
            .collect(),
        ..IpamData::default()
    };
    let handle = store.cancel_handle();
    let finished = AtomicBool::new(false);

    let result = std::thread::scope(|scope| {
        scope.spawn(|| {
            while !finished.load(Ordering::Acquire) {
                handle.cancel();
                std::thread::yield_now();
            }
        });
        let result = store.store_physical_assets(&oversized);
        finished.store(true, Ordering::Release);
        result
    });

    let err = result.expect_err("replace is cancelled");
    assert!(
        matches!(err, StoreError::Interrupted { .. }),
        "expected Interrupted, found {err:?}"
    );
    let asset = store
        .fetch_physical_asset("10.0.0.5")
        .expect("previous inventory survives");
    assert_eq!(asset.device_id, 42);
    assert_eq!(asset.subnet_id, 3);
}

#[rstest]
fn cancel_handle_debug_hides_the_connection(store: SqliteAssetStore) {
    assert_eq!(format!("{:?}", store.cancel_handle()), "CancelHandle { .. }");
}
