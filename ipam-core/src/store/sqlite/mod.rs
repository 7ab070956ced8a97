//! SQLite-backed asset store.
//!
//! One connection serves both the bulk replace and the resolver. Writes run
//! inside an `IMMEDIATE` transaction so a second writer waits on the busy
//! timeout instead of interleaving with an in-flight replace.

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use ipnetwork::IpNetwork;
use rusqlite::{
    Connection, ErrorCode, InterruptHandle, OpenFlags, OptionalExtension, Transaction,
    TransactionBehavior, params,
};

use crate::{
    AssetIp, AssetSubnet, Customer, DependencyCheck, DependencyError, Device, IpamData,
    LookupError, PhysicalAsset, Subnet, parse_ip_address,
};

use super::keys::{AddressKey, RangeKey};
use super::schema::initialise_schema;
use super::{AssetLister, PhysicalAssetFetcher, PhysicalAssetStorer, StoreError};

/// How long a writer waits for a competing transaction before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const LOOKUP_ASSET: &str = "SELECT
        s.id,
        s.network,
        s.location,
        COALESCE(c.id, 0),
        COALESCE(c.resource_owner, ''),
        COALESCE(c.business_unit, ''),
        d.id,
        d.subnet_id IS NOT NULL AS bound
    FROM subnets AS s
    LEFT JOIN devices AS d ON d.subnet_id = s.id AND d.ip_key = ?1
    LEFT JOIN customers AS c ON c.id = s.customer_id
    WHERE s.family = ?2 AND s.range_start <= ?1 AND s.range_end >= ?1
    ORDER BY bound DESC, s.mask_bits DESC, s.id ASC
    LIMIT 1";

const LIST_SUBNETS: &str = "SELECT
        s.network,
        COALESCE(c.resource_owner, ''),
        COALESCE(c.business_unit, ''),
        s.location
    FROM subnets AS s
    LEFT JOIN customers AS c ON c.id = s.customer_id
    ORDER BY s.id
    LIMIT ?1 OFFSET ?2";

const LIST_IPS: &str = "SELECT
        d.ip,
        s.network,
        COALESCE(c.resource_owner, ''),
        COALESCE(c.business_unit, ''),
        s.location
    FROM devices AS d
    JOIN subnets AS s ON s.id = d.subnet_id
    LEFT JOIN customers AS c ON c.id = s.customer_id
    ORDER BY d.rowid
    LIMIT ?1 OFFSET ?2";

/// Asset store persisted in a SQLite database.
pub struct SqliteAssetStore {
    connection: Connection,
    location: String,
}

impl fmt::Debug for SqliteAssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteAssetStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Cancels the statement currently running on a [`SqliteAssetStore`].
///
/// Obtained from [`SqliteAssetStore::cancel_handle`] and safe to use from
/// another thread. A cancelled replace rolls back and reports
/// [`StoreError::Interrupted`].
pub struct CancelHandle(InterruptHandle);

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

impl CancelHandle {
    /// Interrupt the in-flight statement, if any.
    pub fn cancel(&self) {
        self.0.interrupt();
    }
}

impl SqliteAssetStore {
    /// Open (creating if needed) the database at `path` and initialise its
    /// schema.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            StoreError::Open {
                path: path.to_string(),
                source,
            }
        })?;
        Self::with_connection(connection, path.to_string())
    }

    /// Open the database at `path` without creating it.
    ///
    /// Read paths use this so a mistyped location fails with
    /// [`StoreError::Open`] instead of answering from a new empty database.
    pub fn open_existing(path: &Utf8Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection =
            Connection::open_with_flags(path.as_std_path(), flags).map_err(|source| {
                StoreError::Open {
                    path: path.to_string(),
                    source,
                }
            })?;
        Self::with_connection(connection, path.to_string())
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_owned(),
            source,
        })?;
        Self::with_connection(connection, ":memory:".to_owned())
    }

    fn with_connection(mut connection: Connection, location: String) -> Result<Self, StoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|source| sqlite_error("set busy timeout", source))?;
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection,
            location,
        })
    }

    /// Handle for cancelling statements from another thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.connection.get_interrupt_handle())
    }

    /// Verify the database answers queries.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|source| sqlite_error("ping", source))
    }
}

impl PhysicalAssetStorer for SqliteAssetStore {
    fn store_physical_assets(&mut self, data: &IpamData) -> Result<(), StoreError> {
        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| sqlite_error("begin replace transaction", source))?;

        if let Err(failure) = replace_rows(&transaction, data) {
            return Err(roll_back(transaction, failure));
        }

        transaction
            .commit()
            .map_err(|source| sqlite_error("commit replace transaction", source))?;
        log::debug!(
            "replaced stored inventory with {} customers, {} subnets and {} devices",
            data.customers.len(),
            data.subnets.len(),
            data.devices.len()
        );
        Ok(())
    }
}

impl PhysicalAssetFetcher for SqliteAssetStore {
    fn fetch_physical_asset(&self, ip: &str) -> Result<PhysicalAsset, LookupError> {
        let address = parse_ip_address(ip)?;
        let key = AddressKey::of(address);
        let operation = "look up physical asset";

        let mut statement = self
            .connection
            .prepare_cached(LOOKUP_ASSET)
            .map_err(|source| sqlite_error(operation, source))?;
        let row = statement
            .query_row(params![key.octets, key.family], |row| {
                Ok(LookupRow {
                    subnet_id: row.get(0)?,
                    network: row.get(1)?,
                    location: row.get(2)?,
                    customer_id: row.get(3)?,
                    resource_owner: row.get(4)?,
                    business_unit: row.get(5)?,
                    device_id: row.get(6)?,
                })
            })
            .optional()
            .map_err(|source| sqlite_error(operation, source))?;

        let Some(found) = row else {
            return Err(LookupError::NotFound { ip: address });
        };

        Ok(PhysicalAsset {
            ip: address,
            resource_owner: found.resource_owner,
            business_unit: found.business_unit,
            network: parse_stored::<IpNetwork>(&found.network, operation)?,
            location: found.location,
            device_id: found.device_id.unwrap_or(0),
            subnet_id: found.subnet_id,
            customer_id: found.customer_id,
        })
    }
}

impl AssetLister for SqliteAssetStore {
    fn fetch_subnets(&self, limit: u32, offset: u32) -> Result<Vec<AssetSubnet>, StoreError> {
        let operation = "list subnets";
        let mut statement = self
            .connection
            .prepare_cached(LIST_SUBNETS)
            .map_err(|source| sqlite_error(operation, source))?;
        let rows = statement
            .query_map(params![limit, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|source| sqlite_error(operation, source))?;

        let mut subnets = Vec::new();
        for row in rows {
            let (network, resource_owner, business_unit, location) =
                row.map_err(|source| sqlite_error(operation, source))?;
            subnets.push(AssetSubnet {
                network: parse_stored(&network, operation)?,
                resource_owner,
                business_unit,
                location,
            });
        }
        Ok(subnets)
    }

    fn fetch_ips(&self, limit: u32, offset: u32) -> Result<Vec<AssetIp>, StoreError> {
        let operation = "list addresses";
        let mut statement = self
            .connection
            .prepare_cached(LIST_IPS)
            .map_err(|source| sqlite_error(operation, source))?;
        let rows = statement
            .query_map(params![limit, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|source| sqlite_error(operation, source))?;

        let mut ips = Vec::new();
        for row in rows {
            let (ip, network, resource_owner, business_unit, location) =
                row.map_err(|source| sqlite_error(operation, source))?;
            ips.push(AssetIp {
                ip: parse_stored(&ip, operation)?,
                network: parse_stored(&network, operation)?,
                resource_owner,
                business_unit,
                location,
            });
        }
        Ok(ips)
    }
}

#[async_trait(?Send)]
impl DependencyCheck for SqliteAssetStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn check_dependencies(&self) -> Result<(), DependencyError> {
        self.ping().map_err(|err| DependencyError::Unavailable {
            name: "sqlite",
            reason: err.to_string(),
        })
    }
}

struct LookupRow {
    subnet_id: i64,
    network: String,
    location: String,
    customer_id: i64,
    resource_owner: String,
    business_unit: String,
    device_id: Option<i64>,
}

/// A statement that failed inside the replace transaction.
struct StepFailure {
    operation: &'static str,
    source: rusqlite::Error,
}

fn replace_rows(transaction: &Transaction<'_>, data: &IpamData) -> Result<(), StepFailure> {
    // Reverse foreign-key order.
    for (operation, sql) in [
        ("clear devices", "DELETE FROM devices"),
        ("clear subnets", "DELETE FROM subnets"),
        ("clear customers", "DELETE FROM customers"),
    ] {
        transaction
            .execute(sql, [])
            .map_err(|source| StepFailure { operation, source })?;
    }

    insert_customers(transaction, &data.customers)?;
    insert_subnets(transaction, &data.subnets)?;
    insert_devices(transaction, &data.devices)
}

fn insert_customers(
    transaction: &Transaction<'_>,
    customers: &[Customer],
) -> Result<(), StepFailure> {
    let operation = "insert customer";
    let mut statement = transaction
        .prepare_cached(
            "INSERT INTO customers (id, resource_owner, business_unit) VALUES (?1, ?2, ?3)",
        )
        .map_err(|source| StepFailure { operation, source })?;
    for customer in customers {
        statement
            .execute(params![
                customer.id,
                customer.resource_owner,
                customer.business_unit
            ])
            .map_err(|source| StepFailure { operation, source })?;
    }
    Ok(())
}

fn insert_subnets(transaction: &Transaction<'_>, subnets: &[Subnet]) -> Result<(), StepFailure> {
    let operation = "insert subnet";
    let mut statement = transaction
        .prepare_cached(
            "INSERT INTO subnets (
                id, network, family, mask_bits, range_start, range_end, location, customer_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(|source| StepFailure { operation, source })?;
    for subnet in subnets {
        let range = RangeKey::of(&subnet.network);
        statement
            .execute(params![
                subnet.id,
                subnet.network.to_string(),
                range.family,
                subnet.network.prefix(),
                range.start,
                range.end,
                subnet.location,
                subnet.customer_id,
            ])
            .map_err(|source| StepFailure { operation, source })?;
    }
    Ok(())
}

fn insert_devices(transaction: &Transaction<'_>, devices: &[Device]) -> Result<(), StepFailure> {
    let operation = "insert device";
    let mut statement = transaction
        .prepare_cached(
            "INSERT INTO devices (id, ip, family, ip_key, subnet_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|source| StepFailure { operation, source })?;
    for device in devices {
        let key = AddressKey::of(device.ip);
        statement
            .execute(params![
                device.id,
                device.ip.to_string(),
                key.family,
                key.octets,
                device.subnet_id,
            ])
            .map_err(|source| StepFailure { operation, source })?;
    }
    Ok(())
}

/// Abandon the transaction, keeping both causes if the rollback also fails.
///
/// An interrupt (and some I/O failures) make SQLite roll the transaction back
/// on its own, leaving the connection in autocommit mode with nothing to undo.
fn roll_back(transaction: Transaction<'_>, failure: StepFailure) -> StoreError {
    if transaction.is_autocommit() {
        drop(transaction);
        log::warn!(
            "inventory replace abandoned after '{}' failed: {}",
            failure.operation,
            failure.source
        );
        return sqlite_error(failure.operation, failure.source);
    }
    match transaction.rollback() {
        Ok(()) => {
            log::warn!(
                "rolled back inventory replace after '{}' failed: {}",
                failure.operation,
                failure.source
            );
            sqlite_error(failure.operation, failure.source)
        }
        Err(rollback) => StoreError::Rollback {
            operation: failure.operation,
            source: failure.source,
            rollback,
        },
    }
}

fn sqlite_error(operation: &'static str, source: rusqlite::Error) -> StoreError {
    if source.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
        return StoreError::Interrupted { operation };
    }
    StoreError::Sqlite { operation, source }
}

fn parse_stored<T>(text: &str, operation: &'static str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.parse::<T>().map_err(|err| StoreError::InvalidRow {
        operation,
        reason: format!("{text:?}: {err}"),
    })
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    let create_error = |source| StoreError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(create_error)?;
    dir.create_dir_all(Utf8PathBuf::from(relative))
        .map_err(create_error)
}

#[cfg(test)]
mod tests;
