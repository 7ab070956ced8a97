//! Relational schema for synchronised inventory.

use rusqlite::{Connection, Transaction};

use super::StoreError;

/// Version recorded by [`initialise_schema`].
pub const SCHEMA_VERSION: i64 = 1;

/// Create the customers, subnets and devices tables if they are missing.
///
/// Foreign keys are enabled on the connection. Subnets reference customers
/// through a nullable column; devices reference subnets. Existing databases
/// must already record [`SCHEMA_VERSION`]; anything else is rejected.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use ipam_core::store::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create asset schema");
/// initialise_schema(&mut conn).expect("schema creation is idempotent");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM asset_schema_version", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, 1);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), StoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| StoreError::Migration {
            step: "enable foreign keys",
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| StoreError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    match recorded_version(&transaction)? {
        Some(SCHEMA_VERSION) => {}
        Some(found) => {
            return Err(StoreError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        None => {
            for &(step, sql) in SCHEMA_STEPS {
                transaction
                    .execute_batch(sql)
                    .map_err(|source| StoreError::Migration { step, source })?;
            }
            transaction
                .execute(
                    "INSERT INTO asset_schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(|source| StoreError::Migration {
                    step: "record schema version",
                    source,
                })?;
            log::debug!("created asset schema version {SCHEMA_VERSION}");
        }
    }

    transaction
        .commit()
        .map_err(|source| StoreError::Migration {
            step: "commit schema transaction",
            source,
        })
}

/// Statements that build an empty database at [`SCHEMA_VERSION`], in order.
const SCHEMA_STEPS: &[(&str, &str)] = &[
    (
        "create customers",
        "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY,
            resource_owner TEXT NOT NULL,
            business_unit TEXT NOT NULL
        )",
    ),
    (
        "create subnets",
        "CREATE TABLE IF NOT EXISTS subnets (
            id INTEGER PRIMARY KEY,
            network TEXT NOT NULL,
            family INTEGER NOT NULL CHECK (family IN (4, 6)),
            mask_bits INTEGER NOT NULL CHECK (mask_bits >= 0 AND mask_bits <= 128),
            range_start BLOB NOT NULL,
            range_end BLOB NOT NULL,
            location TEXT NOT NULL,
            customer_id INTEGER NULL REFERENCES customers(id)
        );
        CREATE INDEX IF NOT EXISTS idx_subnets_range
            ON subnets(family, range_start, range_end)",
    ),
    (
        "create devices",
        "CREATE TABLE IF NOT EXISTS devices (
            id INTEGER NULL,
            ip TEXT NOT NULL,
            family INTEGER NOT NULL CHECK (family IN (4, 6)),
            ip_key BLOB NOT NULL,
            subnet_id INTEGER NOT NULL REFERENCES subnets(id)
        );
        CREATE INDEX IF NOT EXISTS idx_devices_ip_key ON devices(ip_key, subnet_id);
        CREATE INDEX IF NOT EXISTS idx_devices_subnet ON devices(subnet_id)",
    ),
    (
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS asset_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        )",
    ),
];

/// Version stored by an earlier run, or `None` for a fresh database.
fn recorded_version(transaction: &Transaction<'_>) -> Result<Option<i64>, StoreError> {
    let read_error = |source| StoreError::Migration {
        step: "read schema version",
        source,
    };
    let initialised: bool = transaction
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM sqlite_master
                WHERE type = 'table' AND name = 'asset_schema_version'
            )",
            [],
            |row| row.get(0),
        )
        .map_err(read_error)?;
    if !initialised {
        return Ok(None);
    }
    transaction
        .query_row("SELECT MAX(version) FROM asset_schema_version", [], |row| {
            row.get(0)
        })
        .map_err(read_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_unknown_schema_version() {
        let mut conn = Connection::open_in_memory().expect("open database");
        initialise_schema(&mut conn).expect("initialise schema");
        conn.execute("UPDATE asset_schema_version SET version = 2", [])
            .expect("bump version");

        let err = initialise_schema(&mut conn).expect_err("mismatch should fail");
        assert!(matches!(
            err,
            StoreError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found: 2
            }
        ));
    }

    #[rstest]
    fn enforces_device_subnet_reference() {
        let mut conn = Connection::open_in_memory().expect("open database");
        initialise_schema(&mut conn).expect("initialise schema");
        let result = conn.execute(
            "INSERT INTO devices (id, ip, family, ip_key, subnet_id)
                VALUES (1, '10.0.0.1', 4, x'0a000001', 99)",
            [],
        );
        assert!(result.is_err(), "dangling subnet reference should fail");
    }
}
