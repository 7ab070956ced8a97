use thiserror::Error;

/// Errors raised by asset stores while reading or replacing inventory.
///
/// Keep this type small: it travels inside [`crate::LookupError`] and
/// [`crate::SyncError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Creating the database's parent directory failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to create directory {path}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: camino::Utf8PathBuf,
        /// Filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Location of the database.
        path: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A schema migration step failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Step being applied.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was initialised by an incompatible version.
    #[error("expected asset schema version {expected} but found {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
    /// A SQL statement failed.
    #[cfg(feature = "store-sqlite")]
    #[error("SQLite operation '{operation}' failed")]
    Sqlite {
        /// Operation being performed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A write failed and so did the rollback that followed it.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to roll back from '{operation}' ({source}) because of {rollback}")]
    Rollback {
        /// Operation whose failure triggered the rollback.
        operation: &'static str,
        /// Original failure.
        #[source]
        source: rusqlite::Error,
        /// Failure reported by the rollback itself.
        rollback: rusqlite::Error,
    },
    /// The caller cancelled the operation; nothing was committed.
    #[error("operation '{operation}' was interrupted")]
    Interrupted {
        /// Operation in flight when the interrupt arrived.
        operation: &'static str,
    },
    /// A stored value could not be read back into a domain type.
    #[error("stored row read by '{operation}' is invalid: {reason}")]
    InvalidRow {
        /// Operation reading the row.
        operation: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// The backing store cannot be reached.
    #[error("asset store unavailable: {reason}")]
    Unavailable {
        /// Why the store is unavailable.
        reason: String,
    },
}
