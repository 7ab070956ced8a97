//! Error types emitted by the `ipam` CLI.

use std::sync::Arc;

use ipam_core::{DependencyError, LookupError, StoreError, SyncError};
use ipam_data::device42::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the `ipam` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// An option was supplied with an unusable value.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the invalid option.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {message}")]
    InitLogging {
        /// Description of the failure.
        message: String,
    },
    /// The async runtime driving provider requests failed to start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Opening or querying the asset store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Constructing the Device42 client failed.
    #[error("failed to build Device42 client for {endpoint:?}: {source}")]
    BuildProvider {
        /// Endpoint the client was being built for.
        endpoint: String,
        /// Underlying construction error.
        #[source]
        source: ProviderBuildError,
    },
    /// The sync job failed; the stored inventory is unchanged.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// A lookup or listing was rejected or failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A dependency failed its readiness check.
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Render the error followed by each underlying cause not already shown.
    #[must_use]
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            let text = err.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            cause = err.source();
        }
        message
    }
}
