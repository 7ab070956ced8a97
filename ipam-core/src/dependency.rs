//! Readiness checks for the provider and the store.

use async_trait::async_trait;
use thiserror::Error;

/// A dependency failed its readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// The named dependency did not answer as expected.
    #[error("dependency {name} is unavailable: {reason}")]
    Unavailable {
        /// Dependency name, e.g. `device42` or `sqlite`.
        name: &'static str,
        /// What went wrong.
        reason: String,
    },
}

/// Something the service needs in order to sync or answer lookups.
#[async_trait(?Send)]
pub trait DependencyCheck {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Succeed when the dependency is reachable and healthy.
    async fn check_dependencies(&self) -> Result<(), DependencyError>;
}

/// Runs several checks in order and stops at the first failure.
#[derive(Default)]
pub struct MultiDependencyCheck<'a> {
    checks: Vec<&'a dyn DependencyCheck>,
}

impl std::fmt::Debug for MultiDependencyCheck<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.checks.iter().map(|check| check.name()).collect();
        f.debug_struct("MultiDependencyCheck")
            .field("checks", &names)
            .finish()
    }
}

impl<'a> MultiDependencyCheck<'a> {
    /// An empty check list, which always succeeds.
    #[must_use]
    pub const fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check.
    #[must_use]
    pub fn with(mut self, check: &'a dyn DependencyCheck) -> Self {
        self.checks.push(check);
        self
    }
}

#[async_trait(?Send)]
impl DependencyCheck for MultiDependencyCheck<'_> {
    fn name(&self) -> &'static str {
        "all"
    }

    async fn check_dependencies(&self) -> Result<(), DependencyError> {
        for check in &self.checks {
            check.check_dependencies().await?;
            log::debug!("dependency {} is healthy", check.name());
        }
        Ok(())
    }
}
