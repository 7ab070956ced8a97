//! Provider adapters feeding the IPAM facade.
//!
//! Responsibilities:
//! - Drain the provider's paginated REST collections.
//! - Map provider JSON into `ipam-core` records, applying the owner and
//!   business-unit extraction rules.
//! - Report provider readiness.
//!
//! Boundaries:
//! - Do not persist anything (lives in `ipam-core::store`).
//! - Do not read configuration from the process environment; every business
//!   rule is passed in explicitly.

#![forbid(unsafe_code)]

pub mod device42;
