//! High-level inventory API with fallback on source failure

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::builder::{build_inventory, empty_inventory, host_vars};
use crate::error::InventoryError;
use crate::source::HostSource;
use crate::types::{HostLookup, InventoryDocument};

/// Value produced by the provider together with the failure it recovered from
///
/// `value` is always valid output. `error` is diagnostic only and never
/// part of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    /// Document to emit
    pub value: T,
    /// Source failure that forced the fallback value, if any
    pub error: Option<InventoryError>,
}

impl<T> Outcome<T> {
    fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    fn fallback(value: T, error: InventoryError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    /// Check if the value is a fallback
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Inventory provider
///
/// Pulls a fresh snapshot from the host source on every call.
pub struct InventoryProvider {
    source: Arc<dyn HostSource>,
}

impl InventoryProvider {
    /// Create a provider over a host source
    pub fn new(source: Arc<dyn HostSource>) -> Self {
        Self { source }
    }

    /// Build the full inventory
    ///
    /// Falls back to the empty inventory when the source fails; the failure
    /// is logged and returned in [`Outcome::error`].
    #[instrument(skip(self), fields(source = self.source.source_type()))]
    pub async fn list(&self) -> Outcome<InventoryDocument> {
        match self.source.fetch_active_hosts().await {
            Ok(hosts) => {
                let inventory = build_inventory(&hosts);
                info!(
                    hosts = inventory.host_count(),
                    groups = inventory.groups().len(),
                    "inventory listed"
                );
                Outcome::ok(inventory)
            }
            Err(e) => {
                error!(error = %e, "failed to fetch hosts, returning empty inventory");
                Outcome::fallback(empty_inventory(), e)
            }
        }
    }

    /// Look up one host's variables
    ///
    /// Unknown hosts and source failures both yield an empty lookup.
    #[instrument(skip(self), fields(source = self.source.source_type()))]
    pub async fn host(&self, hostname: &str) -> Outcome<HostLookup> {
        match self.source.fetch_active_hosts().await {
            Ok(hosts) => {
                let lookup = host_vars(&hosts, hostname);
                if !lookup.is_found() {
                    info!(hostname, "host not found");
                }
                Outcome::ok(lookup)
            }
            Err(e) => {
                error!(error = %e, "failed to fetch hosts, returning empty host vars");
                Outcome::fallback(HostLookup::unknown(), e)
            }
        }
    }
}
