//! Folding host records into a grouped inventory

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::error::InventoryError;
use crate::types::{Group, HostLookup, HostRecord, HostVars, InventoryDocument, META_KEY, Meta};

/// Accumulator for an [`InventoryDocument`]
///
/// Each record is folded in with [`InventoryBuilder::push`]. When a hostname
/// repeats, the later record wins both its variables and its group
/// memberships: the host is detached from groups only the earlier record put
/// it in, and groups left empty are dropped.
#[derive(Debug, Default)]
pub struct InventoryBuilder {
    hostvars: BTreeMap<String, HostVars>,
    groups: BTreeMap<String, Group>,
    /// Groups each host currently belongs to
    placements: HashMap<String, [String; 3]>,
}

impl InventoryBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the inventory
    ///
    /// # Errors
    /// Returns [`InventoryError::ReservedGroupName`] if the record would
    /// create a group named `_meta`, or [`InventoryError::GroupCollision`] if
    /// two of its fields derive the same group. The builder is left untouched.
    pub fn push(&mut self, record: &HostRecord) -> Result<(), InventoryError> {
        let groups = admit(record)?;
        let hostname = record.hostname.as_str();

        if self
            .hostvars
            .insert(hostname.to_string(), HostVars::from(record))
            .is_some()
        {
            debug!(hostname, "duplicate hostname, later record wins");
        }

        if let Some(previous) = self.placements.insert(hostname.to_string(), groups.clone()) {
            for stale in previous.iter().filter(|name| !groups.contains(*name)) {
                self.detach(stale, hostname);
            }
        }

        for name in &groups {
            self.ensure_group_and_append(name, hostname);
        }

        Ok(())
    }

    /// Fold one record, logging and skipping it if it is rejected
    #[must_use]
    pub fn with_record(mut self, record: &HostRecord) -> Self {
        if let Err(e) = self.push(record) {
            warn!(error = %e, "skipping host record");
        }
        self
    }

    /// Finish the fold
    #[must_use]
    pub fn finish(self) -> InventoryDocument {
        InventoryDocument::from_parts(
            Meta {
                hostvars: self.hostvars,
            },
            self.groups,
        )
    }

    /// Create the group on first reference and append the host if absent
    fn ensure_group_and_append(&mut self, name: &str, hostname: &str) {
        self.groups
            .entry(name.to_string())
            .or_default()
            .insert(hostname);
    }

    fn detach(&mut self, name: &str, hostname: &str) {
        if let Some(group) = self.groups.get_mut(name) {
            group.remove(hostname);
            if group.is_empty() {
                self.groups.remove(name);
            }
        }
    }
}

/// Derive a record's group names
///
/// Refuses names equal to `_meta` and records whose three names are not
/// distinct, so every admitted host sits in exactly three groups.
fn admit(record: &HostRecord) -> Result<[String; 3], InventoryError> {
    let groups = record.group_names();
    if let Some(reserved) = groups.iter().find(|name| name.as_str() == META_KEY) {
        return Err(InventoryError::ReservedGroupName {
            hostname: record.hostname.clone(),
            group: reserved.clone(),
        });
    }
    for (i, name) in groups.iter().enumerate() {
        if groups[i + 1..].contains(name) {
            return Err(InventoryError::GroupCollision {
                hostname: record.hostname.clone(),
                group: name.clone(),
            });
        }
    }
    Ok(groups)
}

/// Build the grouped inventory for a host list
///
/// Total for any input: rejected records are logged and skipped.
#[must_use]
pub fn build_inventory(hosts: &[HostRecord]) -> InventoryDocument {
    let inventory = hosts
        .iter()
        .fold(InventoryBuilder::new(), InventoryBuilder::with_record)
        .finish();
    debug!(
        hosts = inventory.host_count(),
        groups = inventory.groups().len(),
        "inventory built"
    );
    inventory
}

/// Variables for one host, or an empty lookup if it is unknown
///
/// Picks the last record with a matching hostname that
/// [`build_inventory`] would accept, so both operations agree.
#[must_use]
pub fn host_vars(hosts: &[HostRecord], hostname: &str) -> HostLookup {
    HostLookup(
        hosts
            .iter()
            .rev()
            .filter(|record| record.hostname == hostname)
            .find(|record| admit(record).is_ok())
            .map(HostVars::from),
    )
}

/// Fallback inventory with no hosts and no groups
#[must_use]
pub fn empty_inventory() -> InventoryDocument {
    InventoryDocument::empty()
}
