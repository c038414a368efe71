//! Inventory type definitions

use std::collections::{BTreeMap, HashSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Reserved top-level key holding per-host variables
pub const META_KEY: &str = "_meta";

// ============================================================================
// Host Records
// ============================================================================

/// One active machine as read from the host source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Hostname (unique key)
    pub hostname: String,
    /// Address the automation engine connects to
    pub ip_address: String,
    /// Environment name (prod, staging, ...)
    pub environment: String,
    /// Host role (web, db, ...)
    pub role: String,
    /// SSH login user
    pub ssh_user: String,
    /// SSH port
    pub ssh_port: u16,
    /// Region the host lives in
    pub region: String,
}

impl HostRecord {
    /// Names of every group this record belongs to, one per dimension
    #[must_use]
    pub fn group_names(&self) -> [String; 3] {
        GroupDimension::ALL.map(|dimension| dimension.group_name(self))
    }
}

/// Connection variables handed to the automation engine for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVars {
    /// Address to connect to
    pub ansible_host: String,
    /// SSH user
    pub ansible_user: String,
    /// SSH port
    pub ansible_port: u16,
}

impl From<&HostRecord> for HostVars {
    fn from(record: &HostRecord) -> Self {
        Self {
            ansible_host: record.ip_address.clone(),
            ansible_user: record.ssh_user.clone(),
            ansible_port: record.ssh_port,
        }
    }
}

/// Result of a single-host lookup
///
/// Serializes as the host's variables, or as `{}` when the host is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostLookup(pub Option<HostVars>);

impl HostLookup {
    /// Lookup result for an unknown host
    #[must_use]
    pub fn unknown() -> Self {
        Self(None)
    }

    /// Check if the host was found
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.0.is_some()
    }
}

impl Serialize for HostLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(vars) => vars.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Dimension a host is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupDimension {
    /// Group named after the environment itself
    Environment,
    /// `role_<role>`
    Role,
    /// `region_<region>`
    Region,
}

impl GroupDimension {
    /// Every dimension, in the order groups are populated
    pub const ALL: [GroupDimension; 3] = [
        GroupDimension::Environment,
        GroupDimension::Role,
        GroupDimension::Region,
    ];

    /// Derive the group name for a record along this dimension
    #[must_use]
    pub fn group_name(self, record: &HostRecord) -> String {
        match self {
            GroupDimension::Environment => record.environment.clone(),
            GroupDimension::Role => format!("role_{}", record.role),
            GroupDimension::Region => format!("region_{}", record.region),
        }
    }
}

/// Named bucket of hostnames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Member hostnames in first-insertion order
    hosts: Vec<String>,
    #[serde(skip)]
    members: HashSet<String>,
}

impl Group {
    /// Member hostnames
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Check membership
    #[must_use]
    pub fn contains(&self, hostname: &str) -> bool {
        self.members.contains(hostname)
    }

    /// Append a hostname unless it is already a member
    ///
    /// Returns `true` if the hostname was added.
    pub fn insert(&mut self, hostname: &str) -> bool {
        if !self.members.insert(hostname.to_string()) {
            return false;
        }
        self.hosts.push(hostname.to_string());
        true
    }

    /// Remove a hostname, returning `true` if it was a member
    pub fn remove(&mut self, hostname: &str) -> bool {
        if !self.members.remove(hostname) {
            return false;
        }
        self.hosts.retain(|h| h != hostname);
        true
    }

    /// Check if the group has no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

// ============================================================================
// Inventory Document
// ============================================================================

/// Metadata block stored under `_meta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Per-host variables keyed by hostname
    pub hostvars: BTreeMap<String, HostVars>,
}

/// Grouped host directory consumed by the automation engine
///
/// Serializes to `{"_meta": {"hostvars": {...}}, "<group>": {"hosts": [...]}, ...}`.
/// Group names never equal [`META_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryDocument {
    #[serde(rename = "_meta")]
    meta: Meta,
    #[serde(flatten)]
    groups: BTreeMap<String, Group>,
}

impl InventoryDocument {
    /// Document with an empty `_meta.hostvars` and no groups
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(meta: Meta, groups: BTreeMap<String, Group>) -> Self {
        debug_assert!(!groups.contains_key(META_KEY));
        Self { meta, groups }
    }

    /// Per-host variables
    #[must_use]
    pub fn hostvars(&self) -> &BTreeMap<String, HostVars> {
        &self.meta.hostvars
    }

    /// All groups keyed by name
    #[must_use]
    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.groups
    }

    /// Look up a group by name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Number of hosts in the document
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.meta.hostvars.len()
    }

    /// Check if the document holds no hosts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.hostvars.is_empty() && self.groups.is_empty()
    }
}
