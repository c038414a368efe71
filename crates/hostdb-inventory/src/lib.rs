//! hostdb-inventory: dynamic inventory from a host database
//!
//! Reads active hosts from a relational store and renders them as a grouped
//! inventory document (environment, `role_*` and `region_*` groups plus
//! `_meta.hostvars`) for an automation engine.

pub mod builder;
pub mod config;
pub mod error;
pub mod postgres;
pub mod provider;
pub mod query;
pub mod source;
pub mod types;

pub use builder::{InventoryBuilder, build_inventory, empty_inventory, host_vars};
pub use config::DatabaseConfig;
pub use error::InventoryError;
pub use postgres::PostgresHostSource;
pub use provider::{InventoryProvider, Outcome};
pub use source::{HostRow, HostSource, collect_records};
pub use types::{
    Group, GroupDimension, HostLookup, HostRecord, HostVars, InventoryDocument, META_KEY, Meta,
};
