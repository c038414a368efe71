//! Error types for hostdb-inventory

use thiserror::Error;

/// Errors that can occur while producing an inventory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The backing store could not be reached, authenticated against, or queried
    #[error("host source unavailable: {0}")]
    SourceUnavailable(String),

    /// A row is missing a required field or carries an unusable value
    #[error("malformed host record{}: {reason}", quoted(.hostname))]
    MalformedRecord {
        /// Hostname of the row, when it was readable
        hostname: Option<String>,
        /// What is wrong with the row
        reason: String,
    },

    /// A derived group name collides with the reserved `_meta` key
    #[error("host '{hostname}' maps to reserved group name '{group}'")]
    ReservedGroupName {
        /// Offending host
        hostname: String,
        /// Derived group name
        group: String,
    },

    /// Two dimensions of one record derive the same group name
    #[error("host '{hostname}' derives group '{group}' from more than one field")]
    GroupCollision {
        /// Offending host
        hostname: String,
        /// Shared group name
        group: String,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn quoted(hostname: &Option<String>) -> String {
    hostname
        .as_deref()
        .map(|h| format!(" '{h}'"))
        .unwrap_or_default()
}

impl InventoryError {
    /// Build a malformed record error
    pub fn malformed(hostname: Option<&str>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            hostname: hostname.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Check if the boundary may answer with a fallback document
    ///
    /// Configuration errors are fatal; everything else degrades to an
    /// empty inventory.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, InventoryError::Config(_))
    }
}
