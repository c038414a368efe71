//! Host source abstraction and row conversion

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::{debug, warn};

use crate::error::InventoryError;
use crate::types::HostRecord;

/// Provider of the current set of active hosts
///
/// Filtering to active hosts is the source's job. An empty result is valid.
#[async_trait]
pub trait HostSource: Send + Sync {
    /// Fetch every active host
    ///
    /// # Errors
    /// Returns [`InventoryError::SourceUnavailable`] when the backing store
    /// cannot be reached, authenticated against, or queried.
    async fn fetch_active_hosts(&self) -> Result<Vec<HostRecord>, InventoryError>;

    /// Short name used in diagnostics
    fn source_type(&self) -> &'static str;
}

/// Raw host row with every column nullable
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct HostRow {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub environment: Option<String>,
    pub role: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_port: Option<i32>,
    pub region: Option<String>,
}

fn required(
    value: Option<String>,
    column: &str,
    hostname: Option<&str>,
) -> Result<String, InventoryError> {
    value.ok_or_else(|| InventoryError::malformed(hostname, format!("{column} is null")))
}

fn required_name(
    value: Option<String>,
    column: &str,
    hostname: Option<&str>,
) -> Result<String, InventoryError> {
    let value = required(value, column, hostname)?;
    if value.trim().is_empty() {
        return Err(InventoryError::malformed(
            hostname,
            format!("{column} is blank"),
        ));
    }
    Ok(value)
}

impl TryFrom<HostRow> for HostRecord {
    type Error = InventoryError;

    fn try_from(row: HostRow) -> Result<Self, Self::Error> {
        let hostname = required_name(row.hostname, "hostname", None)?;
        let name = Some(hostname.as_str());

        let ssh_port = row
            .ssh_port
            .ok_or_else(|| InventoryError::malformed(name, "ssh_port is null"))?;
        let ssh_port = u16::try_from(ssh_port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| {
                InventoryError::malformed(name, format!("ssh_port {ssh_port} is out of range"))
            })?;

        Ok(HostRecord {
            ip_address: required(row.ip_address, "ip_address", name)?,
            environment: required_name(row.environment, "environment", name)?,
            role: required_name(row.role, "role", name)?,
            ssh_user: required(row.ssh_user, "ssh_user", name)?,
            ssh_port,
            region: required_name(row.region, "region", name)?,
            hostname,
        })
    }
}

/// Convert raw rows into records, skipping malformed rows
///
/// Input order is preserved. Each skipped row is reported as a warning.
pub fn collect_records(rows: impl IntoIterator<Item = HostRow>) -> Vec<HostRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        match HostRecord::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "skipping host row");
            }
        }
    }

    debug!(records = records.len(), skipped, "host rows converted");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hostname: &str) -> HostRow {
        HostRow {
            hostname: Some(hostname.to_string()),
            ip_address: Some("10.0.0.1".to_string()),
            environment: Some("prod".to_string()),
            role: Some("web".to_string()),
            ssh_user: Some("deploy".to_string()),
            ssh_port: Some(22),
            region: Some("us-east".to_string()),
        }
    }

    #[test]
    fn test_complete_row_converts() {
        let record = HostRecord::try_from(row("web1")).unwrap();
        assert_eq!(record.hostname, "web1");
        assert_eq!(record.ssh_port, 22);
        assert_eq!(record.region, "us-east");
    }

    #[test]
    fn test_null_role_is_malformed() {
        let err = HostRecord::try_from(HostRow {
            role: None,
            ..row("web1")
        })
        .unwrap_err();
        assert_eq!(
            err,
            InventoryError::malformed(Some("web1"), "role is null")
        );
    }

    #[test]
    fn test_null_hostname_is_malformed() {
        let err = HostRecord::try_from(HostRow {
            hostname: None,
            ..row("web1")
        })
        .unwrap_err();
        assert_eq!(err, InventoryError::malformed(None, "hostname is null"));
    }

    #[test]
    fn test_blank_environment_is_malformed() {
        let err = HostRecord::try_from(HostRow {
            environment: Some("  ".to_string()),
            ..row("web1")
        })
        .unwrap_err();
        assert!(err.to_string().contains("environment is blank"));
    }

    #[test]
    fn test_port_out_of_range_is_malformed() {
        for port in [0, -1, 70_000] {
            let result = HostRecord::try_from(HostRow {
                ssh_port: Some(port),
                ..row("web1")
            });
            assert!(result.is_err(), "port {port} accepted");
        }
    }

    #[test]
    fn test_collect_skips_bad_rows_and_keeps_order() {
        let rows = vec![
            row("web1"),
            HostRow {
                ssh_user: None,
                ..row("broken")
            },
            row("web2"),
        ];
        let records = collect_records(rows);
        let names: Vec<&str> = records.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(names, ["web1", "web2"]);
    }

    #[test]
    fn test_collect_empty() {
        assert!(collect_records(Vec::new()).is_empty());
    }
}
