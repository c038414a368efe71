use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use hostdb_inventory::*;

// Mock implementations
struct MockSource {
    hosts: Vec<HostRecord>,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(hosts: Vec<HostRecord>) -> Self {
        Self {
            hosts,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HostSource for MockSource {
    async fn fetch_active_hosts(&self) -> Result<Vec<HostRecord>, InventoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hosts.clone())
    }

    fn source_type(&self) -> &'static str {
        "mock"
    }
}

struct UnavailableSource;

#[async_trait]
impl HostSource for UnavailableSource {
    async fn fetch_active_hosts(&self) -> Result<Vec<HostRecord>, InventoryError> {
        Err(InventoryError::SourceUnavailable(
            "connection refused".to_string(),
        ))
    }

    fn source_type(&self) -> &'static str {
        "unavailable"
    }
}

/// Source that converts raw rows the way the database source does
struct RowSource {
    rows: Vec<HostRow>,
}

#[async_trait]
impl HostSource for RowSource {
    async fn fetch_active_hosts(&self) -> Result<Vec<HostRecord>, InventoryError> {
        Ok(collect_records(self.rows.clone()))
    }

    fn source_type(&self) -> &'static str {
        "rows"
    }
}

fn web1() -> HostRecord {
    HostRecord {
        hostname: "web1".to_string(),
        ip_address: "10.0.0.1".to_string(),
        environment: "prod".to_string(),
        role: "web".to_string(),
        ssh_user: "deploy".to_string(),
        ssh_port: 22,
        region: "us-east".to_string(),
    }
}

#[tokio::test]
async fn test_list_renders_inventory() {
    let provider = InventoryProvider::new(Arc::new(MockSource::new(vec![web1()])));

    let outcome = provider.list().await;
    assert!(!outcome.is_degraded());
    assert_eq!(
        serde_json::to_value(&outcome.value).unwrap(),
        json!({
            "_meta": {"hostvars": {"web1": {
                "ansible_host": "10.0.0.1",
                "ansible_user": "deploy",
                "ansible_port": 22
            }}},
            "prod": {"hosts": ["web1"]},
            "role_web": {"hosts": ["web1"]},
            "region_us-east": {"hosts": ["web1"]}
        })
    );
}

#[tokio::test]
async fn test_list_empty_source_is_not_an_error() {
    let provider = InventoryProvider::new(Arc::new(MockSource::new(Vec::new())));

    let outcome = provider.list().await;
    assert!(outcome.error.is_none());
    assert_eq!(
        serde_json::to_string(&outcome.value).unwrap(),
        r#"{"_meta":{"hostvars":{}}}"#
    );
}

#[tokio::test]
async fn test_list_falls_back_when_source_unavailable() {
    let provider = InventoryProvider::new(Arc::new(UnavailableSource));

    let outcome = provider.list().await;
    assert_eq!(outcome.value, empty_inventory());
    assert_eq!(
        serde_json::to_value(&outcome.value).unwrap(),
        json!({"_meta": {"hostvars": {}}})
    );
    assert!(matches!(
        outcome.error,
        Some(InventoryError::SourceUnavailable(_))
    ));
}

#[tokio::test]
async fn test_host_lookup() {
    let provider = InventoryProvider::new(Arc::new(MockSource::new(vec![web1()])));

    let found = provider.host("web1").await;
    assert_eq!(
        serde_json::to_value(&found.value).unwrap(),
        json!({"ansible_host": "10.0.0.1", "ansible_user": "deploy", "ansible_port": 22})
    );

    let missing = provider.host("missing").await;
    assert!(missing.error.is_none());
    assert_eq!(serde_json::to_value(&missing.value).unwrap(), json!({}));
}

#[tokio::test]
async fn test_host_lookup_falls_back_when_source_unavailable() {
    let provider = InventoryProvider::new(Arc::new(UnavailableSource));

    let outcome = provider.host("web1").await;
    assert!(outcome.is_degraded());
    assert_eq!(serde_json::to_string(&outcome.value).unwrap(), "{}");
}

#[tokio::test]
async fn test_each_call_reads_a_fresh_snapshot() {
    let source = Arc::new(MockSource::new(vec![web1()]));
    let provider = InventoryProvider::new(source.clone());

    provider.list().await;
    provider.host("web1").await;
    provider.list().await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let good = HostRow {
        hostname: Some("web1".to_string()),
        ip_address: Some("10.0.0.1".to_string()),
        environment: Some("prod".to_string()),
        role: Some("web".to_string()),
        ssh_user: Some("deploy".to_string()),
        ssh_port: Some(22),
        region: Some("us-east".to_string()),
    };
    let null_role = HostRow {
        hostname: Some("web2".to_string()),
        role: None,
        ..good.clone()
    };
    let provider = InventoryProvider::new(Arc::new(RowSource {
        rows: vec![null_role, good],
    }));

    let outcome = provider.list().await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.value.host_count(), 1);
    assert!(outcome.value.hostvars().contains_key("web1"));
    assert_eq!(
        outcome.value.group("role_web").map(Group::hosts),
        Some(&["web1".to_string()][..])
    );
}

#[tokio::test]
async fn test_duplicate_hostnames_resolve_to_later_record() {
    let later = HostRecord {
        ip_address: "10.0.0.99".to_string(),
        ..web1()
    };
    let provider = InventoryProvider::new(Arc::new(MockSource::new(vec![web1(), later])));

    let listed = provider.list().await.value;
    assert_eq!(listed.hostvars()["web1"].ansible_host, "10.0.0.99");
    assert_eq!(listed.group("prod").map(|g| g.hosts().len()), Some(1));

    let single = provider.host("web1").await.value;
    assert_eq!(single.0.map(|v| v.ansible_host), Some("10.0.0.99".to_string()));
}
