use std::collections::BTreeMap;

use async_trait::async_trait;

/// A namespace as the scan needs it: just the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRecord {
    pub name: String,
}

impl NamespaceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One Secret's name and decoded data map.
///
/// The `BTreeMap` keeps key iteration sorted, which the deterministic
/// report order relies on.
#[derive(Debug, Clone, Default)]
pub struct SecretRecord {
    pub name: String,
    pub data: BTreeMap<String, Vec<u8>>,
}

/// The two cluster operations the scan engine needs.
///
/// Implemented by the kube-backed client in the CLI crate and by
/// in-memory fixtures in tests. Errors are opaque to the engine; it only
/// decides whether a failure aborts the scan.
#[async_trait]
pub trait ClusterSecrets: Send + Sync {
    async fn list_namespaces(&self) -> anyhow::Result<Vec<NamespaceRecord>>;
    async fn list_secrets(&self, namespace: &str) -> anyhow::Result<Vec<SecretRecord>>;
}
