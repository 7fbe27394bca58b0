use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use sas_audit_scanner::{ClusterSecrets, NamespaceRecord, SecretRecord};
use tracing::debug;

/// Kubernetes-backed implementation of the engine's cluster seam.
pub struct KubeCluster {
    client: Client,
    /// Applied to every API call; the cluster API is remote I/O and must
    /// not hang a one-shot scan indefinitely.
    timeout: Duration,
}

impl KubeCluster {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build a client from an explicit kubeconfig path, or fall back to
    /// ambient configuration (in-cluster service account, then
    /// `KUBECONFIG`/`~/.kube/config`).
    pub async fn connect(kubeconfig: Option<&Path>, timeout: Duration) -> anyhow::Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("reading kubeconfig {}", path.display()))?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .context("building client config from kubeconfig")?;
                Client::try_from(config).context("building cluster client")?
            }
            None => Client::try_default()
                .await
                .context("building cluster client from ambient config")?,
        };
        Ok(Self::new(client, timeout))
    }

    async fn with_timeout<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, kube::Error>>,
    ) -> anyhow::Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| anyhow::anyhow!("{what} timed out after {}s", self.timeout.as_secs()))?
            .with_context(|| format!("{what} failed"))
    }
}

#[async_trait]
impl ClusterSecrets for KubeCluster {
    async fn list_namespaces(&self) -> anyhow::Result<Vec<NamespaceRecord>> {
        let api = Api::<Namespace>::all(self.client.clone());
        let list = self
            .with_timeout("listing namespaces", api.list(&ListParams::default()))
            .await?;
        Ok(list
            .items
            .into_iter()
            .map(|ns| NamespaceRecord::new(ns.name_any()))
            .collect())
    }

    async fn list_secrets(&self, namespace: &str) -> anyhow::Result<Vec<SecretRecord>> {
        let api = Api::<Secret>::namespaced(self.client.clone(), namespace);
        let list = self
            .with_timeout("listing secrets", api.list(&ListParams::default()))
            .await?;
        debug!(%namespace, secrets = list.items.len(), "fetched secrets");
        Ok(list.items.into_iter().map(secret_record).collect())
    }
}

/// The kube client already decodes the base64 layer of Secret data; the
/// inner bytes go to the engine as-is.
fn secret_record(secret: Secret) -> SecretRecord {
    let name = secret.name_any();
    let data = secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect();
    SecretRecord { name, data }
}
