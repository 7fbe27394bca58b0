use std::collections::BTreeSet;

use chrono::NaiveDate;
use futures::{StreamExt, TryStreamExt, stream};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cluster::{ClusterSecrets, SecretRecord};
use crate::finding::Finding;
use crate::token::{self, TokenError};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to list namespaces")]
    ListNamespaces(#[source] anyhow::Error),
    #[error("failed to list secrets in namespace {namespace}")]
    ListSecrets {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Scan-wide configuration, read-only once a scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Namespaces skipped entirely, before any secret is fetched.
    pub excluded_namespaces: BTreeSet<String>,
    /// Bound on simultaneous per-namespace secret fetches.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_namespaces: BTreeSet::from(["kube-system".to_string()]),
            concurrency: 4,
        }
    }
}

/// Scan one secret's data map for SAS-bearing keys.
///
/// Never fails: keys the classifier rejects are skipped silently, and a
/// candidate whose expiry cannot be parsed is logged with its location
/// and skipped, so one bad token cannot hide findings elsewhere in the
/// same secret.
pub fn scan_secret(namespace: &str, secret: &SecretRecord, today: NaiveDate) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (key, value) in &secret.data {
        if !token::is_candidate_token(value) {
            continue;
        }
        let parsed = std::str::from_utf8(value)
            .map_err(|_| TokenError::InvalidUtf8)
            .and_then(token::parse_expiration);
        match parsed {
            Ok(expiration_date) => {
                debug!(%namespace, secret = %secret.name, %key, %expiration_date, "found SAS token");
                findings.push(Finding::new(
                    namespace,
                    &secret.name,
                    key,
                    expiration_date,
                    today,
                ));
            }
            Err(error) => {
                warn!(%namespace, secret = %secret.name, %key, %error, "skipping unparseable candidate token");
            }
        }
    }
    findings
}

/// Walk every non-excluded namespace and collect findings for all
/// SAS-bearing secret keys, in deterministic order: namespaces sorted by
/// name, secrets as the cluster returned them, keys sorted.
///
/// Any cluster listing failure aborts the whole scan. A report built from
/// a partial enumeration would read as a clean audit of namespaces that
/// were never seen, so no partial results are returned. Parse failures
/// inside a secret stay local (see [`scan_secret`]); the two policies are
/// intentionally different.
pub async fn retrieve_findings(
    cluster: &dyn ClusterSecrets,
    config: &ScanConfig,
    today: NaiveDate,
) -> Result<Vec<Finding>, ScanError> {
    let namespaces = cluster
        .list_namespaces()
        .await
        .map_err(ScanError::ListNamespaces)?;

    let mut names: Vec<String> = namespaces
        .into_iter()
        .map(|ns| ns.name)
        .filter(|name| {
            if config.excluded_namespaces.contains(name) {
                debug!(namespace = %name, "skipping excluded namespace");
                false
            } else {
                true
            }
        })
        .collect();
    names.sort();

    let concurrency = config.concurrency.max(1);
    let per_namespace: Vec<(String, Vec<SecretRecord>)> = stream::iter(names)
        .map(|namespace| async move {
            info!(%namespace, "listing secrets");
            match cluster.list_secrets(&namespace).await {
                Ok(secrets) => Ok((namespace, secrets)),
                Err(source) => Err(ScanError::ListSecrets { namespace, source }),
            }
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    let mut findings = Vec::new();
    for (namespace, secrets) in &per_namespace {
        debug!(%namespace, secrets = secrets.len(), "scanning namespace");
        for secret in secrets {
            findings.extend(scan_secret(namespace, secret, today));
        }
    }

    // `buffered` already yields in input order; the stable sort is the
    // guarantee that concurrency never leaks into report order.
    findings.sort_by(|a, b| a.namespace.cmp(&b.namespace));

    info!(total = findings.len(), "scan complete");
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::MASKED_VALUE;

    const VALID_TOKEN: &[u8] = b"sp=r&st=2024-11-16T09:11:55Z&se=2024-11-16T17:11:55Z&spr=https&sv=2022-11-02&sr=c&sig=q44i29V8tYXU7YISKNcoKPPedQfbyyGh7cDxKJlx%2FEk%3D";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 10).unwrap()
    }

    fn secret(name: &str, entries: &[(&str, &[u8])]) -> SecretRecord {
        SecretRecord {
            name: name.to_string(),
            data: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
        }
    }

    #[test]
    fn extracts_token_and_masks_value() {
        let secret = secret(
            "my-secret",
            &[
                ("MY_AZURE_SAS_TOKEN", VALID_TOKEN),
                ("ANOTHER_SECRET", b"ANOTHER_SECRET"),
            ],
        );

        let findings = scan_secret("test-namespace", &secret, today());

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.namespace, "test-namespace");
        assert_eq!(finding.secret_name, "my-secret");
        assert_eq!(finding.secret_key, "MY_AZURE_SAS_TOKEN");
        assert_eq!(finding.secret_value, MASKED_VALUE);
        assert!(!finding.secret_value.contains("sig="));
        assert_eq!(
            finding.expiration_date,
            NaiveDate::from_ymd_opt(2024, 11, 16).unwrap()
        );
        assert_eq!(finding.remaining_days, 6);
    }

    #[test]
    fn secret_without_candidates_yields_nothing() {
        let secret = secret("regular-secret", &[("REGULAR_SECRET", b"REGULAR_SECRET")]);
        assert!(scan_secret("test-namespace", &secret, today()).is_empty());
    }

    #[test]
    fn unparseable_candidate_does_not_hide_other_keys() {
        let mut junk = b"sig=nonsense&se=".to_vec();
        junk.extend_from_slice(&[b'x'; 120]);
        let secret = secret(
            "my-secret",
            &[
                ("BROKEN", &junk),
                ("GOOD", VALID_TOKEN),
            ],
        );

        let findings = scan_secret("ns", &secret, today());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].secret_key, "GOOD");
    }

    #[test]
    fn non_utf8_candidate_is_skipped() {
        let mut value = vec![0xff; 121];
        value.extend_from_slice(b"se=2024-11-16");
        let secret = secret("my-secret", &[("BINARY", &value)]);
        assert!(scan_secret("ns", &secret, today()).is_empty());
    }

    #[test]
    fn keys_are_reported_in_sorted_order() {
        let secret = secret(
            "my-secret",
            &[
                ("ZZZ_TOKEN", VALID_TOKEN),
                ("AAA_TOKEN", VALID_TOKEN),
            ],
        );

        let keys: Vec<String> = scan_secret("ns", &secret, today())
            .into_iter()
            .map(|f| f.secret_key)
            .collect();
        assert_eq!(keys, vec!["AAA_TOKEN", "ZZZ_TOKEN"]);
    }
}
