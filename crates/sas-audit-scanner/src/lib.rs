//! Scan engine for Azure Storage SAS tokens embedded in Kubernetes Secrets.
//!
//! The engine walks every accessible namespace through the [`ClusterSecrets`]
//! seam, recognizes SAS-shaped secret values, parses their `se=` expiry
//! parameter and reports one [`Finding`] per token-bearing key. Cluster
//! access itself lives behind the trait so the real kube-backed client and
//! in-memory test fixtures are interchangeable.

pub mod cluster;
pub mod finding;
pub mod scanner;
pub mod token;

pub use cluster::{ClusterSecrets, NamespaceRecord, SecretRecord};
pub use finding::{Finding, MASKED_VALUE, Severity};
pub use scanner::{ScanConfig, ScanError, retrieve_findings, scan_secret};
pub use token::{TokenError, is_candidate_token, parse_expiration};
