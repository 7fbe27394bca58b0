//! CLI wiring around the `sas-audit-scanner` engine: the kube-backed
//! cluster client, report rendering and tracing setup.

pub mod client;
pub mod report;
pub mod telemetry;
