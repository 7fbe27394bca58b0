use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sas_audit_cli::{client::KubeCluster, report, telemetry};
use sas_audit_scanner::{ScanConfig, retrieve_findings};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "sas-audit",
    about = "Audit Kubernetes Secrets for expiring Azure Storage SAS tokens"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every accessible namespace for SAS-bearing secret keys.
    Scan {
        /// Path to a kubeconfig file. Falls back to the KUBECONFIG_PATH
        /// env var, then in-cluster or ambient configuration.
        #[arg(long)]
        kubeconfig: Option<PathBuf>,

        /// Namespace to skip entirely; repeatable.
        #[arg(long = "exclude-namespace", default_value = "kube-system")]
        excluded_namespaces: Vec<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        output: Output,

        /// Concurrent per-namespace secret fetches.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Timeout in seconds for each cluster call.
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            kubeconfig,
            excluded_namespaces,
            output,
            concurrency,
            timeout,
        } => {
            scan(
                kubeconfig.or_else(|| std::env::var_os("KUBECONFIG_PATH").map(PathBuf::from)),
                excluded_namespaces,
                output,
                concurrency,
                timeout,
            )
            .await
        }
    }
}

async fn scan(
    kubeconfig: Option<PathBuf>,
    excluded_namespaces: Vec<String>,
    output: Output,
    concurrency: usize,
    timeout: u64,
) -> Result<()> {
    let cluster = KubeCluster::connect(kubeconfig.as_deref(), Duration::from_secs(timeout)).await?;

    let config = ScanConfig {
        excluded_namespaces: excluded_namespaces.into_iter().collect::<BTreeSet<_>>(),
        concurrency,
    };
    let today = Utc::now().date_naive();

    let findings = retrieve_findings(&cluster, &config, today).await?;
    info!(total = findings.len(), "SAS token scan finished");

    match output {
        Output::Table => print!("{}", report::render_table(&findings)),
        Output::Json => println!("{}", report::render_json(&findings)?),
    }
    Ok(())
}
