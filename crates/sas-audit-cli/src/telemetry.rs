use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so the report on stdout stays pipeable.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("sas_audit_cli=info,sas_audit_scanner=info,kube=warn")
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
