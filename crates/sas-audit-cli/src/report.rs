use sas_audit_scanner::{Finding, Severity};
use serde::Serialize;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Fixed-width table with one row per finding. Expired rows render red,
/// expiring-soon rows yellow.
pub fn render_table(findings: &[Finding]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<30} {:<30} {:<30} {:<16} {:<15} {}\n",
        "Namespace", "Secret Name", "Secret Key", "Expiration Date", "Remaining Days", "Status"
    ));
    for finding in findings {
        let severity = finding.severity();
        let row = format!(
            "{:<30} {:<30} {:<30} {:<16} {:<15} {}",
            finding.namespace,
            finding.secret_name,
            finding.secret_key,
            finding.expiration_date.format("%Y-%m-%d"),
            finding.remaining_days,
            severity.label()
        );
        match color(severity) {
            Some(code) => {
                out.push_str(code);
                out.push_str(&row);
                out.push_str(RESET);
            }
            None => out.push_str(&row),
        }
        out.push('\n');
    }
    out
}

fn color(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Expired => Some(RED),
        Severity::ExpiringSoon => Some(YELLOW),
        Severity::Valid | Severity::ValidLongTerm => None,
    }
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    finding: &'a Finding,
    status: &'static str,
}

/// Findings as a JSON array, each row carrying its status label, for
/// piping into other tooling.
pub fn render_json(findings: &[Finding]) -> serde_json::Result<String> {
    let rows: Vec<JsonRow<'_>> = findings
        .iter()
        .map(|finding| JsonRow {
            finding,
            status: finding.severity().label(),
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}
