//! Reporting and export — CSV decision tape and Markdown audit report.
//!
//! - **CSV**: one row per evaluated signal for spreadsheets and notebooks
//! - **Markdown**: human-readable summary of an audit log

use anyhow::{Context, Result};

use crate::history::AuditSummary;
use crate::pipeline::PipelineRecord;

// ─── CSV export ─────────────────────────────────────────────────────

/// Export records as CSV.
///
/// Columns: signal_id, scenario_status, normalized_score, rr, risk_status,
/// risk_reason, action, reason. Missing values are empty cells.
pub fn export_records_csv(records: &[PipelineRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "signal_id",
        "scenario_status",
        "normalized_score",
        "rr",
        "risk_status",
        "risk_reason",
        "action",
        "reason",
    ])?;

    for r in records {
        wtr.write_record([
            r.signal_id.as_str(),
            r.scenario.status.as_str(),
            &r.score
                .as_ref()
                .map(|s| format!("{:.2}", s.normalized_score))
                .unwrap_or_default(),
            &r.risk.rr.map(|rr| format!("{rr:.4}")).unwrap_or_default(),
            r.risk.status.as_str(),
            &r.risk
                .invalidation_reason
                .map(|reason| reason.to_string())
                .unwrap_or_default(),
            r.decision.action.as_str(),
            r.decision.reason.as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for an audit summary.
pub fn generate_audit_report(summary: &AuditSummary) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Audit Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Entries | {} |\n", summary.total));
    md.push_str(&format!("| Actionable | {} |\n", summary.actionable));
    md.push_str(&format!("| Weight sets | {} |\n", summary.by_config.len()));
    md.push('\n');

    push_counts(&mut md, "Actions", "Action", &summary.by_action);
    push_counts(&mut md, "Risk Outcomes", "Reason", &summary.by_risk_reason);

    md
}

fn push_counts(
    md: &mut String,
    title: &str,
    column: &str,
    counts: &std::collections::BTreeMap<String, usize>,
) {
    md.push_str(&format!("## {title}\n\n"));
    if counts.is_empty() {
        md.push_str("_none_\n\n");
        return;
    }
    md.push_str(&format!("| {column} | Count |\n"));
    md.push_str("| --- | ---: |\n");
    for (key, count) in counts {
        md.push_str(&format!("| {key} | {count} |\n"));
    }
    md.push('\n');
}
