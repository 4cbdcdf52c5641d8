//! Text rendering for estimate outcomes, the active form, and the history
//! listing. Pure formatting; no state access beyond what is passed in.

use crate::model::{EstimateOutcome, EstimateRequest, HistoryEntry, RiskTier};
use crate::state::ResultSlot;
use time::macros::format_description;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Render the visible result slot.
pub fn build_report(slot: &ResultSlot) -> TextSummary {
    let mut lines = Vec::new();
    match slot {
        ResultSlot::Outcome(EstimateOutcome::Report(report)) => {
            let tier = RiskTier::for_score(report.risk_score);
            lines.push(format!(
                "Risk score: {:.0} ({})",
                report.risk_score,
                tier.label()
            ));
            lines.push(format!(
                "Cost / 1k req: {}  CO2 / 1k: {:.0} g",
                fmt_money(report.per_1k_requests.cost_usd),
                report.per_1k_requests.co2_g
            ));
            lines.push(format!(
                "Monthly forecast: ${:.2}  {} kg CO2",
                report.monthly_forecast.cost_usd, report.monthly_forecast.co2_kg
            ));
            if !report.suggested_yaml.trim().is_empty() {
                lines.push("Suggested Cloud Run YAML:".into());
                for yaml_line in report.suggested_yaml.lines() {
                    lines.push(format!("  {yaml_line}"));
                }
            }
            if !report.advice.is_empty() {
                lines.push("Advice:".into());
                for note in &report.advice {
                    lines.push(format!("  - {note}"));
                }
            }
        }
        ResultSlot::Outcome(EstimateOutcome::ServiceError { error }) => {
            lines.push(format!("Estimator error: {error}"));
        }
        ResultSlot::ExchangeFailed(message) => {
            lines.push(format!("Estimate failed: {message}"));
        }
    }
    TextSummary { lines }
}

/// Render the active form, one labelled line per field.
pub fn build_form(input: &EstimateRequest) -> TextSummary {
    let lines = vec![
        format!("vCPU: {}", input.vcpu),
        format!("Memory (GiB): {}", input.memory_gb),
        format!("Concurrency: {}", fmt_int(input.concurrency)),
        format!("Avg duration (ms): {}", fmt_int(input.avg_duration_ms)),
        format!("Requests / min: {}", fmt_int(input.requests_per_min)),
        format!("Region: {}", input.region),
        format!("Min instances: {}", fmt_int(input.min_instances)),
        format!("Max instances: {}", fmt_int(input.max_instances)),
        format!("Idle CPU %: {}", input.idle_utilization_pc),
    ];
    TextSummary { lines }
}

/// Render the recent-runs listing, newest first, 1-based indices matching
/// what `--restore` accepts.
pub fn build_history(entries: &[HistoryEntry]) -> TextSummary {
    if entries.is_empty() {
        return TextSummary {
            lines: vec!["No history yet - run an estimate.".into()],
        };
    }
    let lines = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{:>2}) score {:>3.0}  {}  {}  {}",
                i + 1,
                entry.score.clamp(0.0, 100.0),
                entry.region,
                fmt_money(entry.cost_per_1k),
                fmt_clock(entry.ts),
            )
        })
        .collect();
    TextSummary { lines }
}

fn fmt_money(v: f64) -> String {
    format!("${v:.4}")
}

fn fmt_int(v: Option<i64>) -> String {
    v.map_or_else(|| "-".into(), |n| n.to_string())
}

/// Local wall-clock HH:MM for a unix-millisecond timestamp; UTC when the
/// local offset cannot be determined.
fn fmt_clock(ts_ms: i64) -> String {
    let Ok(t) = time::OffsetDateTime::from_unix_timestamp_nanos(ts_ms as i128 * 1_000_000) else {
        return "-".into();
    };
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    t.to_offset(offset)
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "-".into())
}
