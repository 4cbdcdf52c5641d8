use crate::engine::EstimationClient;
use crate::history::HistoryCache;
use crate::model::RawFields;
use crate::orchestrator::SessionController;
use crate::state::ResultSlot;
use crate::storage::{FileStore, KeyValueStore};
use crate::text_summary;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "cihub",
    version,
    about = "Estimate Cloud Run cost, CO2 and deploy risk, with recallable run history"
)]
pub struct Cli {
    /// Base URL of the estimation service
    #[arg(long, default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Print the raw outcome JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// List recent runs and exit (no network)
    #[arg(long)]
    pub history: bool,

    /// Recall run N from the listing (1 = most recent) without re-querying
    #[arg(long, value_name = "N", conflicts_with = "history")]
    pub restore: Option<usize>,

    /// HTTP timeout for the estimate exchange
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Override the directory holding persisted history
    #[arg(long)]
    pub data_dir: Option<std::path::PathBuf>,

    /// vCPU per instance
    #[arg(long, default_value = "1")]
    pub vcpu: String,

    /// Memory per instance (GiB)
    #[arg(long, default_value = "1")]
    pub memory_gb: String,

    /// Concurrent requests per instance
    #[arg(long, default_value = "80")]
    pub concurrency: String,

    /// Average request duration (ms)
    #[arg(long, default_value = "200")]
    pub avg_duration_ms: String,

    /// Steady request rate (requests per minute)
    #[arg(long, default_value = "600")]
    pub requests_per_min: String,

    /// Deployment region
    #[arg(long, default_value = "asia-south1")]
    pub region: String,

    /// Minimum instances kept warm
    #[arg(long, default_value = "0")]
    pub min_instances: String,

    /// Maximum instances
    #[arg(long, default_value = "5")]
    pub max_instances: String,

    /// Idle CPU utilization of warm instances (%)
    #[arg(long, default_value = "10")]
    pub idle_utilization_pc: String,
}

/// Lift CLI arguments into the raw form fields the builder normalizes.
/// Values stay strings here; coercion happens in one place.
pub fn build_fields(args: &Cli) -> RawFields {
    RawFields {
        vcpu: args.vcpu.clone(),
        memory_gb: args.memory_gb.clone(),
        concurrency: args.concurrency.clone(),
        avg_duration_ms: args.avg_duration_ms.clone(),
        requests_per_min: args.requests_per_min.clone(),
        region: args.region.clone(),
        min_instances: args.min_instances.clone(),
        max_instances: args.max_instances.clone(),
        idle_utilization_pc: args.idle_utilization_pc.clone(),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let history = HistoryCache::open(open_store(&args)?);
    let client = EstimationClient::new(&args.base_url, Duration::from(args.timeout))?;
    let mut controller = SessionController::new(client, history);

    if args.history {
        for line in text_summary::build_history(controller.state.history.entries()).lines {
            println!("{line}");
        }
        return Ok(());
    }

    if let Some(index) = args.restore {
        controller.restore_index(index)?;
        render_session(&args, &controller);
        return Ok(());
    }

    controller.set_form(&build_fields(&args));
    eprintln!("Estimating via {}/api/estimate ...", args.base_url);
    controller.run_estimate().await;
    render_result(&args, &controller);
    if let Some(err) = controller.state.history.persist_error() {
        eprintln!("History not saved: {err}");
    }
    Ok(())
}

fn open_store(args: &Cli) -> Result<Box<dyn KeyValueStore>> {
    let store = match args.data_dir.as_deref() {
        Some(dir) => FileStore::open_at(dir),
        None => FileStore::open_default()?,
    };
    Ok(Box::new(store))
}

/// Print the restored form followed by its result, or just the outcome JSON.
fn render_session(args: &Cli, controller: &SessionController) {
    if args.json {
        render_result(args, controller);
        return;
    }
    for line in text_summary::build_form(&controller.state.form).lines {
        println!("{line}");
    }
    println!();
    render_result(args, controller);
}

fn render_result(args: &Cli, controller: &SessionController) {
    let Some(slot) = controller.state.result.as_ref() else {
        return;
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&slot_json(slot)).unwrap_or_default());
        return;
    }
    for line in text_summary::build_report(slot).lines {
        println!("{line}");
    }
}

/// JSON view of the result slot. Exchange failures take the same
/// `{ "error": ... }` shape the service itself uses, so scripted callers
/// only ever see the two wire shapes.
fn slot_json(slot: &ResultSlot) -> serde_json::Value {
    match slot {
        ResultSlot::Outcome(outcome) => serde_json::to_value(outcome)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
        ResultSlot::ExchangeFailed(message) => serde_json::json!({ "error": message }),
    }
}
