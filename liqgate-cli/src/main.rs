//! liqgate CLI — evaluate recorded signals, inspect audit logs, check configs.
//!
//! Commands:
//! - `evaluate` — run signals from a JSON/JSONL file through the pipeline
//! - `audit` — summarize an audit log by action and risk outcome
//! - `check-config` — validate a pipeline config and print its hash

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use liqgate_runner::{
    evaluate_batch, export_records_csv, generate_audit_report, load_signals, summarize,
    AuditEntry, AuditLog, BatchSummary, PipelineConfig, TracingObserver,
};

#[derive(Parser)]
#[command(
    name = "liqgate",
    about = "liqgate CLI — deterministic liquidity-structure decision pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate candidate signals through all six stages.
    Evaluate {
        /// Path to the pipeline TOML config.
        #[arg(long)]
        config: PathBuf,

        /// Signals as a JSON array or JSONL.
        #[arg(long)]
        input: PathBuf,

        /// Append audit entries here. Overrides `[audit] path` in the config.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write a CSV decision tape.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Summarize an audit log.
    Audit {
        /// Path to the JSONL audit log.
        #[arg(long)]
        path: PathBuf,

        /// Print the summary as JSON instead of Markdown.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Validate a pipeline config.
    CheckConfig {
        /// Path to the pipeline TOML config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            config,
            input,
            output,
            csv,
        } => run_evaluate(&config, &input, output, csv),
        Commands::Audit { path, json } => run_audit(&path, json),
        Commands::CheckConfig { config } => run_check_config(&config),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_evaluate(
    config_path: &Path,
    input_path: &Path,
    output: Option<PathBuf>,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let config = PipelineConfig::from_file(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let signals = load_signals(input_path)
        .with_context(|| format!("loading signals {}", input_path.display()))?;
    info!(signals = signals.len(), input = %input_path.display(), "evaluating");

    let outcomes = evaluate_batch(&signals, &config, &TracingObserver);
    let summary = BatchSummary::from_outcomes(&outcomes);

    let mut entries = Vec::with_capacity(outcomes.len());
    for (input, outcome) in signals.iter().zip(outcomes) {
        match outcome {
            Ok(record) => {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.signal_id,
                    record.decision.action,
                    record.risk.status,
                    if record.is_actionable() { "actionable" } else { "-" }
                );
                entries.push(
                    AuditEntry::new(input, &config, record)
                        .context("hashing audit entry")?,
                );
            }
            Err(e) => error!(signal_id = %input.signal_id, "{e}"),
        }
    }

    let audit_path = output.or_else(|| config.audit_path().map(Path::to_path_buf));
    if let Some(path) = audit_path {
        AuditLog::new(path.clone())
            .append_all(&entries)
            .with_context(|| format!("appending to audit log {}", path.display()))?;
        info!(entries = entries.len(), path = %path.display(), "audit log updated");
    }

    if let Some(path) = csv_path {
        let records: Vec<_> = entries.iter().map(|e| e.record.clone()).collect();
        let csv = export_records_csv(&records)?;
        std::fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "CSV written");
    }

    println!(
        "{} evaluated, {} actionable, {} rejected",
        summary.total, summary.actionable, summary.rejected
    );

    if summary.rejected > 0 {
        bail!("{} of {} signals rejected", summary.rejected, summary.total);
    }
    Ok(())
}

fn run_audit(path: &Path, json: bool) -> Result<()> {
    if !path.exists() {
        warn!(path = %path.display(), "audit log does not exist");
    }
    let log = AuditLog::new(path.to_path_buf());
    let read = log
        .read_checked()
        .with_context(|| format!("reading audit log {}", path.display()))?;
    let bytes = log
        .file_size_bytes()
        .with_context(|| format!("reading size of {}", path.display()))?;
    info!(
        entries = read.entries.len(),
        skipped = read.skipped_lines.len(),
        bytes,
        "audit log read"
    );
    if !read.skipped_lines.is_empty() {
        warn!(lines = ?read.skipped_lines, "malformed audit lines were not counted");
    }
    let summary = summarize(&read.entries);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", generate_audit_report(&summary));
    }
    Ok(())
}

fn run_check_config(path: &Path) -> Result<()> {
    let config = PipelineConfig::from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    let hash = config.config_hash().context("hashing config")?;

    println!("config OK: {}", path.display());
    println!("  max possible score: {}", config.weights.max_possible_score());
    println!("  news risk weight:   {}", config.weights.news_risk);
    match config.audit_path() {
        Some(p) => println!("  audit log:          {}", p.display()),
        None => println!("  audit log:          (none)"),
    }
    println!("  config hash:        {hash}");

    if config.weights.max_possible_score() <= 0.0 {
        warn!("positive weights sum to zero or less; every score will normalize to 0");
    }
    Ok(())
}
