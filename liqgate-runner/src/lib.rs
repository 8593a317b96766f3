//! liqgate runner — orchestration around the pure decision stages.
//!
//! This crate builds on `liqgate-core` to provide:
//! - TOML pipeline configuration (scoring weights, audit location)
//! - Candidate signal records read from JSON or JSONL
//! - Single-signal evaluation through all six stages, with observer hooks
//! - Parallel batch evaluation
//! - JSONL audit log with content hashes, CSV and Markdown export

pub mod batch;
pub mod config;
pub mod export;
pub mod fingerprint;
pub mod history;
pub mod observer;
pub mod pipeline;
pub mod signal;

pub use batch::{evaluate_batch, evaluate_sequential, BatchOutcome, BatchSummary};
pub use config::{AuditConfig, ConfigError, PipelineConfig};
pub use export::{export_records_csv, generate_audit_report};
pub use fingerprint::{content_hash, ContentHash};
pub use history::{
    summarize, AuditEntry, AuditLog, AuditRead, AuditSummary, HistoryError, SCHEMA_VERSION,
};
pub use observer::{NoopObserver, PipelineObserver, StageEvent, TracingObserver};
pub use pipeline::{evaluate_signal, PipelineError, PipelineRecord, PointRole};
pub use signal::{load_signals, parse_signals, InputError, SignalInput};
