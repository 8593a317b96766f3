//! Audit log — JSONL append-only persistence of evaluated signals.
//!
//! Each line is one `AuditEntry`: the full pipeline record plus content hashes
//! of the input and the weights that produced it, so any line can be replayed
//! and checked. Appending never rewrites earlier lines.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::fingerprint::{content_hash, ContentHash};
use crate::pipeline::PipelineRecord;
use crate::signal::SignalInput;

/// Current schema version for audit entries.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the audit log.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("audit entry serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "audit entry on line {line} has schema version {found} (max supported: {max})",
        max = SCHEMA_VERSION
    )]
    UnsupportedSchema { line: usize, found: u32 },
}

/// One audit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub input_hash: ContentHash,
    pub config_hash: ContentHash,
    pub record: PipelineRecord,
}

/// Entries written before the field existed are version 1.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AuditEntry {
    pub fn new(
        input: &SignalInput,
        config: &PipelineConfig,
        record: PipelineRecord,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            input_hash: content_hash(input)?,
            config_hash: config.config_hash()?,
            record,
        })
    }
}

/// JSONL audit file manager.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry, creating the file and its parent directories on first use.
    pub fn append(&self, entry: &AuditEntry) -> Result<(), HistoryError> {
        self.append_all(std::slice::from_ref(entry))
    }

    /// Append entries in order with a single open/flush.
    pub fn append_all(&self, entries: &[AuditEntry]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for entry in entries {
            let json = serde_json::to_string(entry)?;
            writeln!(file, "{json}")?;
        }
        file.flush()?;
        Ok(())
    }

    /// Read every entry, dropping the list of skipped lines.
    pub fn read_all(&self) -> Result<Vec<AuditEntry>, HistoryError> {
        Ok(self.read_checked()?.entries)
    }

    /// Read every entry and report which lines were skipped.
    ///
    /// Malformed lines are skipped with a warning, a truncated final write
    /// included. An entry from a newer schema is an error: reading it as the
    /// current one would silently misreport it.
    pub fn read_checked(&self) -> Result<AuditRead, HistoryError> {
        if !self.path.exists() {
            return Ok(AuditRead::default());
        }

        let reader = io::BufReader::new(fs::File::open(&self.path)?);
        let mut entries = Vec::new();
        let mut skipped_lines = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = idx + 1,
                        error = %e,
                        "skipping malformed audit line"
                    );
                    skipped_lines.push(idx + 1);
                    continue;
                }
            };
            if entry.schema_version > SCHEMA_VERSION {
                return Err(HistoryError::UnsupportedSchema {
                    line: idx + 1,
                    found: entry.schema_version,
                });
            }
            entries.push(entry);
        }

        Ok(AuditRead {
            entries,
            skipped_lines,
        })
    }

    /// Current file size in bytes, 0 if the file does not exist yet.
    pub fn file_size_bytes(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Entries read from a log, plus the 1-based numbers of lines that did not parse.
#[derive(Debug, Clone, Default)]
pub struct AuditRead {
    pub entries: Vec<AuditEntry>,
    pub skipped_lines: Vec<usize>,
}

/// Counts over a set of audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub actionable: usize,
    /// Keyed by action label.
    pub by_action: BTreeMap<String, usize>,
    /// Keyed by risk invalidation reason; valid contracts count under `VALID`.
    pub by_risk_reason: BTreeMap<String, usize>,
    /// Keyed by config hash, to spot runs made under different weights.
    pub by_config: BTreeMap<String, usize>,
}

pub fn summarize(entries: &[AuditEntry]) -> AuditSummary {
    let mut summary = AuditSummary {
        total: entries.len(),
        ..AuditSummary::default()
    };

    for entry in entries {
        let record = &entry.record;
        if record.is_actionable() {
            summary.actionable += 1;
        }
        *summary
            .by_action
            .entry(record.decision.action.to_string())
            .or_default() += 1;
        let reason = record
            .risk
            .invalidation_reason
            .map_or_else(|| "VALID".to_string(), |r| r.to_string());
        *summary.by_risk_reason.entry(reason).or_default() += 1;
        *summary
            .by_config
            .entry(entry.config_hash.to_string())
            .or_default() += 1;
    }

    summary
}

// ─── Tests ───────────────────────────────────────────────────────────
