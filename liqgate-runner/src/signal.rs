//! Candidate signal records — the runner's input format.
//!
//! One `SignalInput` carries everything a single evaluation needs: the raw
//! point inputs as an upstream detector emits them, the scenario template and
//! direction, gate and evidence flags, candidate stop/target points, the
//! externally computed guardrail result, and the evaluation instant.
//!
//! Signals are read either as a JSON array or as JSONL (one object per line).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use liqgate_core::domain::{Timestamp, TradeDirection};
use liqgate_core::{GuardrailResult, OptionalEvidence, PointInput, RequiredGates, TemplateKind};

/// One recorded candidate signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalInput {
    pub signal_id: String,
    /// Instant the whole chain is evaluated at. Never the wall clock.
    pub evaluated_at: Timestamp,
    pub template: TemplateKind,
    pub direction: TradeDirection,
    pub entry: PointInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub htf: Option<PointInput>,
    pub required_gates: RequiredGates,
    #[serde(default)]
    pub optional_evidence: OptionalEvidence,
    /// Priority-ordered: the first qualifying stop wins.
    #[serde(default)]
    pub stop_loss_candidates: Vec<PointInput>,
    #[serde(default)]
    pub take_profit_candidates: Vec<PointInput>,
    pub guardrail: GuardrailResult,
}

/// Errors from reading signal files.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read signals from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid signal array: {0}")]
    Array(#[source] serde_json::Error),

    #[error("invalid signal on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read signals from a file (JSON array or JSONL).
pub fn load_signals(path: &Path) -> Result<Vec<SignalInput>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_signals(&content)
}

/// Parse signals from text.
///
/// A document whose first non-blank character is `[` is read as one JSON
/// array; anything else is read as JSONL. Blank lines are ignored. Unlike the
/// audit log, a malformed input line is an error: silently dropping a signal
/// would make the run unreproducible.
pub fn parse_signals(content: &str) -> Result<Vec<SignalInput>, InputError> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(InputError::Array);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| InputError::Line {
                line: idx + 1,
                source,
            })
        })
        .collect()
}
