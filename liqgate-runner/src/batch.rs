//! Batch evaluation of independent signals.

use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::observer::PipelineObserver;
use crate::pipeline::{evaluate_signal, PipelineError, PipelineRecord};
use crate::signal::SignalInput;

/// Outcome of one signal in a batch.
pub type BatchOutcome = Result<PipelineRecord, PipelineError>;

/// Evaluate `inputs` in parallel using Rayon.
///
/// Signals share no state, so the output is the same as sequential
/// evaluation and stays in input order. A rejected signal does not stop
/// the others.
pub fn evaluate_batch(
    inputs: &[SignalInput],
    config: &PipelineConfig,
    observer: &dyn PipelineObserver,
) -> Vec<BatchOutcome> {
    inputs
        .par_iter()
        .map(|input| evaluate_signal(input, config, observer))
        .collect()
}

/// Evaluate `inputs` one after another on the calling thread.
pub fn evaluate_sequential(
    inputs: &[SignalInput],
    config: &PipelineConfig,
    observer: &dyn PipelineObserver,
) -> Vec<BatchOutcome> {
    inputs
        .iter()
        .map(|input| evaluate_signal(input, config, observer))
        .collect()
}

/// Counts over a batch's outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub rejected: usize,
    pub actionable: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Self::default()
            },
            |mut acc, outcome| {
                match outcome {
                    Ok(record) if record.is_actionable() => acc.actionable += 1,
                    Ok(_) => {}
                    Err(_) => acc.rejected += 1,
                }
                acc
            },
        )
    }
}
