//! # Batch Decisions
//!
//! Runs the TPC controller over a file of SNR predictions, one independent
//! decision per row, and writes the chosen parameters together with their
//! normalized energy.
//!
//! Decisions are computed in parallel with `rayon`. Output row `i` always
//! belongs to input row `i`, so results can be joined back to the source
//! dataset by position.

pub mod io;
pub mod summary;

pub use io::{
    read_predictions, read_predictions_from, write_decisions, write_decisions_to, DecisionRecord,
    PredictionRecord,
};
pub use summary::{BatchSummary, Counts};

use crate::error::TpcError;
use crate::lora::tpc::TpcController;
use log::{info, warn};
use rayon::prelude::*;
use std::path::Path;

impl DecisionRecord {
    /// Decide one prediction and score it against the baseline
    pub fn from_prediction(controller: &TpcController, prediction: &PredictionRecord) -> Self {
        let decision = controller.decide(prediction.snr_pred);
        Self {
            sf_new: decision.sf.value(),
            tp_new: decision.tp_dbm,
            me: decision.me_db,
            energy_norm: controller.energy_norm(&decision),
        }
    }
}

/// Decide every prediction, preserving input order
pub fn decide_batch(controller: &TpcController, predictions: &[PredictionRecord]) -> Vec<DecisionRecord> {
    predictions
        .par_iter()
        .map(|p| DecisionRecord::from_prediction(controller, p))
        .collect()
}

/// Outcome of [`run_batch`]
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub predictions: Vec<PredictionRecord>,
    pub decisions: Vec<DecisionRecord>,
}

impl BatchReport {
    /// Number of decisions that stayed below zero margin
    pub fn unsafe_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.me < 0.0).count()
    }

    /// Compare the batch with the controller's baseline
    pub fn summarize(&self, controller: &TpcController) -> Result<BatchSummary, TpcError> {
        BatchSummary::compute(controller.model(), &self.predictions, &self.decisions)
    }
}

/// Read predictions from `input`, decide them all, write the decisions to `output`
pub fn run_batch(
    controller: &TpcController,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<BatchReport, TpcError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let predictions = read_predictions(input)?;
    info!("Batch: read {} predictions from {}", predictions.len(), input.display());

    let decisions = decide_batch(controller, &predictions);
    write_decisions(output, &decisions)?;
    info!("Batch: wrote {} decisions to {}", decisions.len(), output.display());

    let report = BatchReport {
        predictions,
        decisions,
    };

    let unsafe_count = report.unsafe_count();
    if unsafe_count > 0 {
        warn!(
            "Batch: {unsafe_count} of {} samples remain below zero margin at the SF/TP ceiling",
            report.decisions.len()
        );
    }

    Ok(report)
}
