//! # Baseline Comparison Summary
//!
//! Compares a batch of TPC decisions with the fixed baseline operating point
//! every sample would otherwise use:
//!
//! - SF and TP distributions, old (baseline) against new (controller)
//! - share of samples with a non-negative margin, old against new
//! - energy statistics relative to the baseline (which is 1.0 by definition)
//!
//! Rows of the prediction and decision slices are joined by position.

use crate::batch::io::{DecisionRecord, PredictionRecord};
use crate::config::MarginModel;
use crate::error::TpcError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sample count before and after control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub old: usize,
    pub new: usize,
}

/// Aggregated comparison of one batch against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub samples: usize,
    pub sf_counts: BTreeMap<u8, Counts>,
    /// Keyed by TP rounded to whole dBm
    pub tp_counts: BTreeMap<i32, Counts>,
    pub pct_link_safe_old: f64,
    pub pct_link_safe_new: f64,
    pub energy_norm_mean: f64,
    pub energy_norm_median: f64,
    pub pct_energy_below_1: f64,
    pub pct_energy_below_half: f64,
    pub mean_energy_reduction_pct: f64,
    pub median_energy_reduction_pct: f64,
}

fn percent(hits: usize, total: usize) -> f64 {
    hits as f64 / total as f64 * 100.0
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

impl BatchSummary {
    /// Summarize `decisions` against the baseline of `model`
    pub fn compute(
        model: &MarginModel,
        predictions: &[PredictionRecord],
        decisions: &[DecisionRecord],
    ) -> Result<Self, TpcError> {
        if predictions.len() != decisions.len() {
            return Err(TpcError::LengthMismatch {
                predictions: predictions.len(),
                decisions: decisions.len(),
            });
        }
        if decisions.is_empty() {
            return Err(TpcError::EmptyBatch);
        }

        let samples = decisions.len();
        let baseline = model.baseline();

        let mut sf_counts: BTreeMap<u8, Counts> = BTreeMap::new();
        let mut tp_counts: BTreeMap<i32, Counts> = BTreeMap::new();
        sf_counts.entry(baseline.sf.value()).or_default().old = samples;
        tp_counts.entry(baseline.tp_dbm.round() as i32).or_default().old = samples;
        for d in decisions {
            sf_counts.entry(d.sf_new).or_default().new += 1;
            tp_counts.entry(d.tp_new.round() as i32).or_default().new += 1;
        }

        let safe_old = predictions
            .iter()
            .filter(|p| model.margin(p.snr_pred, baseline.sf, baseline.tp_dbm) >= 0.0)
            .count();
        let safe_new = decisions.iter().filter(|d| d.me >= 0.0).count();

        let mut energy: Vec<f64> = decisions.iter().map(|d| d.energy_norm).collect();
        let energy_norm_mean = energy.iter().sum::<f64>() / samples as f64;
        let below_1 = energy.iter().filter(|&&e| e < 1.0).count();
        let below_half = energy.iter().filter(|&&e| e < 0.5).count();
        let energy_norm_median = median(&mut energy);

        Ok(Self {
            samples,
            sf_counts,
            tp_counts,
            pct_link_safe_old: percent(safe_old, samples),
            pct_link_safe_new: percent(safe_new, samples),
            energy_norm_mean,
            energy_norm_median,
            pct_energy_below_1: percent(below_1, samples),
            pct_energy_below_half: percent(below_half, samples),
            mean_energy_reduction_pct: (1.0 - energy_norm_mean) * 100.0,
            median_energy_reduction_pct: (1.0 - energy_norm_median) * 100.0,
        })
    }

    /// Human-readable multi-line report
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("SF counts (old vs new):\n");
        for (sf, c) in &self.sf_counts {
            out.push_str(&format!("  SF{sf:<3} {:>8} {:>8}\n", c.old, c.new));
        }
        out.push_str("TP counts (old vs new):\n");
        for (tp, c) in &self.tp_counts {
            out.push_str(&format!("  {tp:>3} dBm {:>8} {:>8}\n", c.old, c.new));
        }
        out.push_str(&format!(
            "pct_me_ge_0_old = {:.2} %\npct_me_ge_0_new = {:.2} %\n",
            self.pct_link_safe_old, self.pct_link_safe_new
        ));
        out.push_str(&format!(
            "energy_norm_new mean = {:.4}\nenergy_norm_new median = {:.4}\n",
            self.energy_norm_mean, self.energy_norm_median
        ));
        out.push_str(&format!(
            "pct_energy_below_1_new = {:.2} %\npct_energy_below_0_5_new = {:.2} %\n",
            self.pct_energy_below_1, self.pct_energy_below_half
        ));
        out.push_str(&format!(
            "mean_energy_reduction_vs_baseline = {:.2} %\nmedian_energy_reduction_vs_baseline = {:.2} %\n",
            self.mean_energy_reduction_pct, self.median_energy_reduction_pct
        ));
        out
    }
}
