//! Margin-driven Transmit Power Control (TPC) for LoRa
//!
//! Chooses a spreading factor and transmit power for one transmission given a
//! predicted SNR. The search runs four monotone sweeps in a fixed order:
//!
//! 1. raise SF while the margin is negative
//! 2. raise TP while the margin is still negative
//! 3. lower SF while the margin one step down stays non-negative
//! 4. lower TP while the margin one step down stays non-negative
//!
//! The order is a policy, not an optimum search: SF is adjusted before TP in
//! both directions and the full (SF, TP) grid is never explored. Each sweep is
//! bounded by the configured ranges, so a decision always terminates.
//!
//! When even (SF max, TP max) cannot reach a non-negative margin the decision
//! is returned with a negative `me_db`. That outcome is data, not an error.

use crate::config::MarginModel;
use crate::constants::TP_STEP_DB;
use crate::lora::params::{LinkParameters, SpreadingFactor};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// TPC decision output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Chosen spreading factor
    pub sf: SpreadingFactor,

    /// Chosen transmit power in dBm
    pub tp_dbm: f64,

    /// Margin achieved by (sf, tp_dbm) against the SNR prediction
    pub me_db: f64,
}

impl Decision {
    /// Chosen operating point
    pub fn params(&self) -> LinkParameters {
        LinkParameters::new(self.sf, self.tp_dbm)
    }

    /// Non-negative margin
    pub fn is_link_safe(&self) -> bool {
        self.me_db >= 0.0
    }
}

/// Per-phase step counts of one decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepTrace {
    pub sf_raised: u32,
    pub tp_raised: u32,
    pub sf_lowered: u32,
    pub tp_lowered: u32,

    /// Number of margin evaluations, including the final one
    pub evaluations: u32,
}

impl SweepTrace {
    /// Total parameter adjustments across all four sweeps
    pub fn steps(&self) -> u32 {
        self.sf_raised + self.tp_raised + self.sf_lowered + self.tp_lowered
    }
}

/// Clamp a caller-supplied start state into the configured bounds
fn start_state(
    model: &MarginModel,
    sf_start: Option<SpreadingFactor>,
    tp_start: Option<f64>,
) -> LinkParameters {
    let baseline = model.baseline();

    let sf = sf_start
        .unwrap_or(baseline.sf)
        .clamp(model.sf_min(), model.sf_max());

    let tp = tp_start
        .filter(|tp| tp.is_finite())
        .unwrap_or(baseline.tp_dbm)
        .clamp(model.tp_min_dbm(), model.tp_max_dbm());

    let start = LinkParameters::new(sf, tp);
    let requested = LinkParameters::new(
        sf_start.unwrap_or(baseline.sf),
        tp_start.unwrap_or(baseline.tp_dbm),
    );
    if start != requested {
        debug!("TPC: Start state {requested} clamped to {start}");
    }

    start
}

/// Run the four sweeps and record how far each one moved
pub fn decide_traced(
    model: &MarginModel,
    snr_pred: f64,
    sf_start: Option<SpreadingFactor>,
    tp_start: Option<f64>,
) -> (Decision, SweepTrace) {
    let start = start_state(model, sf_start, tp_start);
    let mut sf = start.sf;
    let mut tp = start.tp_dbm;
    let mut trace = SweepTrace::default();

    let evaluations = Cell::new(0u32);
    let me = |sf: SpreadingFactor, tp: f64| {
        evaluations.set(evaluations.get() + 1);
        model.margin(snr_pred, sf, tp)
    };

    // Negative margin: grow SF first, then TP
    while me(sf, tp) < 0.0 && sf < model.sf_max() {
        match sf.next() {
            Some(next) => sf = next,
            None => break,
        }
        trace.sf_raised += 1;
    }

    while me(sf, tp) < 0.0 && tp < model.tp_max_dbm() {
        tp = (tp + TP_STEP_DB).min(model.tp_max_dbm());
        trace.tp_raised += 1;
    }

    // Shrink SF, then TP, only while the next step down keeps Me >= 0
    while sf > model.sf_min() {
        match sf.prev() {
            Some(lower) if me(lower, tp) >= 0.0 => sf = lower,
            _ => break,
        }
        trace.sf_lowered += 1;
    }

    while tp > model.tp_min_dbm() {
        let lower = (tp - TP_STEP_DB).max(model.tp_min_dbm());
        if me(sf, lower) < 0.0 {
            break;
        }
        tp = lower;
        trace.tp_lowered += 1;
    }

    let decision = Decision {
        sf,
        tp_dbm: tp,
        me_db: me(sf, tp),
    };
    trace.evaluations = evaluations.get();

    debug!(
        "TPC: SNR {} dB → {} @ {} dBm, Me {} dB ({} steps)",
        snr_pred,
        decision.sf,
        decision.tp_dbm,
        decision.me_db,
        trace.steps()
    );

    (decision, trace)
}

/// Choose (SF, TP) for one predicted SNR
///
/// Missing start values default to the configured baseline.
pub fn decide(
    model: &MarginModel,
    snr_pred: f64,
    sf_start: Option<SpreadingFactor>,
    tp_start: Option<f64>,
) -> Decision {
    decide_traced(model, snr_pred, sf_start, tp_start).0
}

/// Stateless TPC service around an immutable [`MarginModel`]
///
/// All methods take `&self`; one controller can be shared by any number of
/// worker threads.
#[derive(Debug, Clone, Default)]
pub struct TpcController {
    model: MarginModel,
}

impl TpcController {
    /// Create a controller with the default margin model
    pub fn new() -> Self {
        Self::with_model(MarginModel::default())
    }

    /// Create a controller with a validated margin model
    pub fn with_model(model: MarginModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &MarginModel {
        &self.model
    }

    /// Decide starting from the baseline
    pub fn decide(&self, snr_pred: f64) -> Decision {
        decide(&self.model, snr_pred, None, None)
    }

    /// Decide starting from a caller-supplied state
    pub fn decide_from(&self, snr_pred: f64, start: LinkParameters) -> Decision {
        decide(&self.model, snr_pred, Some(start.sf), Some(start.tp_dbm))
    }

    /// Normalized energy of a decision against the configured baseline
    pub fn energy_norm(&self, decision: &Decision) -> f64 {
        self.model.baseline_energy_norm(&decision.params())
    }

    /// Upper bound on adjustment steps for the configured ranges
    pub fn max_steps(&self) -> u32 {
        let sf_span = (self.model.sf_max().value() - self.model.sf_min().value()) as u32;
        let tp_span = ((self.model.tp_max_dbm() - self.model.tp_min_dbm()) / TP_STEP_DB).ceil() as u32;
        2 * sf_span + 2 * tp_span
    }
}
