//! Relative energy proxy for comparing TPC decisions
//!
//! This is not a hardware or battery model. Radiated power is taken as
//! `10^(TP/10)` (dBm to linear) and time on air as roughly `2^SF`, so
//!
//! ```text
//! E_rel ∝ 10^(TP/10) * 2^SF
//! ```
//!
//! The figure has no physical unit and is only meaningful as a ratio against
//! a reference operating point: `< 1` is cheaper than the reference, `1` is
//! equal, `> 1` is more expensive.

use crate::config::MarginModel;
use crate::lora::params::{LinkParameters, SpreadingFactor};

/// Dimensionless relative energy of one operating point (always > 0)
pub fn relative_energy(tp_dbm: f64, sf: SpreadingFactor) -> f64 {
    10f64.powf(tp_dbm / 10.0) * 2f64.powi(sf.value() as i32)
}

/// Relative energy normalized against a reference operating point
pub fn normalized_energy(
    tp_dbm: f64,
    sf: SpreadingFactor,
    tp_ref: f64,
    sf_ref: SpreadingFactor,
) -> f64 {
    relative_energy(tp_dbm, sf) / relative_energy(tp_ref, sf_ref)
}

impl MarginModel {
    /// Normalized energy of `params` against the baseline operating point
    pub fn baseline_energy_norm(&self, params: &LinkParameters) -> f64 {
        normalized_energy(params.tp_dbm, params.sf, self.baseline.tp_dbm, self.baseline.sf)
    }
}
