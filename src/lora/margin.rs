//! Link margin evaluation
//!
//! A TP change is modelled as a linear dB shift of the received SNR relative
//! to the baseline TP:
//!
//! ```text
//! snr_eff = snr_pred + (tp - baseline_tp)
//! Me      = snr_eff - snr_limit(sf) - LM
//! ```

use crate::config::MarginModel;
use crate::lora::params::{LinkParameters, SpreadingFactor};

impl MarginModel {
    /// Minimum decodable SNR for `sf` in dB
    pub fn snr_limit(&self, sf: SpreadingFactor) -> f64 {
        self.snr_limits.get(sf)
    }

    /// Predicted SNR shifted by the TP delta from the baseline
    pub fn effective_snr(&self, snr_pred: f64, tp_dbm: f64) -> f64 {
        snr_pred + (tp_dbm - self.baseline.tp_dbm)
    }

    /// Link margin `Me` in dB for a candidate operating point
    pub fn margin(&self, snr_pred: f64, sf: SpreadingFactor, tp_dbm: f64) -> f64 {
        self.effective_snr(snr_pred, tp_dbm) - self.snr_limit(sf) - self.link_margin_db
    }
}

/// Link margin for `params` against `snr_pred`
pub fn margin(model: &MarginModel, snr_pred: f64, params: &LinkParameters) -> f64 {
    model.margin(snr_pred, params.sf, params.tp_dbm)
}
