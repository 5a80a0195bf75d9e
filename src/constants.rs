//! TPC Configuration Constants
//!
//! Default operating bounds, link margin and baseline for EU868-style LoRa
//! links. The default SNR floors live in `lora::params::get_min_snr_db`.

/// Lowest spreading factor the controller may select
pub const SF_MIN: u8 = 7;

/// Highest spreading factor the controller may select
pub const SF_MAX: u8 = 12;

/// Lowest transmit power in dBm
pub const TP_MIN_DBM: f64 = 2.0;

/// Highest transmit power in dBm (EU868 limit)
pub const TP_MAX_DBM: f64 = 14.0;

/// Transmit power adjustment step in dB
pub const TP_STEP_DB: f64 = 1.0;

/// Fixed safety margin subtracted from the raw SNR headroom
pub const LINK_MARGIN_DB: f64 = 10.0;

/// Baseline spreading factor (starting state and energy reference)
pub const BASELINE_SF: u8 = 12;

/// Baseline transmit power in dBm (starting state and energy reference)
pub const BASELINE_TP_DBM: f64 = 14.0;
