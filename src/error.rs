//! # TPC Error Handling
//!
//! This module defines the TpcError enum, which represents the different error
//! types that can occur in the lora-tpc crate.
//!
//! A decision that ends with a negative margin is not an error. It is returned
//! as ordinary [`Decision`](crate::lora::tpc::Decision) data.

use thiserror::Error;

/// Represents the different error types that can occur in the TPC crate.
#[derive(Debug, Error)]
pub enum TpcError {
    /// Indicates a spreading factor outside the SF7..SF12 table domain.
    #[error("Unsupported spreading factor: SF{0}")]
    UnsupportedSpreadingFactor(u8),

    /// Indicates that the configured SF bounds are inverted.
    #[error("Invalid SF range: min SF{min} > max SF{max}")]
    InvalidSfRange { min: u8, max: u8 },

    /// Indicates that the configured TP bounds are inverted.
    #[error("Invalid TP range: min {min} dBm > max {max} dBm")]
    InvalidTpRange { min: f64, max: f64 },

    /// Indicates the SNR limit table has no entry for a reachable SF.
    #[error("Missing SNR limit for SF{0}")]
    MissingSnrLimit(u8),

    /// Indicates a configuration value that is NaN or infinite.
    #[error("Non-finite configuration value: {0}")]
    NonFiniteConfig(&'static str),

    /// Indicates the configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// Indicates a prediction row whose SNR is not a finite number.
    #[error("Invalid SNR prediction at row {row}: {value}")]
    InvalidPrediction { row: usize, value: f64 },

    /// Indicates that predictions and decisions cannot be joined by position.
    #[error("Length mismatch: {predictions} predictions, {decisions} decisions")]
    LengthMismatch { predictions: usize, decisions: usize },

    /// Indicates a summary was requested over zero samples.
    #[error("Empty batch")]
    EmptyBatch,

    /// Indicates a file-system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Indicates a CSV read or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for TpcError {
    fn from(err: serde_json::Error) -> Self {
        TpcError::ConfigParse(err.to_string())
    }
}
