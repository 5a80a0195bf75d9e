//! # lora-tpc - Margin-Driven Link Parameter Control for LoRa
//!
//! The lora-tpc crate picks a Spreading Factor (SF) and Transmit Power (TP)
//! for a LoRa transmission from a predicted SNR. It keeps the link margin
//! non-negative where the configured ranges allow it and prefers the cheaper
//! operating point under a relative energy proxy.
//!
//! ## Features
//!
//! - Link margin evaluation against a per-SF SNR floor and a fixed safety margin
//! - Deterministic four-sweep TPC controller with bounded termination
//! - Relative and baseline-normalized energy scoring
//! - Validated JSON configuration loaded once at startup
//! - Parallel batch decisions over CSV prediction files, with a baseline summary
//!
//! ## Usage
//!
//! ```rust
//! use lora_tpc::{SpreadingFactor, TpcController};
//!
//! let controller = TpcController::new();
//! let decision = controller.decide(-5.0);
//!
//! assert_eq!(decision.sf, SpreadingFactor::SF10);
//! assert_eq!(decision.tp_dbm, 14.0);
//! assert!(decision.is_link_safe());
//! assert_eq!(controller.energy_norm(&decision), 0.25);
//! ```

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod lora;

pub use crate::error::TpcError;
pub use crate::logging::{init_logger, log_info};

pub use config::{MarginModel, SnrLimitTable, TpcConfig};
pub use lora::{
    decide, decide_traced, normalized_energy, relative_energy, Decision, LinkParameters,
    SpreadingFactor, SweepTrace, TpcController,
};
pub use batch::{decide_batch, run_batch, BatchReport, BatchSummary, DecisionRecord, PredictionRecord};
