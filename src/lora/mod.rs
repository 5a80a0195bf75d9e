//! LoRa link control
//!
//! Link parameter types, the margin evaluator, the TPC controller and the
//! relative energy proxy used to score its decisions.

pub mod energy;
pub mod margin;
pub mod params;
pub mod tpc;

pub use energy::{normalized_energy, relative_energy};
pub use params::{get_min_snr_db, LinkParameters, SpreadingFactor};
pub use tpc::{decide, decide_traced, Decision, SweepTrace, TpcController};
