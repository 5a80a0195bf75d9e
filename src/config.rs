//! # Link Controller Configuration
//!
//! [`TpcConfig`] is the raw, serializable form loaded from JSON. It is turned
//! into a [`MarginModel`] once at startup; every check that could fail happens
//! there, so the decision path never sees an incomplete table.
//!
//! ```rust
//! use lora_tpc::config::{MarginModel, TpcConfig};
//!
//! let model = MarginModel::try_from(TpcConfig::default()).unwrap();
//! assert_eq!(model.link_margin_db(), 10.0);
//! ```

use crate::constants::{
    BASELINE_SF, BASELINE_TP_DBM, LINK_MARGIN_DB, SF_MAX, SF_MIN, TP_MAX_DBM, TP_MIN_DBM,
};
use crate::error::TpcError;
use crate::lora::params::{get_min_snr_db, LinkParameters, SpreadingFactor};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Controller configuration as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TpcConfig {
    /// Minimum spreading factor allowed
    pub sf_min: u8,

    /// Maximum spreading factor allowed
    pub sf_max: u8,

    /// Minimum transmit power in dBm
    pub tp_min_dbm: f64,

    /// Maximum transmit power in dBm
    pub tp_max_dbm: f64,

    /// Safety margin subtracted from the SNR headroom (dB)
    pub link_margin_db: f64,

    /// Minimum decodable SNR per SF (dB)
    pub snr_limit_by_sf: BTreeMap<u8, f64>,

    /// Reference SF for the default start state and energy normalization
    pub baseline_sf: u8,

    /// Reference TP for the margin delta and energy normalization (dBm)
    pub baseline_tp_dbm: f64,
}

impl Default for TpcConfig {
    fn default() -> Self {
        Self {
            sf_min: SF_MIN,
            sf_max: SF_MAX,
            tp_min_dbm: TP_MIN_DBM,
            tp_max_dbm: TP_MAX_DBM,
            link_margin_db: LINK_MARGIN_DB,
            snr_limit_by_sf: SpreadingFactor::ALL
                .into_iter()
                .map(|sf| (sf.value(), get_min_snr_db(sf)))
                .collect(),
            baseline_sf: BASELINE_SF,
            baseline_tp_dbm: BASELINE_TP_DBM,
        }
    }
}

impl TpcConfig {
    /// Parse a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, TpcError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TpcError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate into an immutable [`MarginModel`]
    pub fn validate(&self) -> Result<MarginModel, TpcError> {
        MarginModel::try_from(self.clone())
    }
}

/// Minimum decodable SNR for every spreading factor
///
/// Fixed-size and total over [`SpreadingFactor`], so a lookup cannot miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnrLimitTable([f64; 6]);

impl SnrLimitTable {
    /// Datasheet SNR floors
    pub fn datasheet() -> Self {
        Self(SpreadingFactor::ALL.map(get_min_snr_db))
    }

    /// SNR limit for `sf` in dB
    pub fn get(&self, sf: SpreadingFactor) -> f64 {
        self.0[sf.index()]
    }

    fn set(&mut self, sf: SpreadingFactor, limit_db: f64) {
        self.0[sf.index()] = limit_db;
    }
}

impl Default for SnrLimitTable {
    fn default() -> Self {
        Self::datasheet()
    }
}

/// Validated, read-only margin model shared by every decision
#[derive(Debug, Clone, PartialEq)]
pub struct MarginModel {
    pub(crate) sf_min: SpreadingFactor,
    pub(crate) sf_max: SpreadingFactor,
    pub(crate) tp_min_dbm: f64,
    pub(crate) tp_max_dbm: f64,
    pub(crate) link_margin_db: f64,
    pub(crate) snr_limits: SnrLimitTable,
    pub(crate) baseline: LinkParameters,
}

impl Default for MarginModel {
    fn default() -> Self {
        Self {
            sf_min: SpreadingFactor::SF7,
            sf_max: SpreadingFactor::SF12,
            tp_min_dbm: TP_MIN_DBM,
            tp_max_dbm: TP_MAX_DBM,
            link_margin_db: LINK_MARGIN_DB,
            snr_limits: SnrLimitTable::datasheet(),
            baseline: LinkParameters::new(SpreadingFactor::SF12, BASELINE_TP_DBM),
        }
    }
}

fn finite(value: f64, field: &'static str) -> Result<f64, TpcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TpcError::NonFiniteConfig(field))
    }
}

impl TryFrom<TpcConfig> for MarginModel {
    type Error = TpcError;

    fn try_from(config: TpcConfig) -> Result<Self, Self::Error> {
        let sf_min = SpreadingFactor::try_from(config.sf_min)?;
        let sf_max = SpreadingFactor::try_from(config.sf_max)?;
        if sf_min > sf_max {
            return Err(TpcError::InvalidSfRange {
                min: config.sf_min,
                max: config.sf_max,
            });
        }

        let tp_min_dbm = finite(config.tp_min_dbm, "tp_min_dbm")?;
        let tp_max_dbm = finite(config.tp_max_dbm, "tp_max_dbm")?;
        if tp_min_dbm > tp_max_dbm {
            return Err(TpcError::InvalidTpRange {
                min: tp_min_dbm,
                max: tp_max_dbm,
            });
        }

        let link_margin_db = finite(config.link_margin_db, "link_margin_db")?;
        let baseline = LinkParameters::new(
            SpreadingFactor::try_from(config.baseline_sf)?,
            finite(config.baseline_tp_dbm, "baseline_tp_dbm")?,
        );

        let mut snr_limits = SnrLimitTable::datasheet();
        for (&sf, &limit) in &config.snr_limit_by_sf {
            let sf = SpreadingFactor::try_from(sf)?;
            snr_limits.set(sf, finite(limit, "snr_limit_by_sf")?);
        }
        for sf in SpreadingFactor::ALL
            .into_iter()
            .filter(|sf| (sf_min..=sf_max).contains(sf))
        {
            if !config.snr_limit_by_sf.contains_key(&sf.value()) {
                return Err(TpcError::MissingSnrLimit(sf.value()));
            }
        }

        let model = Self {
            sf_min,
            sf_max,
            tp_min_dbm,
            tp_max_dbm,
            link_margin_db,
            snr_limits,
            baseline,
        };

        if !model.has_monotone_limits() {
            warn!("SNR limit table is not non-increasing between {sf_min} and {sf_max}");
        }

        Ok(model)
    }
}

impl MarginModel {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TpcError> {
        TpcConfig::from_file(path)?.validate()
    }

    pub fn sf_min(&self) -> SpreadingFactor {
        self.sf_min
    }

    pub fn sf_max(&self) -> SpreadingFactor {
        self.sf_max
    }

    pub fn tp_min_dbm(&self) -> f64 {
        self.tp_min_dbm
    }

    pub fn tp_max_dbm(&self) -> f64 {
        self.tp_max_dbm
    }

    pub fn link_margin_db(&self) -> f64 {
        self.link_margin_db
    }

    pub fn snr_limits(&self) -> &SnrLimitTable {
        &self.snr_limits
    }

    /// Baseline operating point
    pub fn baseline(&self) -> LinkParameters {
        self.baseline
    }

    /// Whether `params` lies inside the configured closed bounds
    pub fn contains(&self, params: &LinkParameters) -> bool {
        (self.sf_min..=self.sf_max).contains(&params.sf)
            && params.tp_dbm >= self.tp_min_dbm
            && params.tp_dbm <= self.tp_max_dbm
    }

    /// Convert back to the serializable form
    pub fn to_config(&self) -> TpcConfig {
        TpcConfig {
            sf_min: self.sf_min.value(),
            sf_max: self.sf_max.value(),
            tp_min_dbm: self.tp_min_dbm,
            tp_max_dbm: self.tp_max_dbm,
            link_margin_db: self.link_margin_db,
            snr_limit_by_sf: SpreadingFactor::ALL
                .into_iter()
                .filter(|sf| (self.sf_min..=self.sf_max).contains(sf))
                .map(|sf| (sf.value(), self.snr_limits.get(sf)))
                .collect(),
            baseline_sf: self.baseline.sf.value(),
            baseline_tp_dbm: self.baseline.tp_dbm,
        }
    }

    fn has_monotone_limits(&self) -> bool {
        let active: Vec<f64> = SpreadingFactor::ALL
            .into_iter()
            .filter(|sf| (self.sf_min..=self.sf_max).contains(sf))
            .map(|sf| self.snr_limits.get(sf))
            .collect();
        active.windows(2).all(|pair| pair[1] <= pair[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_model() {
        let model = TpcConfig::default().validate().unwrap();
        assert_eq!(model, MarginModel::default());
    }

    #[test]
    fn test_default_limits_are_datasheet_floors() {
        let config = TpcConfig::default();
        assert_eq!(config.snr_limit_by_sf.len(), SpreadingFactor::ALL.len());
        for sf in SpreadingFactor::ALL {
            assert_eq!(config.snr_limit_by_sf[&sf.value()], get_min_snr_db(sf));
        }
        assert_eq!(config.snr_limit_by_sf[&7], -7.5);
        assert_eq!(config.snr_limit_by_sf[&12], -20.0);
    }

    #[test]
    fn test_default_limits_are_monotone() {
        assert!(MarginModel::default().has_monotone_limits());
    }

    #[test]
    fn test_rising_limit_is_detected_but_accepted() {
        let mut config = TpcConfig::default();
        // SF10 floor above SF9
        config.snr_limit_by_sf.insert(10, -11.0);
        let model = config.validate().unwrap();
        assert!(!model.has_monotone_limits());
        assert_eq!(model.snr_limit(SpreadingFactor::SF10), -11.0);
    }

    #[test]
    fn test_rising_limit_outside_bounds_is_ignored() {
        let config = TpcConfig {
            sf_min: 7,
            sf_max: 9,
            snr_limit_by_sf: [(7, -7.5), (8, -10.0), (9, -12.5), (10, 0.0)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        assert!(config.validate().unwrap().has_monotone_limits());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TpcConfig::from_json_str(r#"{ "link_margin_db": 6.0 }"#).unwrap();
        assert_eq!(config.link_margin_db, 6.0);
        assert_eq!(config.sf_max, SF_MAX);
        assert_eq!(config.snr_limit_by_sf.len(), 6);
    }

    #[test]
    fn test_narrowed_bounds_need_only_reachable_limits() {
        let config = TpcConfig {
            sf_min: 9,
            sf_max: 10,
            snr_limit_by_sf: [(9, -13.0), (10, -16.0)].into_iter().collect(),
            ..Default::default()
        };
        let model = config.validate().unwrap();
        assert_eq!(model.snr_limits().get(SpreadingFactor::SF9), -13.0);
        assert_eq!(model.snr_limits().get(SpreadingFactor::SF10), -16.0);
        // Unreachable slots keep the datasheet floor
        assert_eq!(model.snr_limits().get(SpreadingFactor::SF7), -7.5);
    }

    #[test]
    fn test_to_config_roundtrips_through_validate() {
        let model = MarginModel::default();
        assert_eq!(model.to_config().validate().unwrap(), model);
    }

    #[test]
    fn test_contains() {
        let model = MarginModel::default();
        assert!(model.contains(&LinkParameters::new(SpreadingFactor::SF7, 2.0)));
        assert!(model.contains(&LinkParameters::new(SpreadingFactor::SF12, 14.0)));
        assert!(!model.contains(&LinkParameters::new(SpreadingFactor::SF9, 14.5)));
        assert!(!model.contains(&LinkParameters::new(SpreadingFactor::SF9, 1.0)));
    }
}
