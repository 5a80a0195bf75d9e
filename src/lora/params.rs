//! LoRa link parameters: spreading factor and transmit power operating points.

use crate::error::TpcError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spreading Factor (SF) for LoRa
///
/// Only SF7..SF12 are represented, which is the domain of the SNR limit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SpreadingFactor {
    SF7 = 7,
    SF8 = 8,
    SF9 = 9,
    SF10 = 10,
    SF11 = 11,
    SF12 = 12,
}

impl SpreadingFactor {
    /// All spreading factors in ascending order
    pub const ALL: [SpreadingFactor; 6] = [
        SpreadingFactor::SF7,
        SpreadingFactor::SF8,
        SpreadingFactor::SF9,
        SpreadingFactor::SF10,
        SpreadingFactor::SF11,
        SpreadingFactor::SF12,
    ];

    /// Numeric spreading factor (7..=12)
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Zero-based position in [`SpreadingFactor::ALL`]
    pub fn index(self) -> usize {
        (self as u8 - SpreadingFactor::SF7 as u8) as usize
    }

    /// Next higher spreading factor, `None` at SF12
    pub fn next(self) -> Option<Self> {
        Self::from_u8(self.value() + 1)
    }

    /// Next lower spreading factor, `None` at SF7
    pub fn prev(self) -> Option<Self> {
        Self::from_u8(self.value().checked_sub(1)?)
    }

    /// Parse a numeric spreading factor
    pub fn from_u8(sf: u8) -> Option<Self> {
        match sf {
            7 => Some(SpreadingFactor::SF7),
            8 => Some(SpreadingFactor::SF8),
            9 => Some(SpreadingFactor::SF9),
            10 => Some(SpreadingFactor::SF10),
            11 => Some(SpreadingFactor::SF11),
            12 => Some(SpreadingFactor::SF12),
            _ => None,
        }
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = TpcError;

    fn try_from(sf: u8) -> Result<Self, Self::Error> {
        Self::from_u8(sf).ok_or(TpcError::UnsupportedSpreadingFactor(sf))
    }
}

impl From<SpreadingFactor> for u8 {
    fn from(sf: SpreadingFactor) -> Self {
        sf.value()
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.value())
    }
}

/// Minimum SNR required for demodulation
/// From AN1200.22: SNR floor values for each SF
pub fn get_min_snr_db(sf: SpreadingFactor) -> f64 {
    match sf {
        SpreadingFactor::SF7 => -7.5,
        SpreadingFactor::SF8 => -10.0,
        SpreadingFactor::SF9 => -12.5,
        SpreadingFactor::SF10 => -15.0,
        SpreadingFactor::SF11 => -17.5,
        SpreadingFactor::SF12 => -20.0,
    }
}

/// One operating point of the radio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkParameters {
    /// Spreading factor
    pub sf: SpreadingFactor,

    /// Transmit power in dBm
    pub tp_dbm: f64,
}

impl LinkParameters {
    pub fn new(sf: SpreadingFactor, tp_dbm: f64) -> Self {
        Self { sf, tp_dbm }
    }
}

impl fmt::Display for LinkParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} dBm", self.sf, self.tp_dbm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sf_stepping() {
        assert_eq!(SpreadingFactor::SF7.next(), Some(SpreadingFactor::SF8));
        assert_eq!(SpreadingFactor::SF12.next(), None);
        assert_eq!(SpreadingFactor::SF12.prev(), Some(SpreadingFactor::SF11));
        assert_eq!(SpreadingFactor::SF7.prev(), None);
    }

    #[test]
    fn test_sf_index_matches_all() {
        for (i, sf) in SpreadingFactor::ALL.iter().enumerate() {
            assert_eq!(sf.index(), i);
        }
    }

    #[test]
    fn test_sf_try_from() {
        assert_eq!(SpreadingFactor::try_from(9).unwrap(), SpreadingFactor::SF9);
        assert!(matches!(
            SpreadingFactor::try_from(6),
            Err(TpcError::UnsupportedSpreadingFactor(6))
        ));
        assert!(SpreadingFactor::try_from(13).is_err());
    }

    #[test]
    fn test_sf_serializes_as_integer() {
        let json = serde_json::to_string(&SpreadingFactor::SF10).unwrap();
        assert_eq!(json, "10");
        let sf: SpreadingFactor = serde_json::from_str("11").unwrap();
        assert_eq!(sf, SpreadingFactor::SF11);
        assert!(serde_json::from_str::<SpreadingFactor>("5").is_err());
    }

    #[test]
    fn test_min_snr_decreases_with_sf() {
        for pair in SpreadingFactor::ALL.windows(2) {
            assert!(get_min_snr_db(pair[1]) < get_min_snr_db(pair[0]));
        }
    }
}
