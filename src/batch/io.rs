//! CSV input and output for batch decisions

use crate::error::TpcError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// One row of the predictions file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Measured SNR, when the file carries it
    #[serde(default)]
    pub snr_true: Option<f64>,

    /// Predicted SNR in dB
    pub snr_pred: f64,
}

impl PredictionRecord {
    pub fn new(snr_pred: f64) -> Self {
        Self {
            snr_true: None,
            snr_pred,
        }
    }
}

/// One row of the decisions file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub sf_new: u8,
    pub tp_new: f64,
    pub me: f64,
    pub energy_norm: f64,
}

/// Column names of the decisions file, in field order of [`DecisionRecord`]
pub const DECISION_HEADER: [&str; 4] = ["sf_new", "tp_new", "me", "energy_norm"];

/// Read predictions from any CSV source with a header row
///
/// Extra columns are ignored. Rows are numbered from 1 in errors.
pub fn read_predictions_from<R: Read>(reader: R) -> Result<Vec<PredictionRecord>, TpcError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in csv_reader.deserialize::<PredictionRecord>().enumerate() {
        let record = row?;
        if !record.snr_pred.is_finite() {
            return Err(TpcError::InvalidPrediction {
                row: i + 1,
                value: record.snr_pred,
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Read predictions from a CSV file
pub fn read_predictions(path: impl AsRef<Path>) -> Result<Vec<PredictionRecord>, TpcError> {
    let file = std::fs::File::open(path)?;
    read_predictions_from(file)
}

/// Write decisions with a `sf_new,tp_new,me,energy_norm` header
///
/// The header is written even when `decisions` is empty.
pub fn write_decisions_to<W: Write>(writer: W, decisions: &[DecisionRecord]) -> Result<(), TpcError> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(DECISION_HEADER)?;
    for decision in decisions {
        csv_writer.serialize(decision)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write decisions to a CSV file, creating parent directories as needed
pub fn write_decisions(path: impl AsRef<Path>, decisions: &[DecisionRecord]) -> Result<(), TpcError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_decisions_to(file, decisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_with_and_without_truth() {
        let csv = "snr_true,snr_pred\n-4.0,-5.0\n,3.25\n";
        let records = read_predictions_from(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].snr_true, Some(-4.0));
        assert_eq!(records[0].snr_pred, -5.0);
        assert_eq!(records[1].snr_true, None);
        assert_eq!(records[1].snr_pred, 3.25);
    }

    #[test]
    fn test_read_prediction_only_column() {
        let records = read_predictions_from("snr_pred\n1.5\n-2\n".as_bytes()).unwrap();
        assert_eq!(records, vec![PredictionRecord::new(1.5), PredictionRecord::new(-2.0)]);
    }

    #[test]
    fn test_read_rejects_non_finite() {
        let err = read_predictions_from("snr_pred\n1.0\nNaN\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TpcError::InvalidPrediction { row: 2, .. }));
    }

    #[test]
    fn test_read_rejects_missing_column() {
        let err = read_predictions_from("snr\n1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TpcError::Csv(_)));
    }

    #[test]
    fn test_write_header_and_rows() {
        let mut out = Vec::new();
        let rows = [DecisionRecord {
            sf_new: 10,
            tp_new: 14.0,
            me: 0.0,
            energy_norm: 0.25,
        }];
        write_decisions_to(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("sf_new,tp_new,me,energy_norm"));
        assert_eq!(lines.next(), Some("10,14.0,0.0,0.25"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_header_without_rows() {
        let mut out = Vec::new();
        write_decisions_to(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "sf_new,tp_new,me,energy_norm\n");
    }

    #[test]
    fn test_read_header_only_is_empty() {
        let records = read_predictions_from("snr_pred\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }
}
