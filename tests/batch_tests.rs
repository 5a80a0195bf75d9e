//! End-to-end batch runs through files

use lora_tpc::batch::read_predictions;
use lora_tpc::{run_batch, DecisionRecord, TpcController, TpcError};
use std::fs;

fn write_input(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("snr_predictions.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_batch_writes_decisions_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "snr_true,snr_pred\n-29.0,-30.0\n-4.5,-5.0\n6.0,5.0\n");
    let output = dir.path().join("predictions").join("tpc_decisions.csv");

    let controller = TpcController::new();
    let report = run_batch(&controller, &input, &output).unwrap();
    assert_eq!(report.decisions.len(), 3);
    assert_eq!(report.unsafe_count(), 1);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["sf_new", "tp_new", "me", "energy_norm"]
    );
    let rows: Vec<DecisionRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows, report.decisions);

    assert_eq!((rows[0].sf_new, rows[0].tp_new, rows[0].me), (12, 14.0, -20.0));
    assert_eq!(rows[0].energy_norm, 1.0);
    assert_eq!((rows[1].sf_new, rows[1].tp_new, rows[1].me), (10, 14.0, 0.0));
    assert_eq!(rows[1].energy_norm, 0.25);
    assert_eq!((rows[2].sf_new, rows[2].tp_new, rows[2].me), (7, 12.0, 0.5));
}

#[test]
fn test_batch_summary_against_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "snr_pred\n-30.0\n-5.0\n5.0\n-5.0\n");
    let output = dir.path().join("out.csv");

    let controller = TpcController::new();
    let report = run_batch(&controller, &input, &output).unwrap();
    let summary = report.summarize(&controller).unwrap();

    assert_eq!(summary.samples, 4);
    assert_eq!(summary.sf_counts[&12].old, 4);
    assert_eq!(summary.sf_counts[&12].new, 1);
    assert_eq!(summary.sf_counts[&10].new, 2);
    assert_eq!(summary.sf_counts[&7].new, 1);
    // Baseline margins: -20, 5, 15, 5
    assert_eq!(summary.pct_link_safe_old, 75.0);
    assert_eq!(summary.pct_link_safe_new, 75.0);
    assert_eq!(summary.pct_energy_below_1, 75.0);
    assert!(summary.mean_energy_reduction_pct > 0.0);

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"pct_link_safe_new\":75.0"));
}

#[test]
fn test_batch_rejects_non_finite_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "snr_pred\n1.0\n2.0\ninf\n");
    let output = dir.path().join("out.csv");

    let err = run_batch(&TpcController::new(), &input, &output).unwrap_err();
    assert!(matches!(err, TpcError::InvalidPrediction { row: 3, .. }));
    assert!(!output.exists());
}

#[test]
fn test_read_predictions_ignores_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "num,snr_pred,rssi\n1,-3.5,-101\n2,0.0,-99\n");
    let records = read_predictions(&input).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].snr_pred, -3.5);
    assert_eq!(records[0].snr_true, None);
}

#[test]
fn test_batch_without_rows_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "snr_pred\n");
    let output = dir.path().join("out.csv");

    let controller = TpcController::new();
    let report = run_batch(&controller, &input, &output).unwrap();
    assert!(report.decisions.is_empty());
    assert_eq!(report.unsafe_count(), 0);

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text, "sf_new,tp_new,me,energy_norm\n");
    assert!(matches!(report.summarize(&controller), Err(TpcError::EmptyBatch)));
}
