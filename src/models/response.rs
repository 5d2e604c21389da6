//! Response shaping
//!
//! Maps per-row predictions to the public JSON contract. The response shape
//! mirrors the request shape: named requests get a flat single-result body,
//! batch requests get one result object per input row, in input order.

use serde::Serialize;

use crate::detector::RowPrediction;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Single(SinglePrediction),
    Batch(BatchPrediction),
}

/// `{"is_anomaly": <bool>, "status": "success"[, "score": <float>]}`
#[derive(Debug, Serialize)]
pub struct SinglePrediction {
    pub is_anomaly: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BatchPrediction {
    pub status: &'static str,
    pub results: Vec<RowResult>,
}

#[derive(Debug, Serialize)]
pub struct RowResult {
    pub prediction: &'static str,
    pub is_anomaly: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
}

impl PredictResponse {
    pub fn single(row: &RowPrediction, report_scores: bool) -> Self {
        PredictResponse::Single(SinglePrediction {
            is_anomaly: row.label.is_anomaly(),
            status: "success",
            score: report_scores.then_some(row.score),
        })
    }

    pub fn batch(rows: &[RowPrediction], report_scores: bool) -> Self {
        PredictResponse::Batch(BatchPrediction {
            status: "success",
            results: rows
                .iter()
                .map(|row| RowResult {
                    prediction: if row.label.is_anomaly() { "anomaly" } else { "normal" },
                    is_anomaly: row.label.is_anomaly() as u8,
                    anomaly_score: report_scores.then_some(row.score),
                })
                .collect(),
        })
    }
}
