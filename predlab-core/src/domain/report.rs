//! Evaluation report types — the evaluator's output shape.

use serde::{Deserialize, Serialize};

use super::dataset::DatasetMetadata;

/// One prediction row annotated with its outcome, in original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: String,
    pub predicted: f64,
    pub actual: f64,
    pub correct: bool,
}

/// Accuracy metrics for a single stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetric {
    pub symbol: String,
    pub company: String,
    /// correct / total, or 0.0 when the stock has no predictions.
    pub accuracy: f64,
    pub total: usize,
    pub correct: usize,
    pub timeline: Vec<TimelinePoint>,
}

/// Full evaluation output for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    /// Sorted descending by accuracy; ties keep input order (stable sort).
    pub stock_metrics: Vec<StockMetric>,
    /// Aggregate correct / total across all stocks, 0.0 when there are no rows.
    pub dataset_accuracy: f64,
    /// Head of the sorted metrics, absent only for a stockless dataset.
    pub top_stock: Option<StockMetric>,
    pub metadata: DatasetMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_camel_case() {
        let report = EvaluationReport {
            stock_metrics: vec![],
            dataset_accuracy: 0.5,
            top_stock: None,
            metadata: DatasetMetadata::default(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("datasetAccuracy").is_some());
        assert!(json.get("stockMetrics").is_some());
        assert!(json.get("dataset_accuracy").is_none());
    }
}
