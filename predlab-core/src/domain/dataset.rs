//! Canonical dataset shape — both ingestion paths converge here.

use serde::{Deserialize, Serialize};

/// A single labeled prediction for one stock on one date.
///
/// `predicted` and `actual` are exactly 0.0 (down) or 1.0 (up) when produced
/// by the CSV parser. The lenient JSON path may yield NaN for unparseable
/// values; NaN never compares equal, so such rows score as incorrect rather
/// than crashing the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// ISO-like date string; datasets sort predictions lexically by this.
    pub date: String,
    pub predicted: f64,
    pub actual: f64,
}

impl PredictionRow {
    /// Strict equality — NaN on either side means incorrect.
    pub fn is_correct(&self) -> bool {
        self.predicted == self.actual
    }
}

/// One stock's prediction series within a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    /// Display name; defaults to the symbol when the source carries none.
    pub company: String,
    /// Sorted ascending by date after ingestion.
    pub predictions: Vec<PredictionRow>,
}

/// Dataset-level metadata accumulated during ingestion.
///
/// Serialized camelCase to match the JSON wire shape (`featureWindow`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetMetadata {
    /// Human-readable dataset label. Empty only for degenerate normalized
    /// payloads; the CSV parser always sets it.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lookback window (in steps) the predictions were engineered with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_window: Option<f64>,
    /// Engineered feature names; insertion order is not significant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Canonical dataset: metadata plus one entry per unique symbol.
///
/// A dataset with zero stocks is a construction error at the registration
/// boundary, not an evaluator concern — the evaluator degrades to zero
/// accuracy rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub stocks: Vec<Stock>,
}

impl Dataset {
    /// True when the dataset carries no stocks at all.
    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Total prediction rows across all stocks.
    pub fn row_count(&self) -> usize {
        self.stocks.iter().map(|s| s.predictions.len()).sum()
    }
}
