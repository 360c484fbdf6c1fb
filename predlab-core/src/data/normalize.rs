//! Lenient JSON payload normalizer.
//!
//! `normalize_payload` is the single, total conversion boundary between
//! loosely-shaped JSON uploads and the canonical [`Dataset`]: it never fails,
//! it only degrades. Missing or mis-typed pieces collapse to empty defaults,
//! and unparseable predicted/actual values become NaN, which the evaluator
//! scores as incorrect. Strict validation happens at the registration
//! boundary (zero-stock check) and in the CSV path, not here.

use serde_json::Value;

use crate::domain::{Dataset, DatasetMetadata, PredictionRow, Stock};

/// Convert an arbitrary JSON payload into a canonical dataset.
///
/// Alias folding happens here, once: `description` falls back to `notes`,
/// `features` to `featureNames`. Downstream code only sees the canonical
/// shape.
pub fn normalize_payload(payload: &Value) -> Dataset {
    let metadata = normalize_metadata(payload.get("metadata"));

    let stocks = payload
        .get("stocks")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(normalize_stock).collect())
        .unwrap_or_default();

    Dataset { metadata, stocks }
}

fn normalize_metadata(metadata: Option<&Value>) -> DatasetMetadata {
    let Some(metadata) = metadata.filter(|m| m.is_object()) else {
        return DatasetMetadata::default();
    };

    let description = non_empty_string(metadata.get("description"))
        .or_else(|| non_empty_string(metadata.get("notes")));

    let feature_window = metadata
        .get("featureWindow")
        .map(coerce_number)
        .filter(|w| w.is_finite() && *w > 0.0);

    let features = metadata
        .get("features")
        .and_then(Value::as_array)
        .or_else(|| metadata.get("featureNames").and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    DatasetMetadata {
        label: non_empty_string(metadata.get("label")).unwrap_or_default(),
        description,
        feature_window,
        features,
    }
}

fn normalize_stock(stock: &Value) -> Stock {
    let symbol = string_or_empty(stock.get("symbol"));
    let company = non_empty_string(stock.get("company")).unwrap_or_else(|| symbol.clone());

    let predictions = stock
        .get("predictions")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| PredictionRow {
                    date: string_or_empty(row.get("date")),
                    predicted: coerce_number(row.get("predicted").unwrap_or(&Value::Null)),
                    actual: coerce_number(row.get("actual").unwrap_or(&Value::Null)),
                })
                .collect()
        })
        .unwrap_or_default();

    Stock {
        symbol,
        company,
        predictions,
    }
}

/// Numeric coercion: numbers pass through, bools map to 0/1, numeric strings
/// parse, everything else is NaN.
fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
