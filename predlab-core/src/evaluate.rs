//! Accuracy evaluator — pure function from dataset to report.
//!
//! No validation, no mutation, no failure path: an empty or degenerate
//! dataset degrades to zero accuracy rather than erroring. Rows with NaN
//! predicted/actual values (lenient JSON ingestion) score as incorrect.

use std::cmp::Ordering;

use crate::domain::{Dataset, EvaluationReport, Stock, StockMetric, TimelinePoint};

/// Score every stock, rank by accuracy, and aggregate.
///
/// The ranking sort is stable: stocks with equal accuracy keep the order
/// they appeared in the dataset.
pub fn evaluate(dataset: &Dataset) -> EvaluationReport {
    let mut stock_metrics: Vec<StockMetric> = dataset.stocks.iter().map(score_stock).collect();

    // Accuracies are always finite (0 when total is 0), so Equal is only a
    // formality for partial_cmp here.
    stock_metrics.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(Ordering::Equal)
    });

    let aggregate_correct: usize = stock_metrics.iter().map(|m| m.correct).sum();
    let aggregate_total: usize = stock_metrics.iter().map(|m| m.total).sum();
    let dataset_accuracy = if aggregate_total > 0 {
        aggregate_correct as f64 / aggregate_total as f64
    } else {
        0.0
    };

    EvaluationReport {
        top_stock: stock_metrics.first().cloned(),
        stock_metrics,
        dataset_accuracy,
        metadata: dataset.metadata.clone(),
    }
}

fn score_stock(stock: &Stock) -> StockMetric {
    let total = stock.predictions.len();
    let correct = stock.predictions.iter().filter(|r| r.is_correct()).count();
    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };

    let timeline = stock
        .predictions
        .iter()
        .map(|row| TimelinePoint {
            date: row.date.clone(),
            predicted: row.predicted,
            actual: row.actual,
            correct: row.is_correct(),
        })
        .collect();

    StockMetric {
        symbol: stock.symbol.clone(),
        company: stock.company.clone(),
        accuracy,
        total,
        correct,
        timeline,
    }
}
