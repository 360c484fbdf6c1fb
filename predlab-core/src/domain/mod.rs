//! Domain types for PredLab

pub mod dataset;
pub mod report;

pub use dataset::{Dataset, DatasetMetadata, PredictionRow, Stock};
pub use report::{EvaluationReport, StockMetric, TimelinePoint};

/// Symbol type alias
pub type Symbol = String;
