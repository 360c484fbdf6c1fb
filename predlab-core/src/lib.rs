//! PredLab Core — canonical dataset model, ingestion, catalogue, evaluator.
//!
//! This crate contains the data pipeline behind the prediction dashboard:
//! - Canonical dataset types (stocks, prediction rows, metadata, reports)
//! - CSV parser with quote-aware tokenization and alias-tolerant headers
//! - Lenient JSON payload normalizer
//! - Dataset catalogue: built-in index plus session-registered uploads
//! - Accuracy evaluator producing per-stock metrics and a ranking
//!
//! Everything converges on [`domain::Dataset`]: both ingestion paths produce
//! it, the catalogue stores it, and [`evaluate::evaluate`] consumes it.

pub mod data;
pub mod domain;
pub mod evaluate;
