//! CSV dataset parser.
//!
//! Turns a raw CSV blob into a canonical [`Dataset`]: quote-aware
//! tokenization, alias-tolerant header resolution (see [`super::columns`]),
//! binary up/down coercion, per-stock grouping, and date ordering.
//!
//! Row numbers in errors are 1-based and count the header row, matching what
//! a user sees in a spreadsheet.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{Dataset, DatasetMetadata, PredictionRow, Stock};

use super::columns::ColumnMap;

/// Structured errors for CSV ingestion.
///
/// Every failure is fatal to the ingestion attempt; there is nothing to
/// retry. Messages carry the row, field, and raw value where applicable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV file is empty")]
    EmptyFile,

    #[error("CSV does not contain any rows")]
    NoRows,

    #[error("CSV must include \"symbol\", \"date\", \"predicted\", and \"actual\" columns")]
    MissingColumns,

    #[error("missing stock symbol on row {row}")]
    MissingSymbol { row: usize },

    #[error("missing date for {symbol} on row {row}")]
    MissingDate { symbol: String, row: usize },

    #[error("missing {field} value on row {row}")]
    MissingValue { field: &'static str, row: usize },

    #[error("invalid {field} value \"{value}\" on row {row}, expected 0/1, true/false, or up/down")]
    InvalidBinary {
        field: &'static str,
        value: String,
        row: usize,
    },

    #[error("CSV did not include any stock prediction rows")]
    NoStocks,
}

/// Spellings accepted as an up (1) prediction, lowercased.
const UP_TOKENS: &[&str] = &["1", "true", "up", "rise", "yes"];

/// Spellings accepted as a down (0) prediction, lowercased.
const DOWN_TOKENS: &[&str] = &["0", "false", "down", "fall", "no"];

/// Parse CSV text into a canonical dataset.
///
/// `dataset_name` seeds the metadata label; a `dataset_label` column in the
/// data overrides it (last non-empty value wins).
pub fn parse_csv_dataset(text: &str, dataset_name: &str) -> Result<Dataset, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    // Normalize line endings, trim, drop blanks.
    let mut lines = text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let header_line = lines.next().ok_or(ParseError::NoRows)?;
    let headers = split_csv_line(header_line);
    let columns = ColumnMap::resolve(&headers).ok_or(ParseError::MissingColumns)?;

    let mut metadata = DatasetMetadata {
        label: if dataset_name.is_empty() {
            "Custom dataset".into()
        } else {
            dataset_name.into()
        },
        ..DatasetMetadata::default()
    };

    // Stocks keep first-seen order; the map only indexes into the vec.
    let mut builders: Vec<StockBuilder> = Vec::new();
    let mut index_by_symbol: HashMap<String, usize> = HashMap::new();

    for (data_index, line) in lines.enumerate() {
        // 1-based, counting the header row.
        let row = data_index + 2;
        let values = split_csv_line(line);

        let symbol = cell(&values, columns.symbol);
        if symbol.is_empty() {
            return Err(ParseError::MissingSymbol { row });
        }
        let date = cell(&values, columns.date);
        if date.is_empty() {
            return Err(ParseError::MissingDate {
                symbol: symbol.into(),
                row,
            });
        }

        let predicted = parse_binary_value(cell(&values, columns.predicted), "predicted", row)?;
        let actual = parse_binary_value(cell(&values, columns.actual), "actual", row)?;

        // Dataset-level metadata: last non-empty value wins.
        if let Some(label) = optional_cell(&values, columns.label) {
            metadata.label = label.into();
        }
        if let Some(description) = optional_cell(&values, columns.description) {
            metadata.description = Some(description.into());
        }
        if let Some(window) = optional_cell(&values, columns.feature_window) {
            // Non-numeric or non-positive windows are ignored, not fatal.
            if let Ok(parsed) = window.parse::<f64>() {
                if parsed > 0.0 {
                    metadata.feature_window = Some(parsed);
                }
            }
        }
        if let Some(features) = optional_cell(&values, columns.features) {
            metadata.features = parse_feature_list(features);
        }

        let slot = match index_by_symbol.get(symbol) {
            Some(&slot) => slot,
            None => {
                builders.push(StockBuilder::new(symbol));
                index_by_symbol.insert(symbol.into(), builders.len() - 1);
                builders.len() - 1
            }
        };
        let builder = &mut builders[slot];
        if let Some(company) = optional_cell(&values, columns.company) {
            // Upgrade from the symbol default at most once.
            if builder.company.is_none() {
                builder.company = Some(company.into());
            }
        }
        builder.predictions.push(PredictionRow {
            date: date.into(),
            predicted,
            actual,
        });
    }

    if builders.is_empty() {
        return Err(ParseError::NoStocks);
    }

    let stocks = builders.into_iter().map(StockBuilder::finish).collect();
    Ok(Dataset { metadata, stocks })
}

/// Per-symbol accumulator while rows stream in.
struct StockBuilder {
    symbol: String,
    company: Option<String>,
    predictions: Vec<PredictionRow>,
}

impl StockBuilder {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.into(),
            company: None,
            predictions: Vec::new(),
        }
    }

    fn finish(mut self) -> Stock {
        // Lexical date order; ISO-like dates make this chronological.
        self.predictions.sort_by(|a, b| a.date.cmp(&b.date));
        Stock {
            company: self.company.unwrap_or_else(|| self.symbol.clone()),
            symbol: self.symbol,
            predictions: self.predictions,
        }
    }
}

/// Quote-aware comma splitter.
///
/// A double quote toggles quoted mode; a doubled quote inside quoted text is
/// an escaped literal quote; commas inside quotes are not separators. Every
/// extracted field is trimmed.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }

    cells.push(current.trim().to_string());
    cells
}

/// Coerce a raw cell into exactly 0.0 or 1.0.
fn parse_binary_value(raw: &str, field: &'static str, row: usize) -> Result<f64, ParseError> {
    let normalized = raw.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(ParseError::MissingValue { field, row });
    }
    if UP_TOKENS.contains(&normalized.as_str()) {
        return Ok(1.0);
    }
    if DOWN_TOKENS.contains(&normalized.as_str()) {
        return Ok(0.0);
    }

    // Numeric spellings like "1.0" or "0.00" are accepted; everything else
    // (including numbers outside {0, 1}) is rejected.
    if let Ok(numeric) = normalized.parse::<f64>() {
        if numeric == 1.0 {
            return Ok(1.0);
        }
        if numeric == 0.0 {
            return Ok(0.0);
        }
    }

    Err(ParseError::InvalidBinary {
        field,
        value: raw.into(),
        row,
    })
}

/// Split a feature-list cell on `|`, `;`, or `,`; empty pieces are dropped.
fn parse_feature_list(raw: &str) -> Vec<String> {
    raw.split(['|', ';', ','])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cell at `index`, already trimmed by the splitter; short rows read as "".
fn cell(values: &[String], index: usize) -> &str {
    values.get(index).map(String::as_str).unwrap_or("")
}

/// Cell at an optional column, `None` when the column is absent or empty.
fn optional_cell(values: &[String], index: Option<usize>) -> Option<&str> {
    let value = cell(values, index?);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_CSV: &str = "\
symbol,date,predicted,actual
AAPL,2024-01-03,up,down
AAPL,2024-01-02,1,1
MSFT,2024-01-02,down,down
";

    #[test]
    fn parses_and_sorts_predictions_by_date() {
        let dataset = parse_csv_dataset(BASIC_CSV, "Basic").unwrap();
        assert_eq!(dataset.metadata.label, "Basic");
        assert_eq!(dataset.stocks.len(), 2);

        let aapl = &dataset.stocks[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert_eq!(aapl.company, "AAPL");
        assert_eq!(aapl.predictions[0].date, "2024-01-02");
        assert_eq!(aapl.predictions[1].date, "2024-01-03");
        assert_eq!(aapl.predictions[1].predicted, 1.0);
        assert_eq!(aapl.predictions[1].actual, 0.0);
    }

    #[test]
    fn stocks_keep_first_seen_order() {
        let dataset = parse_csv_dataset(BASIC_CSV, "Basic").unwrap();
        let symbols: Vec<&str> = dataset.stocks.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT"]);
    }

    #[test]
    fn quoted_company_with_comma_and_escaped_quote() {
        let csv = "symbol,company,date,predicted,actual\n\
                   ACME,\"Acme, \"\"Inc.\"\"\",2024-01-01,up,down\n";
        let dataset = parse_csv_dataset(csv, "Quoted").unwrap();
        assert_eq!(dataset.stocks[0].company, "Acme, \"Inc.\"");
    }

    #[test]
    fn company_upgrades_from_symbol_default_once() {
        let csv = "symbol,company,date,predicted,actual\n\
                   ACME,,2024-01-01,1,1\n\
                   ACME,Acme Industries,2024-01-02,0,0\n\
                   ACME,Acme Renamed,2024-01-03,1,0\n";
        let dataset = parse_csv_dataset(csv, "Companies").unwrap();
        assert_eq!(dataset.stocks[0].company, "Acme Industries");
    }

    #[test]
    fn metadata_columns_last_non_empty_wins() {
        let csv = "symbol,date,predicted,actual,dataset_label,notes,feature_window,features\n\
                   A,2024-01-01,1,1,First,early notes,14,rsi|macd\n\
                   A,2024-01-02,0,0,Second,,30,\"close, volume\"\n";
        let dataset = parse_csv_dataset(csv, "fallback").unwrap();
        assert_eq!(dataset.metadata.label, "Second");
        assert_eq!(dataset.metadata.description.as_deref(), Some("early notes"));
        assert_eq!(dataset.metadata.feature_window, Some(30.0));
        assert_eq!(dataset.metadata.features, ["close", "volume"]);
    }

    #[test]
    fn invalid_feature_window_is_ignored() {
        let csv = "symbol,date,predicted,actual,feature_window\n\
                   A,2024-01-01,1,1,soon\n\
                   A,2024-01-02,1,1,-5\n";
        let dataset = parse_csv_dataset(csv, "w").unwrap();
        assert_eq!(dataset.metadata.feature_window, None);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_csv_dataset("   \n\n  ", "x"),
            Err(ParseError::EmptyFile)
        ));
    }

    #[test]
    fn missing_required_columns_names_all_four() {
        let err = parse_csv_dataset("symbol,date,predicted\nA,2024-01-01,1\n", "x").unwrap_err();
        let message = err.to_string();
        for name in ["symbol", "date", "predicted", "actual"] {
            assert!(message.contains(name), "message should name {name}");
        }
    }

    #[test]
    fn header_only_input_has_no_stocks() {
        assert!(matches!(
            parse_csv_dataset("symbol,date,predicted,actual\n", "x"),
            Err(ParseError::NoStocks)
        ));
    }

    #[test]
    fn row_numbers_count_the_header() {
        let csv = "symbol,date,predicted,actual\n\
                   A,2024-01-01,1,1\n\
                   ,2024-01-02,1,1\n";
        match parse_csv_dataset(csv, "x") {
            Err(ParseError::MissingSymbol { row }) => assert_eq!(row, 3),
            other => panic!("expected MissingSymbol, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_do_not_shift_row_numbers() {
        let csv = "symbol,date,predicted,actual\n\n\
                   A,2024-01-01,1,1\n\n\
                   A,,1,1\n";
        match parse_csv_dataset(csv, "x") {
            Err(ParseError::MissingDate { symbol, row }) => {
                assert_eq!(symbol, "A");
                assert_eq!(row, 3);
            }
            other => panic!("expected MissingDate, got {other:?}"),
        }
    }

    #[test]
    fn invalid_binary_error_names_field_and_value() {
        let csv = "symbol,date,predicted,actual\nA,2024-01-01,maybe,1\n";
        let err = parse_csv_dataset(csv, "x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid predicted value \"maybe\" on row 2, expected 0/1, true/false, or up/down"
        );
    }

    #[test]
    fn binary_coercion_accepts_known_tokens() {
        for token in ["1", "true", "Up", " RISE ", "yes", "1.0"] {
            assert_eq!(parse_binary_value(token, "predicted", 2).unwrap(), 1.0);
        }
        for token in ["0", "False", "down", "FALL", " no ", "0.00"] {
            assert_eq!(parse_binary_value(token, "actual", 2).unwrap(), 0.0);
        }
    }

    #[test]
    fn binary_coercion_rejects_everything_else() {
        for token in ["2", "maybe", "-1", "0.5", "truee"] {
            assert!(matches!(
                parse_binary_value(token, "predicted", 4),
                Err(ParseError::InvalidBinary { row: 4, .. })
            ));
        }
        assert!(matches!(
            parse_binary_value("  ", "actual", 5),
            Err(ParseError::MissingValue {
                field: "actual",
                row: 5
            })
        ));
    }

    #[test]
    fn split_handles_quotes_and_trims() {
        assert_eq!(
            split_csv_line("\"Acme, Inc.\", 2024-01-01 ,up,down"),
            ["Acme, Inc.", "2024-01-01", "up", "down"]
        );
        assert_eq!(split_csv_line("a,\"b\"\"c\",d"), ["a", "b\"c", "d"]);
        assert_eq!(split_csv_line(""), [""]);
    }

    #[test]
    fn feature_list_splits_on_any_separator() {
        assert_eq!(
            parse_feature_list("rsi| macd ;volume,, ,close"),
            ["rsi", "macd", "volume", "close"]
        );
        assert!(parse_feature_list("").is_empty());
    }

    #[test]
    fn crlf_and_cr_line_endings_are_normalized() {
        let csv = "symbol,date,predicted,actual\r\nA,2024-01-01,1,1\rB,2024-01-02,0,0\n";
        let dataset = parse_csv_dataset(csv, "endings").unwrap();
        assert_eq!(dataset.stocks.len(), 2);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn empty_dataset_name_defaults_label() {
        let dataset = parse_csv_dataset(BASIC_CSV, "").unwrap();
        assert_eq!(dataset.metadata.label, "Custom dataset");
    }
}
