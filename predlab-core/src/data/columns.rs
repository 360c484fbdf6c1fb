//! CSV header resolution — alias-tolerant, case-insensitive column lookup.
//!
//! The alias tables are plain data consulted through [`HeaderIndex`], so
//! accepting a new header spelling is a one-line table edit.

use std::collections::HashMap;

/// Accepted spellings for each required column, in priority order.
pub const SYMBOL_ALIASES: &[&str] = &["symbol"];
pub const DATE_ALIASES: &[&str] = &["date"];
pub const PREDICTED_ALIASES: &[&str] = &["predicted", "prediction"];
pub const ACTUAL_ALIASES: &[&str] = &["actual", "target"];

/// Accepted spellings for the optional metadata columns.
pub const COMPANY_ALIASES: &[&str] = &["company", "name"];
pub const LABEL_ALIASES: &[&str] = &["dataset_label", "label"];
pub const DESCRIPTION_ALIASES: &[&str] = &["dataset_description", "description", "notes"];
pub const FEATURE_WINDOW_ALIASES: &[&str] = &["feature_window", "featurewindow"];
pub const FEATURES_ALIASES: &[&str] = &["features", "feature_names", "featurenames"];

/// Case-insensitive header-name → column-index lookup.
///
/// Duplicate header names resolve to the rightmost occurrence.
#[derive(Debug)]
pub struct HeaderIndex {
    lookup: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &[String]) -> Self {
        let lookup = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.to_lowercase(), index))
            .collect();
        Self { lookup }
    }

    /// First alias present in the header wins.
    pub fn resolve(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.lookup.get(&alias.to_lowercase()).copied())
    }
}

/// Resolved column positions for one CSV header row.
#[derive(Debug)]
pub struct ColumnMap {
    pub symbol: usize,
    pub date: usize,
    pub predicted: usize,
    pub actual: usize,
    pub company: Option<usize>,
    pub label: Option<usize>,
    pub description: Option<usize>,
    pub feature_window: Option<usize>,
    pub features: Option<usize>,
}

impl ColumnMap {
    /// Resolve all columns against a header row.
    ///
    /// Returns `None` when any required column is missing — the caller
    /// reports all four canonical names in a single error.
    pub fn resolve(headers: &[String]) -> Option<Self> {
        let index = HeaderIndex::new(headers);
        Some(Self {
            symbol: index.resolve(SYMBOL_ALIASES)?,
            date: index.resolve(DATE_ALIASES)?,
            predicted: index.resolve(PREDICTED_ALIASES)?,
            actual: index.resolve(ACTUAL_ALIASES)?,
            company: index.resolve(COMPANY_ALIASES),
            label: index.resolve(LABEL_ALIASES),
            description: index.resolve(DESCRIPTION_ALIASES),
            feature_window: index.resolve(FEATURE_WINDOW_ALIASES),
            features: index.resolve(FEATURES_ALIASES),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let map = ColumnMap::resolve(&headers(&["Symbol", "DATE", "Predicted", "Actual"])).unwrap();
        assert_eq!(map.symbol, 0);
        assert_eq!(map.date, 1);
        assert_eq!(map.predicted, 2);
        assert_eq!(map.actual, 3);
    }

    #[test]
    fn aliases_resolve_in_priority_order() {
        let map =
            ColumnMap::resolve(&headers(&["symbol", "date", "prediction", "target"])).unwrap();
        assert_eq!(map.predicted, 2);
        assert_eq!(map.actual, 3);
    }

    #[test]
    fn earlier_alias_beats_later_alias() {
        let map = ColumnMap::resolve(&headers(&[
            "symbol",
            "date",
            "target",
            "predicted",
            "actual",
        ]))
        .unwrap();
        // "actual" outranks "target" regardless of column position.
        assert_eq!(map.actual, 4);
    }

    #[test]
    fn missing_required_column_fails() {
        assert!(ColumnMap::resolve(&headers(&["symbol", "date", "predicted"])).is_none());
    }

    #[test]
    fn optional_columns_resolve_when_present() {
        let map = ColumnMap::resolve(&headers(&[
            "symbol",
            "date",
            "predicted",
            "actual",
            "Name",
            "notes",
            "featureWindow",
            "feature_names",
        ]))
        .unwrap();
        assert_eq!(map.company, Some(4));
        assert_eq!(map.description, Some(5));
        assert_eq!(map.feature_window, Some(6));
        assert_eq!(map.features, Some(7));
        assert_eq!(map.label, None);
    }
}
