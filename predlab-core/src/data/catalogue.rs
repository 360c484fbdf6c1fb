//! Dataset catalogue — built-in index plus session-registered uploads.
//!
//! The catalogue owns a [`DatasetSource`], a lazily-fetched cache of the
//! built-in index, and the custom datasets registered this session. All
//! state is in memory; construct a fresh catalogue per process (or per test)
//! and it starts empty.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::Dataset;

use super::normalize::normalize_payload;
use super::source::{DatasetSource, SourceError};

/// Key of the built-in catalogue index.
const INDEX_PATH: &str = "data/index.json";

fn dataset_path(id: &str) -> String {
    format!("data/{id}.json")
}

/// One selectable dataset in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub feature_window: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Structured errors for catalogue operations.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("a dataset id must be provided")]
    MissingId,

    #[error("unable to load dataset catalogue (HTTP {status})")]
    IndexUnavailable { status: u16 },

    #[error("unable to load dataset \"{id}\" (HTTP {status})")]
    DatasetUnavailable { id: String, status: u16 },

    #[error("a dataset must include at least one stock entry")]
    EmptyDataset,

    #[error(transparent)]
    Source(#[from] SourceError),
}

struct CustomDataset {
    entry: CatalogueEntry,
    dataset: Dataset,
}

/// Dataset catalogue and session registry.
pub struct Catalogue {
    source: Box<dyn DatasetSource>,
    /// Built-in entries, fetched once per catalogue lifetime.
    builtin: Option<Vec<CatalogueEntry>>,
    /// Session uploads in registration order.
    custom: Vec<CustomDataset>,
}

impl Catalogue {
    pub fn new(source: impl DatasetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            builtin: None,
            custom: Vec::new(),
        }
    }

    /// All selectable datasets: built-ins first, then session uploads in
    /// registration order. Returns clones — callers cannot mutate catalogue
    /// state through the result.
    ///
    /// The built-in index is fetched on first call and cached. An index
    /// whose `datasets` field is missing or not an array yields an empty
    /// built-in list; individual malformed entries are skipped.
    pub fn list_datasets(&mut self) -> Result<Vec<CatalogueEntry>, CatalogueError> {
        if self.builtin.is_none() {
            let index = self.source.fetch_json(INDEX_PATH).map_err(|e| match e {
                SourceError::Status(status) => CatalogueError::IndexUnavailable { status },
                other => CatalogueError::Source(other),
            })?;

            let entries = index
                .get("datasets")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            self.builtin = Some(entries);
        }

        let mut all = self.builtin.clone().unwrap_or_default();
        all.extend(self.custom.iter().map(|c| c.entry.clone()));
        Ok(all)
    }

    /// Load a dataset by id: session uploads are served from memory,
    /// anything else is fetched as `data/<id>.json` and normalized.
    pub fn load_dataset(&self, id: &str) -> Result<Dataset, CatalogueError> {
        if id.is_empty() {
            return Err(CatalogueError::MissingId);
        }

        if let Some(custom) = self.custom.iter().find(|c| c.entry.id == id) {
            return Ok(custom.dataset.clone());
        }

        let payload = self
            .source
            .fetch_json(&dataset_path(id))
            .map_err(|e| match e {
                SourceError::Status(status) => CatalogueError::DatasetUnavailable {
                    id: id.into(),
                    status,
                },
                other => CatalogueError::Source(other),
            })?;

        Ok(normalize_payload(&payload))
    }

    /// Normalize and register an uploaded payload for this session.
    ///
    /// Entry name and description fall back to `name` and a fixed default
    /// when the payload metadata carries none. Returns a clone of the stored
    /// entry.
    pub fn register_custom_dataset(
        &mut self,
        name: &str,
        payload: &Value,
    ) -> Result<CatalogueEntry, CatalogueError> {
        let dataset = normalize_payload(payload);
        if dataset.is_empty() {
            return Err(CatalogueError::EmptyDataset);
        }

        let metadata = &dataset.metadata;
        let entry = CatalogueEntry {
            id: self.generate_id(),
            name: if !metadata.label.is_empty() {
                metadata.label.clone()
            } else if !name.is_empty() {
                name.into()
            } else {
                "Custom dataset".into()
            },
            description: Some(
                metadata
                    .description
                    .clone()
                    .unwrap_or_else(|| "Uploaded custom dataset".into()),
            ),
            feature_window: metadata.feature_window,
            features: metadata.features.clone(),
        };

        self.custom.push(CustomDataset {
            entry: entry.clone(),
            dataset,
        });
        Ok(entry)
    }

    /// Time-based id with a random suffix. Collisions within one session are
    /// all that matter, so regenerate on the (improbable) duplicate.
    fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id = format!(
                "custom-{}-{:06x}",
                chrono::Utc::now().timestamp_millis(),
                rng.gen_range(0u32..0x0100_0000)
            );
            if !self.custom.iter().any(|c| c.entry.id == id) {
                return id;
            }
        }
    }
}
