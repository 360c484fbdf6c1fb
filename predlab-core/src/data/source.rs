//! Dataset source trait and implementations.
//!
//! The `DatasetSource` trait abstracts over where dataset JSON comes from
//! (an HTTP tree, a local directory) so the catalogue can swap
//! implementations and tests can use an in-memory mock.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Errors a source can report. Failures carry an HTTP-style status where one
/// exists so the catalogue can surface "HTTP <status>" messages uniformly.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid JSON: {0}")]
    Decode(String),
}

/// A keyed JSON fetcher. Keys are relative path-like strings such as
/// `data/index.json` or `data/<id>.json`.
pub trait DatasetSource {
    /// Fetch and parse the JSON document at `path`.
    fn fetch_json(&self, path: &str) -> Result<Value, SourceError>;
}

impl DatasetSource for Box<dyn DatasetSource> {
    fn fetch_json(&self, path: &str) -> Result<Value, SourceError> {
        (**self).fetch_json(path)
    }
}

/// HTTP-backed source: joins keys onto a base URL.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl DatasetSource for HttpSource {
    fn fetch_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .json()
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

/// Directory-backed source: resolves keys against a local data tree.
///
/// A missing file reports status 404 so catalogue error text stays uniform
/// across sources.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DatasetSource for FileSource {
    fn fetch_json(&self, path: &str) -> Result<Value, SourceError> {
        let full_path = self.root.join(path);
        let text = std::fs::read_to_string(&full_path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SourceError::Status(404)
            } else {
                SourceError::Network(format!("{}: {e}", full_path.display()))
            }
        })?;

        serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/index.json"), r#"{"datasets": []}"#).unwrap();

        let source = FileSource::new(dir.path());
        let value = source.fetch_json("data/index.json").unwrap();
        assert!(value["datasets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn file_source_reports_missing_files_as_404() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path());
        assert!(matches!(
            source.fetch_json("data/absent.json"),
            Err(SourceError::Status(404))
        ));
    }

    #[test]
    fn file_source_reports_bad_json_as_decode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let source = FileSource::new(dir.path());
        assert!(matches!(
            source.fetch_json("broken.json"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn status_error_displays_http_style() {
        assert_eq!(SourceError::Status(503).to_string(), "HTTP 503");
    }
}
