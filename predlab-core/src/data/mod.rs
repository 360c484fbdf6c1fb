//! Dataset ingestion and the catalogue

pub mod catalogue;
pub mod columns;
pub mod csv;
pub mod normalize;
pub mod source;

pub use catalogue::{Catalogue, CatalogueEntry, CatalogueError};
pub use columns::{ColumnMap, HeaderIndex};
pub use csv::{parse_csv_dataset, ParseError};
pub use normalize::normalize_payload;
pub use source::{DatasetSource, FileSource, HttpSource, SourceError};
