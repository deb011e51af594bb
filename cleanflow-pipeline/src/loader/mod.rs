//! Raw data loaders.
//!
//! Loaders resolve all file I/O up front and hand the pipeline an in-memory
//! [`RawData`] carrying its provenance and, optionally, a schema.

pub mod csv;
pub mod json;
pub mod jsonl;

pub use csv::CsvLoader;
pub use json::JsonLoader;
pub use jsonl::JsonlLoader;

use crate::error::LoadError;
use async_trait::async_trait;
use cleanflow_core::{BaseDataEntity, DatasetSchema, Payload, Provenance, RawData};
use std::path::Path;

/// Loads a file into a [`RawData`] entity.
#[async_trait]
pub trait DataLoader: Send + Sync {
    type Output: Payload + 'static;

    /// Short format tag recorded in the entity metadata.
    fn source_type(&self) -> &'static str;

    async fn load(&self, path: &Path) -> Result<RawData<Self::Output>, LoadError>;
}

/// Settings shared by every loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Schema attached to loaded entities.
    pub schema: Option<DatasetSchema>,
    /// Maximum number of rows to keep.
    pub limit: Option<usize>,
}

impl LoaderOptions {
    pub fn with_schema(mut self, schema: DatasetSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn allows(&self, rows: usize) -> bool {
        self.limit.is_none_or(|max| rows < max)
    }
}

/// Wrap a loaded payload with provenance (`source` = file location) and the
/// configured schema.
pub(crate) fn into_raw<T: Payload>(
    data: T,
    path: &Path,
    source_type: &str,
    options: &LoaderOptions,
) -> Result<RawData<T>, LoadError> {
    let location = path.display().to_string();
    let entity = BaseDataEntity::builder(data)
        .maybe_schema(options.schema.clone())
        .provenance(Provenance::now(location.clone()))
        .meta("source_type", source_type)
        .build()?;
    tracing::debug!(
        source = %location,
        source_type,
        rows = ?entity.row_count(),
        "Raw data loaded"
    );
    Ok(entity.into())
}
