//! JSON file loader.

use super::{DataLoader, LoaderOptions, into_raw};
use crate::error::LoadError;
use async_trait::async_trait;
use cleanflow_core::RawData;
use serde_json::Value;
use std::path::Path;

/// Loads a JSON array of rows, or a single JSON object as one record.
#[derive(Debug, Clone, Default)]
pub struct JsonLoader {
    pub options: LoaderOptions,
}

impl JsonLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DataLoader for JsonLoader {
    type Output = Value;

    fn source_type(&self) -> &'static str {
        "json"
    }

    async fn load(&self, path: &Path) -> Result<RawData<Value>, LoadError> {
        let content = tokio::fs::read_to_string(path).await?;
        let value: Value = serde_json::from_str(&content)?;

        let data = match value {
            Value::Array(mut items) => {
                if let Some(max) = self.options.limit {
                    items.truncate(max);
                }
                Value::Array(items)
            }
            Value::Object(_) => value,
            _ => {
                return Err(LoadError::format(
                    path.display().to_string(),
                    "JSON must be an array or object",
                ));
            }
        };
        into_raw(data, path, self.source_type(), &self.options)
    }
}
