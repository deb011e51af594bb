//! JSON Lines loader: one JSON value per line.

use super::{DataLoader, LoaderOptions, into_raw};
use crate::error::LoadError;
use async_trait::async_trait;
use cleanflow_core::RawData;
use serde_json::Value;
use std::path::Path;

/// Loads a JSONL file into a JSON array. Blank lines are skipped.
#[derive(Debug, Clone, Default)]
pub struct JsonlLoader {
    pub options: LoaderOptions,
}

impl JsonlLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DataLoader for JsonlLoader {
    type Output = Value;

    fn source_type(&self) -> &'static str {
        "jsonl"
    }

    async fn load(&self, path: &Path) -> Result<RawData<Value>, LoadError> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut items = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !self.options.allows(items.len()) {
                break;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                LoadError::format(path.display().to_string(), format!("line {}: {e}", index + 1))
            })?;
            items.push(value);
        }
        into_raw(Value::Array(items), path, self.source_type(), &self.options)
    }
}
