//! Delimited text loader producing a [`DataBatch`].

use super::{DataLoader, LoaderOptions, into_raw};
use crate::error::LoadError;
use async_trait::async_trait;
use cleanflow_core::{DataBatch, RawData};
use serde_json::{Number, Value};
use std::path::Path;

/// Loads a header record plus data records. Quoting follows RFC 4180, so a
/// quoted field may hold the delimiter or a line break. Cells are typed on
/// the way in: integers, floats and `true`/`false` are recognized, an empty
/// cell is null, anything else stays a string.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    pub delimiter: char,
    pub options: LoaderOptions,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: ',',
            options: LoaderOptions::default(),
        }
    }
}

impl CsvLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn reader<'a>(
        &self,
        content: &'a [u8],
        location: &str,
    ) -> Result<csv::Reader<&'a [u8]>, LoadError> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                LoadError::format(
                    location,
                    format!("delimiter {:?} is not a single ASCII character", self.delimiter),
                )
            })?;
        Ok(csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content))
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        Value::Null
    } else if let Ok(i) = cell.parse::<i64>() {
        Value::Number(i.into())
    } else if let Some(n) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        Value::Number(n)
    } else if cell == "true" || cell == "false" {
        Value::Bool(cell == "true")
    } else {
        Value::String(cell.to_string())
    }
}

#[async_trait]
impl DataLoader for CsvLoader {
    type Output = DataBatch;

    fn source_type(&self) -> &'static str {
        "csv"
    }

    async fn load(&self, path: &Path) -> Result<RawData<DataBatch>, LoadError> {
        let location = path.display().to_string();
        let content = tokio::fs::read(path).await?;
        let mut reader = self.reader(&content, &location)?;

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.iter().all(String::is_empty) {
            return Err(LoadError::format(location, "Empty CSV file"));
        }

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for record in reader.records() {
            if !self.options.allows(rows.len()) {
                break;
            }
            let record = record?;
            if record.len() != columns.len() {
                let line = record.position().map_or(0, csv::Position::line);
                return Err(LoadError::format(
                    location,
                    format!(
                        "line {line} has {} fields but the header declares {}",
                        record.len(),
                        columns.len()
                    ),
                ));
            }
            rows.push(record.iter().map(parse_cell).collect());
        }

        into_raw(DataBatch::new(columns, rows), path, self.source_type(), &self.options)
    }
}
