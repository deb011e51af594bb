//! Payload shapes and their normalization into row views.
//!
//! A payload is resolved once into a [`PayloadShape`], then into borrowed
//! [`RowView`]s. Nothing is copied out of the payload.

use crate::error::ValidationExtractionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column-labelled record table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataBatch {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of one column, `None` if the column is not part of the batch.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }
}

/// The closed set of shapes validation understands.
#[derive(Debug, Clone, Copy)]
pub enum PayloadShape<'a> {
    /// A single mapping, treated as one row.
    Record(&'a Map<String, Value>),
    /// A record table with its own column labels.
    Table(&'a DataBatch),
    /// A sequence of rows; each row is a mapping, a positional array, or a scalar.
    Rows(&'a [Value]),
}

impl<'a> PayloadShape<'a> {
    /// Normalize into row views. Positional rows in [`PayloadShape::Rows`] are
    /// paired with `columns`.
    pub fn rows(self, columns: &'a [String]) -> Result<Vec<RowView<'a>>, ValidationExtractionError> {
        match self {
            PayloadShape::Record(map) => Ok(vec![RowView::Mapping(map)]),
            PayloadShape::Table(batch) => batch
                .rows
                .iter()
                .enumerate()
                .map(|(row, values)| {
                    if values.len() != batch.columns.len() {
                        return Err(ValidationExtractionError::RowWidth {
                            row,
                            expected: batch.columns.len(),
                            actual: values.len(),
                        });
                    }
                    Ok(RowView::Positional {
                        columns: &batch.columns,
                        values,
                    })
                })
                .collect(),
            PayloadShape::Rows(items) => Ok(items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => RowView::Mapping(map),
                    Value::Array(values) => RowView::Positional { columns, values },
                    other => RowView::Scalar(other),
                })
                .collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PayloadShape::Record(_) => 1,
            PayloadShape::Table(batch) => batch.rows.len(),
            PayloadShape::Rows(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A borrowed view of one row as column name → value.
#[derive(Debug, Clone, Copy)]
pub enum RowView<'a> {
    Mapping(&'a Map<String, Value>),
    Positional {
        columns: &'a [String],
        values: &'a [Value],
    },
    /// A bare item, exposed under the single column `value`.
    Scalar(&'a Value),
}

/// Column name used for scalar rows.
pub const SCALAR_COLUMN: &str = "value";

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        match *self {
            RowView::Mapping(map) => map.get(column),
            RowView::Positional { columns, values } => columns
                .iter()
                .zip(values)
                .find(|(name, _)| name.as_str() == column)
                .map(|(_, value)| value),
            RowView::Scalar(value) => (column == SCALAR_COLUMN).then_some(value),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Absent keys count as null.
    pub fn is_null(&self, column: &str) -> bool {
        self.get(column).is_none_or(Value::is_null)
    }
}

/// A value that can sit inside a data entity.
pub trait Payload: Send + Sync {
    /// Whether this payload stands for "no data".
    fn is_null(&self) -> bool {
        false
    }

    /// Resolve the row shape of this payload.
    fn shape(&self) -> Result<PayloadShape<'_>, ValidationExtractionError>;
}

impl Payload for Value {
    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn shape(&self) -> Result<PayloadShape<'_>, ValidationExtractionError> {
        match self {
            Value::Object(map) => Ok(PayloadShape::Record(map)),
            Value::Array(items) => Ok(PayloadShape::Rows(items)),
            other => Err(ValidationExtractionError::UnsupportedPayload {
                kind: value_kind(other).to_string(),
            }),
        }
    }
}

impl Payload for Map<String, Value> {
    fn shape(&self) -> Result<PayloadShape<'_>, ValidationExtractionError> {
        Ok(PayloadShape::Record(self))
    }
}

impl Payload for Vec<Value> {
    fn shape(&self) -> Result<PayloadShape<'_>, ValidationExtractionError> {
        Ok(PayloadShape::Rows(self))
    }
}

impl Payload for DataBatch {
    fn shape(&self) -> Result<PayloadShape<'_>, ValidationExtractionError> {
        Ok(PayloadShape::Table(self))
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
