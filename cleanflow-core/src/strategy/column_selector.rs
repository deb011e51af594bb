//! Column projection over record payloads.

use super::{
    DataSelector, Observations, SelectionConfig, SelectionSummary, ensure_schema_columns,
};
use crate::entity::{CleanedData, Payload, PayloadShape, SelectedData};
use crate::error::StrategyError;
use crate::schema::{DatasetSchema, SchemaConstraints};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Config key holding the selected column list.
pub const COLUMNS_KEY: &str = "columns";

/// Keeps a fixed set of columns from every record.
///
/// Without an explicit list, `prepare` proposes the schema's features and
/// targets, or the keys of the first record when there is no schema.
#[derive(Debug, Clone, Default)]
pub struct ColumnSelector {
    columns: Option<Vec<String>>,
}

impl ColumnSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }
}

fn records(data: &Value) -> Result<Vec<&Map<String, Value>>, String> {
    match data.shape().map_err(|e| e.to_string())? {
        PayloadShape::Record(map) => Ok(vec![map]),
        PayloadShape::Rows(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object()
                    .ok_or_else(|| format!("row {i} is not a record"))
            })
            .collect(),
        PayloadShape::Table(_) => Err("tabular payloads are not supported".to_string()),
    }
}

impl DataSelector<Value> for ColumnSelector {
    fn prepare(&self, data: &CleanedData<Value>) -> Result<SelectionSummary, StrategyError> {
        let rows = records(data.data()).map_err(StrategyError::preparation)?;
        let seen: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let columns: Vec<String> = match (&self.columns, data.schema()) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(schema)) => schema.all_columns().into_iter().map(str::to_string).collect(),
            (None, None) => rows
                .first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default(),
        };
        if columns.is_empty() {
            return Err(StrategyError::preparation("no columns to select"));
        }

        let dropped: Vec<&str> = seen
            .iter()
            .copied()
            .filter(|key| !columns.iter().any(|c| c == key))
            .collect();
        let unseen: Vec<&str> = columns
            .iter()
            .map(String::as_str)
            .filter(|c| !seen.contains(c))
            .collect();

        let mut observations = Observations::new();
        observations.insert("candidate_columns".into(), Value::from(columns.clone()));
        observations.insert("dropped_columns".into(), Value::from(dropped));
        if !unseen.is_empty() {
            observations.insert("unseen_columns".into(), Value::from(unseen));
        }

        Ok(SelectionSummary {
            config: SelectionConfig::default().with(COLUMNS_KEY, columns),
            observations,
        })
    }

    fn select(
        &self,
        data: &CleanedData<Value>,
        config: &SelectionConfig,
    ) -> Result<SelectedData<Value>, StrategyError> {
        let columns = config.string_list(COLUMNS_KEY).ok_or_else(|| {
            StrategyError::application(format!("config has no '{COLUMNS_KEY}' list"))
        })?;
        let schema = match data.schema() {
            Some(schema) => {
                ensure_schema_columns(data, &columns)?;
                Some(narrow_schema(schema, &columns)?)
            }
            None => None,
        };

        let rows = records(data.data()).map_err(StrategyError::application)?;
        let projected: Vec<Value> = rows
            .iter()
            .map(|row| {
                let kept: Map<String, Value> = columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect();
                Value::Object(kept)
            })
            .collect();
        let payload = match data.data() {
            Value::Object(_) => projected.into_iter().next().unwrap_or(Value::Object(Map::new())),
            _ => Value::Array(projected),
        };

        let mut selected = data
            .derive(payload, "selector:columns")
            .map_err(|e| StrategyError::application(e.to_string()))?;
        if let Some(schema) = schema {
            selected = selected.with_schema(schema);
        }
        tracing::debug!(columns = columns.len(), "Columns selected");
        Ok(selected.into())
    }
}

/// Restrict a schema to `keep`, carrying over types and constraints.
fn narrow_schema(schema: &DatasetSchema, keep: &[String]) -> Result<DatasetSchema, StrategyError> {
    let features: Vec<String> = schema.columns().iter().filter(|c| keep.contains(c)).cloned().collect();
    let targets: Vec<String> = schema.targets().iter().filter(|c| keep.contains(c)).cloned().collect();

    let mut builder = DatasetSchema::builder(features);
    if !targets.is_empty() {
        builder = builder.targets(targets);
    }
    if let Some(types) = schema.feature_types() {
        for (column, kind) in types.iter().filter(|(c, _)| keep.contains(c)) {
            builder = builder.feature_type(column.clone(), *kind);
        }
    }
    if let Some(constraints) = schema.constraints() {
        builder = builder.constraints(SchemaConstraints {
            not_null: constraints.not_null.iter().filter(|c| keep.contains(c)).cloned().collect(),
            range: constraints
                .range
                .iter()
                .filter(|(c, _)| keep.contains(c))
                .map(|(c, b)| (c.clone(), *b))
                .collect(),
            allowed_values: constraints
                .allowed_values
                .iter()
                .filter(|(c, _)| keep.contains(c))
                .map(|(c, v)| (c.clone(), v.clone()))
                .collect(),
        });
    }
    if let Some(description) = schema.description() {
        builder = builder.description(description);
    }
    if let Some(version) = schema.version() {
        builder = builder.version(version);
    }
    builder
        .build()
        .map_err(|e| StrategyError::application(format!("selection leaves an invalid schema: {e}")))
}
