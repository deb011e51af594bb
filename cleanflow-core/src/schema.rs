//! Declarative dataset schema: expected columns, targets, and quality rules.

use crate::error::SchemaDefinitionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Semantic type tag for a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Numeric,
    Categorical,
    Datetime,
    Boolean,
    Text,
}

/// Inclusive numeric bounds for a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct RangeBound {
    pub low: f64,
    pub high: f64,
}

impl RangeBound {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

impl From<(f64, f64)> for RangeBound {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<RangeBound> for (f64, f64) {
    fn from(bound: RangeBound) -> Self {
        (bound.low, bound.high)
    }
}

/// Quality rules checked by validation.
///
/// `not_null` and `range` violations block validity; `allowed_values`
/// deviations are reported as warnings only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConstraints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_null: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub range: BTreeMap<String, RangeBound>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allowed_values: BTreeMap<String, Vec<Value>>,
}

impl SchemaConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_null<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.not_null.contains(&column) {
                self.not_null.push(column);
            }
        }
        self
    }

    pub fn range(mut self, column: impl Into<String>, low: f64, high: f64) -> Self {
        self.range.insert(column.into(), RangeBound::new(low, high));
        self
    }

    pub fn allowed_values<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.not_null.is_empty() && self.range.is_empty() && self.allowed_values.is_empty()
    }
}

/// Expected shape and quality rules of a dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaSpec")]
pub struct DatasetSchema {
    columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    targets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature_types: Option<BTreeMap<String, FeatureType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<SchemaConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl DatasetSchema {
    /// Schema with feature columns only.
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(columns).build()
    }

    pub fn builder<I, S>(columns: I) -> DatasetSchemaBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DatasetSchemaBuilder {
            spec: SchemaSpec {
                columns: columns.into_iter().map(Into::into).collect(),
                ..SchemaSpec::default()
            },
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Target columns; empty when none are declared.
    pub fn targets(&self) -> &[String] {
        self.targets.as_deref().unwrap_or_default()
    }

    pub fn has_targets(&self) -> bool {
        !self.targets().is_empty()
    }

    pub fn feature_types(&self) -> Option<&BTreeMap<String, FeatureType>> {
        self.feature_types.as_ref()
    }

    pub fn feature_type(&self, column: &str) -> Option<FeatureType> {
        self.feature_types.as_ref()?.get(column).copied()
    }

    pub fn constraints(&self) -> Option<&SchemaConstraints> {
        self.constraints.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Feature columns followed by targets not already listed as features.
    pub fn all_columns(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        for target in self.targets() {
            if !all.contains(&target.as_str()) {
                all.push(target);
            }
        }
        all
    }

    /// Whether two schemas declare the same columns and targets.
    pub fn same_layout(&self, other: &DatasetSchema) -> bool {
        self.columns == other.columns && self.targets() == other.targets()
    }
}

/// Builder for [`DatasetSchema`]; invariants are checked in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DatasetSchemaBuilder {
    spec: SchemaSpec,
}

impl DatasetSchemaBuilder {
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn feature_type(mut self, column: impl Into<String>, kind: FeatureType) -> Self {
        self.spec
            .feature_types
            .get_or_insert_with(BTreeMap::new)
            .insert(column.into(), kind);
        self
    }

    pub fn constraints(mut self, constraints: SchemaConstraints) -> Self {
        self.spec.constraints = Some(constraints);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.spec.version = Some(version.into());
        self
    }

    pub fn build(self) -> Result<DatasetSchema, SchemaDefinitionError> {
        DatasetSchema::try_from(self.spec)
    }
}

/// Unchecked schema fields, used for deserialization and building.
#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaSpec {
    columns: Vec<String>,
    #[serde(default)]
    targets: Option<Vec<String>>,
    #[serde(default)]
    feature_types: Option<BTreeMap<String, FeatureType>>,
    #[serde(default)]
    constraints: Option<SchemaConstraints>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl TryFrom<SchemaSpec> for DatasetSchema {
    type Error = SchemaDefinitionError;

    fn try_from(spec: SchemaSpec) -> Result<Self, Self::Error> {
        if spec.columns.is_empty() {
            return Err(SchemaDefinitionError::EmptyColumns);
        }
        let mut seen = HashSet::new();
        for column in &spec.columns {
            if column.trim().is_empty() {
                return Err(SchemaDefinitionError::BlankColumn);
            }
            if !seen.insert(column.as_str()) {
                return Err(SchemaDefinitionError::DuplicateColumn {
                    name: column.clone(),
                });
            }
        }
        if let Some(targets) = &spec.targets {
            if targets.iter().any(|t| t.trim().is_empty()) {
                return Err(SchemaDefinitionError::BlankTarget);
            }
        }
        if let Some(description) = &spec.description {
            if description.trim().is_empty() {
                return Err(SchemaDefinitionError::BlankDescription);
            }
        }
        if let Some(constraints) = &spec.constraints {
            for (column, bound) in &constraints.range {
                if !bound.low.is_finite() || !bound.high.is_finite() || bound.low > bound.high {
                    return Err(SchemaDefinitionError::InvalidRange {
                        column: column.clone(),
                        low: bound.low,
                        high: bound.high,
                    });
                }
            }
        }

        Ok(Self {
            columns: spec.columns,
            targets: spec.targets,
            feature_types: spec.feature_types,
            constraints: spec.constraints.filter(|c| !c.is_empty()),
            description: spec.description,
            version: spec.version,
        })
    }
}
