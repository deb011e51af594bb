//! Staged strategy contracts.
//!
//! Every stage runs in two phases. `prepare*` inspects its input without
//! touching it and returns a summary holding an explicit config plus what it
//! observed. `apply` (`clean`, `select`, `transform`, ...) is deterministic
//! given `(input, config)`. Strategies keep no hidden state between the two
//! phases, so one prepared config can be reused across calls and runs.

pub mod adapter;
pub mod bypass;
pub mod cleaner;
pub mod column_selector;
pub mod evaluator;
pub mod model;
pub mod selector;
pub mod transparency;

pub use adapter::{InverseConfig, InverseSummary, ModelAdapter, TransformationConfig, TransformationSummary};
pub use bypass::{
    BypassAdapter, BypassCleaner, BypassEvaluator, BypassModel, BypassSelector, BypassTransparency,
};
pub use cleaner::{CleaningConfig, CleaningSummary, DataCleaner};
pub use column_selector::ColumnSelector;
pub use evaluator::{EvaluationConfig, EvaluationPlan, EvaluationSummary, ModelEvaluator};
pub use model::{Model, PredictionConfig, PredictionSummary, ProblemType, TrainingConfig, TrainingSummary};
pub use selector::{DataSelector, SelectionConfig, SelectionSummary};
pub use transparency::{FeatureImportances, LocalExplanations, ModelTransparency};

use crate::entity::BaseDataEntity;
use crate::error::StrategyError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form, serializable strategy parameters.
pub type Params = BTreeMap<String, Value>;

/// What a `prepare*` call noticed about its input.
pub type Observations = BTreeMap<String, Value>;

macro_rules! params_config {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub params: $crate::strategy::Params,
        }

        impl $name {
            pub fn new(params: $crate::strategy::Params) -> Self {
                Self { params }
            }

            pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
                self.params.insert(key.into(), value.into());
                self
            }

            pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
                self.params.get(key)
            }

            /// A string-list parameter such as a column list.
            pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
                $crate::strategy::string_list(self.params.get(key)?)
            }
        }
    };
}
pub(crate) use params_config;

pub(crate) fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Fail with [`StrategyError::Application`] unless every column in `columns`
/// is declared (as a feature or a target) by the entity's schema.
pub fn ensure_schema_columns<T>(
    entity: &BaseDataEntity<T>,
    columns: &[String],
) -> Result<(), StrategyError> {
    let schema = entity
        .schema()
        .ok_or_else(|| StrategyError::application("input has no schema to check the config against"))?;
    let declared = schema.all_columns();
    let missing: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|c| !declared.contains(c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StrategyError::application(format!(
            "config references columns absent from the current schema: {missing:?}"
        )))
    }
}
