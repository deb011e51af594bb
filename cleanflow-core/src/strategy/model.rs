//! Model contract: training and inference, each with explicit preparation.

use super::{Observations, Params, params_config};
use crate::entity::{ModelInputData, ModelOutputData};
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Classification,
    Regression,
    Other,
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classification => write!(f, "classification"),
            Self::Regression => write!(f, "regression"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Hyperparameters fixed before training, bound to one problem type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub problem_type: ProblemType,
    #[serde(default)]
    pub params: Params,
}

impl TrainingConfig {
    pub fn new(problem_type: ProblemType) -> Self {
        Self {
            problem_type,
            params: Params::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// `train` must be called with the problem type the config was prepared for.
    pub fn ensure_problem_type(&self, problem_type: ProblemType) -> Result<(), StrategyError> {
        if self.problem_type == problem_type {
            Ok(())
        } else {
            Err(StrategyError::application(format!(
                "training config was prepared for {} but train was called for {}",
                self.problem_type, problem_type
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub config: TrainingConfig,
    /// E.g. class imbalance or capacity estimates.
    pub observations: Observations,
}

params_config!(
    /// Prediction-time parameters: thresholds, calibration maps, ensemble weights.
    PredictionConfig
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub config: PredictionConfig,
    /// E.g. input drift flags.
    pub diagnostics: Observations,
}

/// Modeling strategy.
///
/// Training may update learned parameters, hence `&mut self`. Calling
/// [`predict`](Model::predict) before [`train`](Model::train) is undefined
/// unless [`is_stateless`](Model::is_stateless) returns `true`.
pub trait Model<T>: Send + Sync {
    fn is_stateless(&self) -> bool {
        false
    }

    fn prepare_training(
        &self,
        problem_type: ProblemType,
        data: &ModelInputData<T>,
    ) -> Result<TrainingSummary, StrategyError>;

    fn train(
        &mut self,
        problem_type: ProblemType,
        data: &ModelInputData<T>,
        config: &TrainingConfig,
    ) -> Result<(), StrategyError>;

    fn prepare_prediction(&self, data: &ModelInputData<T>)
    -> Result<PredictionSummary, StrategyError>;

    fn predict(
        &self,
        data: &ModelInputData<T>,
        config: &PredictionConfig,
    ) -> Result<ModelOutputData<T>, StrategyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_type_mismatch_rejected() {
        let config = TrainingConfig::new(ProblemType::Regression);
        assert!(config.ensure_problem_type(ProblemType::Regression).is_ok());
        let err = config
            .ensure_problem_type(ProblemType::Classification)
            .unwrap_err();
        assert!(err.to_string().contains("prepared for regression"));
    }

    #[test]
    fn test_problem_type_serde_names() {
        assert_eq!(
            serde_json::to_value(ProblemType::Classification).unwrap(),
            serde_json::json!("classification")
        );
    }
}
