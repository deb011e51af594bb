//! Pass-through strategies.
//!
//! Each bypass prepares an empty config and hands the input payload to the
//! next stage unchanged. They let a pipeline run end to end when a stage is
//! not configured, and keep partial pipelines and tests simple.

use super::{
    CleaningConfig, CleaningSummary, DataCleaner, DataSelector, EvaluationConfig, EvaluationPlan,
    EvaluationSummary, FeatureImportances, LocalExplanations, ModelTransparency, InverseConfig, InverseSummary, Model, ModelAdapter, ModelEvaluator,
    Observations, PredictionConfig, PredictionSummary, ProblemType, SelectionConfig,
    SelectionSummary, TrainingConfig, TrainingSummary, TransformationConfig,
    TransformationSummary,
};
use crate::entity::{
    CleanedData, ModelInputData, ModelOutputData, PredictedData, RawData, SelectedData,
};
use crate::error::StrategyError;
use serde_json::Value;

fn bypass_observations() -> Observations {
    Observations::from([("bypass".to_string(), Value::Bool(true))])
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BypassCleaner;

impl<T: Send + Sync> DataCleaner<T> for BypassCleaner {
    fn prepare(&self, _data: &RawData<T>) -> Result<CleaningSummary, StrategyError> {
        Ok(CleaningSummary {
            config: CleaningConfig::default(),
            issues: bypass_observations(),
        })
    }

    fn clean(
        &self,
        data: &RawData<T>,
        _config: &CleaningConfig,
    ) -> Result<CleanedData<T>, StrategyError> {
        Ok(data.derive_shared("cleaner:bypass").into())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BypassSelector;

impl<T: Send + Sync> DataSelector<T> for BypassSelector {
    fn prepare(&self, _data: &CleanedData<T>) -> Result<SelectionSummary, StrategyError> {
        Ok(SelectionSummary {
            config: SelectionConfig::default(),
            observations: bypass_observations(),
        })
    }

    fn select(
        &self,
        data: &CleanedData<T>,
        _config: &SelectionConfig,
    ) -> Result<SelectedData<T>, StrategyError> {
        Ok(data.derive_shared("selector:bypass").into())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BypassAdapter;

impl<T: Send + Sync> ModelAdapter<T> for BypassAdapter {
    fn prepare_transform(
        &self,
        _data: &SelectedData<T>,
    ) -> Result<TransformationSummary, StrategyError> {
        Ok(TransformationSummary {
            config: TransformationConfig::default(),
            observations: bypass_observations(),
        })
    }

    fn transform(
        &self,
        data: &SelectedData<T>,
        _config: &TransformationConfig,
    ) -> Result<ModelInputData<T>, StrategyError> {
        Ok(data.derive_shared("adapter:bypass").into())
    }

    fn prepare_inverse(&self, _output: &ModelOutputData<T>) -> Result<InverseSummary, StrategyError> {
        Ok(InverseSummary {
            config: InverseConfig::default(),
            observations: bypass_observations(),
        })
    }

    fn inverse_transform(
        &self,
        output: &ModelOutputData<T>,
        _config: &InverseConfig,
    ) -> Result<PredictedData<T>, StrategyError> {
        Ok(output.derive_shared("inverse_adapter:bypass").into())
    }
}

/// Stateless model whose prediction is its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct BypassModel;

impl<T: Send + Sync> Model<T> for BypassModel {
    fn is_stateless(&self) -> bool {
        true
    }

    fn prepare_training(
        &self,
        problem_type: ProblemType,
        _data: &ModelInputData<T>,
    ) -> Result<TrainingSummary, StrategyError> {
        Ok(TrainingSummary {
            config: TrainingConfig::new(problem_type),
            observations: bypass_observations(),
        })
    }

    fn train(
        &mut self,
        problem_type: ProblemType,
        _data: &ModelInputData<T>,
        config: &TrainingConfig,
    ) -> Result<(), StrategyError> {
        config.ensure_problem_type(problem_type)
    }

    fn prepare_prediction(
        &self,
        _data: &ModelInputData<T>,
    ) -> Result<PredictionSummary, StrategyError> {
        Ok(PredictionSummary {
            config: PredictionConfig::default(),
            diagnostics: bypass_observations(),
        })
    }

    fn predict(
        &self,
        data: &ModelInputData<T>,
        _config: &PredictionConfig,
    ) -> Result<ModelOutputData<T>, StrategyError> {
        Ok(data.derive_shared("model:bypass").into())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BypassEvaluator;

impl<T: Send + Sync> ModelEvaluator<T> for BypassEvaluator {
    fn prepare(&self, _data: &PredictedData<T>) -> Result<EvaluationPlan, StrategyError> {
        Ok(EvaluationPlan {
            config: EvaluationConfig::default(),
            observations: bypass_observations(),
        })
    }

    fn evaluate(
        &self,
        _data: &PredictedData<T>,
        config: &EvaluationConfig,
    ) -> Result<EvaluationSummary, StrategyError> {
        Ok(EvaluationSummary {
            config: config.clone(),
            observations: bypass_observations(),
        })
    }
}

/// Explains nothing: no importances, no per-row contributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BypassTransparency;

impl<T> ModelTransparency<T> for BypassTransparency {
    fn feature_importances(
        &self,
        _model: &dyn Model<T>,
        _data: &PredictedData<T>,
    ) -> Result<FeatureImportances, StrategyError> {
        Ok(FeatureImportances::new())
    }

    fn local_explanations(
        &self,
        _model: &dyn Model<T>,
        _data: &PredictedData<T>,
    ) -> Result<LocalExplanations, StrategyError> {
        Ok(LocalExplanations::new())
    }
}
