//! Evaluation contract over predicted data.

use super::{Observations, params_config};
use crate::entity::PredictedData;
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};

params_config!(
    /// Thresholds and metric choices that guide evaluation.
    EvaluationConfig
);

/// Result of [`ModelEvaluator::prepare`]: the config plus what was noticed
/// about the predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPlan {
    pub config: EvaluationConfig,
    pub observations: Observations,
}

/// Metrics or findings produced by [`ModelEvaluator::evaluate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub config: EvaluationConfig,
    pub observations: Observations,
}

/// Model evaluation strategy. Implementations are stateless.
pub trait ModelEvaluator<T>: Send + Sync {
    fn prepare(&self, data: &PredictedData<T>) -> Result<EvaluationPlan, StrategyError>;

    fn evaluate(
        &self,
        data: &PredictedData<T>,
        config: &EvaluationConfig,
    ) -> Result<EvaluationSummary, StrategyError>;
}
