//! Adapter contract between domain data and model I/O.
//!
//! Two independent prepare/apply pairs share one trait: forward
//! (`SelectedData` → `ModelInputData`) and inverse (`ModelOutputData` →
//! `PredictedData`). The inverse config is computed from the model output
//! itself and need not be derivable from the forward config.

use super::{Observations, params_config};
use crate::entity::{ModelInputData, ModelOutputData, PredictedData, SelectedData};
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};

params_config!(
    /// Forward parameters: scaling factors, encoding maps, feature order.
    TransformationConfig
);

params_config!(
    /// Inverse parameters: output mapping, decoding rules, target rescaling.
    InverseConfig
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationSummary {
    pub config: TransformationConfig,
    pub observations: Observations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InverseSummary {
    pub config: InverseConfig,
    pub observations: Observations,
}

/// Model adapter strategy.
pub trait ModelAdapter<T>: Send + Sync {
    fn prepare_transform(
        &self,
        data: &SelectedData<T>,
    ) -> Result<TransformationSummary, StrategyError>;

    fn transform(
        &self,
        data: &SelectedData<T>,
        config: &TransformationConfig,
    ) -> Result<ModelInputData<T>, StrategyError>;

    fn prepare_inverse(&self, output: &ModelOutputData<T>) -> Result<InverseSummary, StrategyError>;

    fn inverse_transform(
        &self,
        output: &ModelOutputData<T>,
        config: &InverseConfig,
    ) -> Result<PredictedData<T>, StrategyError>;
}
