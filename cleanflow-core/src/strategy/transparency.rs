//! Explainability contract over predicted data.

use super::Model;
use crate::entity::PredictedData;
use crate::error::StrategyError;
use std::collections::BTreeMap;

/// Feature name → global importance score.
pub type FeatureImportances = BTreeMap<String, f64>;

/// Row index → feature contributions for that row.
pub type LocalExplanations = BTreeMap<usize, BTreeMap<String, f64>>;

/// Explains a trained model's predictions. Implementations are stateless and
/// only read the model through its trait.
pub trait ModelTransparency<T>: Send + Sync {
    fn feature_importances(
        &self,
        model: &dyn Model<T>,
        data: &PredictedData<T>,
    ) -> Result<FeatureImportances, StrategyError>;

    fn local_explanations(
        &self,
        model: &dyn Model<T>,
        data: &PredictedData<T>,
    ) -> Result<LocalExplanations, StrategyError>;
}
