//! Selection stage contract: `CleanedData` → `SelectedData`.

use super::{Observations, params_config};
use crate::entity::{CleanedData, SelectedData};
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};

params_config!(
    /// Parameters derived from cleaned data that drive selection: rankings,
    /// variance thresholds, selected column names.
    SelectionConfig
);

/// Result of [`DataSelector::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub config: SelectionConfig,
    /// E.g. candidate or dropped features and the reasons.
    pub observations: Observations,
}

/// Feature/record selection strategy.
pub trait DataSelector<T>: Send + Sync {
    fn prepare(&self, data: &CleanedData<T>) -> Result<SelectionSummary, StrategyError>;

    fn select(
        &self,
        data: &CleanedData<T>,
        config: &SelectionConfig,
    ) -> Result<SelectedData<T>, StrategyError>;
}
