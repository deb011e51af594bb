//! Cleaning stage contract: `RawData` → `CleanedData`.

use super::{Observations, params_config};
use crate::entity::{CleanedData, RawData};
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};

params_config!(
    /// Thresholds and parameters extracted from raw data that drive cleaning.
    CleaningConfig
);

/// Result of [`DataCleaner::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub config: CleaningConfig,
    /// Detected issues, e.g. missing rates or outliers.
    pub issues: Observations,
}

/// Data cleaning strategy.
pub trait DataCleaner<T>: Send + Sync {
    /// Inspect raw data and derive the cleaning config.
    fn prepare(&self, data: &RawData<T>) -> Result<CleaningSummary, StrategyError>;

    /// Clean `data` according to a previously prepared config.
    fn clean(&self, data: &RawData<T>, config: &CleaningConfig)
    -> Result<CleanedData<T>, StrategyError>;
}
