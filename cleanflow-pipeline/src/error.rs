//! Error types for pipeline runs and data loading.

use cleanflow_core::{InvalidEntityError, StrategyError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Position of a strategy in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Cleaner,
    Selector,
    Adapter,
    Model,
    InverseAdapter,
    Evaluator,
    Transparency,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cleaner => "cleaner",
            Self::Selector => "selector",
            Self::Adapter => "adapter",
            Self::Model => "model",
            Self::InverseAdapter => "inverse_adapter",
            Self::Evaluator => "evaluator",
            Self::Transparency => "transparency",
        };
        f.write_str(name)
    }
}

/// Which half of a stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStep {
    Prepare,
    Apply,
}

impl fmt::Display for StageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare => f.write_str("prepare"),
            Self::Apply => f.write_str("apply"),
        }
    }
}

/// A stage failed and the run was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed during {step}: {source}")]
    Stage {
        stage: StageKind,
        step: StageStep,
        source: StrategyError,
    },
}

impl PipelineError {
    pub(crate) fn stage(stage: StageKind, step: StageStep) -> impl FnOnce(StrategyError) -> Self {
        move |source| Self::Stage {
            stage,
            step,
            source,
        }
    }

    pub fn stage_kind(&self) -> StageKind {
        match self {
            Self::Stage { stage, .. } => *stage,
        }
    }

    pub fn step(&self) -> StageStep {
        match self {
            Self::Stage { step, .. } => *step,
        }
    }
}

/// Errors from raw data loaders.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed input at {location}: {reason}")]
    Format { location: String, reason: String },

    #[error("Invalid entity: {0}")]
    Entity(#[from] InvalidEntityError),
}

impl LoadError {
    pub fn format(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
