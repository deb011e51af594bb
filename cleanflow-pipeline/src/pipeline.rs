//! Staged pipeline orchestrator.
//!
//! A [`Pipeline`] owns one strategy per stage and runs them in a fixed linear
//! order, calling `prepare` then `apply` for each and feeding every output to
//! the next stage. It holds no domain logic. Stage failures abort the flow and
//! are reported as [`PipelineError::Stage`].

use crate::error::{PipelineError, StageKind, StageStep};
use cleanflow_core::config::ConfigProvider;
use cleanflow_core::strategy::{
    BypassAdapter, BypassCleaner, BypassEvaluator, BypassModel, BypassSelector,
    BypassTransparency, CleaningSummary, DataCleaner, DataSelector, EvaluationSummary,
    FeatureImportances, LocalExplanations, Model, ModelAdapter, ModelEvaluator,
    ModelTransparency, ProblemType, SelectionSummary, TrainingSummary, TransformationSummary,
};
use cleanflow_core::{
    BaseDataEntity, CleanedData, ModelInputData, ModelOutputData, Payload, PredictedData,
    RawData, SelectedData,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use tracing::{debug, info, warn};

/// Orchestration switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Attach a fresh validation status to every stage output. Never blocks.
    #[serde(default)]
    pub validate_stages: bool,
}

impl PipelineOptions {
    /// Read `pipeline.validate_stages`.
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        let validate_stages = provider
            .get("pipeline.validate_stages", Value::Bool(false))
            .as_bool()
            .unwrap_or(false);
        Self { validate_stages }
    }
}

/// Summaries gathered while training.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub problem_type: ProblemType,
    pub cleaning: CleaningSummary,
    pub selection: SelectionSummary,
    pub transformation: TransformationSummary,
    pub training: TrainingSummary,
    pub rows: Option<usize>,
}

/// Global and per-row explanations of one prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Explanation {
    pub feature_importances: FeatureImportances,
    pub local: LocalExplanations,
}

/// Linear cleaner → selector → adapter → model → inverse adapter pipeline.
pub struct Pipeline<T> {
    cleaner: Box<dyn DataCleaner<T>>,
    selector: Box<dyn DataSelector<T>>,
    adapter: Box<dyn ModelAdapter<T>>,
    model: Box<dyn Model<T>>,
    evaluator: Box<dyn ModelEvaluator<T>>,
    transparency: Box<dyn ModelTransparency<T>>,
    options: PipelineOptions,
    trained: bool,
}

impl<T: Payload + 'static> Pipeline<T> {
    pub fn builder() -> PipelineBuilder<T> {
        PipelineBuilder::new()
    }

    /// Every stage is a bypass.
    pub fn bypass() -> Self {
        Self::builder().build()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Enrichment flow: clean, then select.
    pub fn enrich(&self, raw: &RawData<T>) -> Result<SelectedData<T>, PipelineError> {
        info!(entity = raw.identity(), rows = ?raw.row_count(), "Enrichment started");
        let (_, cleaned) = self.clean(raw)?;
        let (_, selected) = self.select(&cleaned)?;
        info!(entity = selected.identity(), rows = ?selected.row_count(), "Enrichment finished");
        Ok(selected)
    }

    /// End-to-end prediction flow.
    pub fn run(&self, raw: &RawData<T>) -> Result<PredictedData<T>, PipelineError> {
        info!(entity = raw.identity(), rows = ?raw.row_count(), "Prediction run started");
        if !self.trained && !self.model.is_stateless() {
            warn!("Predicting with a stateful model that this pipeline has not trained");
        }

        let (_, cleaned) = self.clean(raw)?;
        let (_, selected) = self.select(&cleaned)?;
        let (_, input) = self.transform(&selected)?;
        let output = self.predict(&input)?;
        let predicted = self.inverse(&output)?;

        info!(
            entity = predicted.identity(),
            rows = ?predicted.row_count(),
            "Prediction run finished"
        );
        Ok(predicted)
    }

    /// Training flow: clean, select and transform, then prepare and train
    /// the model for `problem_type`.
    pub fn train(
        &mut self,
        raw: &RawData<T>,
        problem_type: ProblemType,
    ) -> Result<TrainingReport, PipelineError> {
        info!(entity = raw.identity(), %problem_type, "Training started");
        let (cleaning, cleaned) = self.clean(raw)?;
        let (selection, selected) = self.select(&cleaned)?;
        let (transformation, input) = self.transform(&selected)?;

        let training = self
            .model
            .prepare_training(problem_type, &input)
            .map_err(PipelineError::stage(StageKind::Model, StageStep::Prepare))?;
        debug!(stage = %StageKind::Model, step = %StageStep::Prepare, "Training prepared");
        self.model
            .train(problem_type, &input, &training.config)
            .map_err(PipelineError::stage(StageKind::Model, StageStep::Apply))?;
        self.trained = true;

        let rows = input.row_count();
        info!(entity = input.identity(), rows = ?rows, "Training finished");
        Ok(TrainingReport {
            problem_type,
            cleaning,
            selection,
            transformation,
            training,
            rows,
        })
    }

    /// Evaluate a prediction with the configured evaluator.
    pub fn evaluate(&self, predicted: &PredictedData<T>) -> Result<EvaluationSummary, PipelineError> {
        let plan = self
            .evaluator
            .prepare(predicted)
            .map_err(PipelineError::stage(StageKind::Evaluator, StageStep::Prepare))?;
        let summary = self
            .evaluator
            .evaluate(predicted, &plan.config)
            .map_err(PipelineError::stage(StageKind::Evaluator, StageStep::Apply))?;
        debug!(entity = predicted.identity(), "Evaluation finished");
        Ok(summary)
    }

    /// Explain a prediction with the configured transparency strategy and the
    /// pipeline's model.
    pub fn explain(&self, predicted: &PredictedData<T>) -> Result<Explanation, PipelineError> {
        let model: &dyn Model<T> = &*self.model;
        let feature_importances = self
            .transparency
            .feature_importances(model, predicted)
            .map_err(PipelineError::stage(StageKind::Transparency, StageStep::Apply))?;
        let local = self
            .transparency
            .local_explanations(model, predicted)
            .map_err(PipelineError::stage(StageKind::Transparency, StageStep::Apply))?;
        debug!(
            entity = predicted.identity(),
            features = feature_importances.len(),
            rows = local.len(),
            "Explanation finished"
        );
        Ok(Explanation {
            feature_importances,
            local,
        })
    }

    fn clean(&self, raw: &RawData<T>) -> Result<(CleaningSummary, CleanedData<T>), PipelineError> {
        let summary = self
            .cleaner
            .prepare(raw)
            .map_err(PipelineError::stage(StageKind::Cleaner, StageStep::Prepare))?;
        let cleaned = self
            .cleaner
            .clean(raw, &summary.config)
            .map_err(PipelineError::stage(StageKind::Cleaner, StageStep::Apply))?;
        Ok((summary, self.checkpoint(StageKind::Cleaner, cleaned)))
    }

    fn select(
        &self,
        cleaned: &CleanedData<T>,
    ) -> Result<(SelectionSummary, SelectedData<T>), PipelineError> {
        let summary = self
            .selector
            .prepare(cleaned)
            .map_err(PipelineError::stage(StageKind::Selector, StageStep::Prepare))?;
        let selected = self
            .selector
            .select(cleaned, &summary.config)
            .map_err(PipelineError::stage(StageKind::Selector, StageStep::Apply))?;
        Ok((summary, self.checkpoint(StageKind::Selector, selected)))
    }

    fn transform(
        &self,
        selected: &SelectedData<T>,
    ) -> Result<(TransformationSummary, ModelInputData<T>), PipelineError> {
        let summary = self
            .adapter
            .prepare_transform(selected)
            .map_err(PipelineError::stage(StageKind::Adapter, StageStep::Prepare))?;
        let input = self
            .adapter
            .transform(selected, &summary.config)
            .map_err(PipelineError::stage(StageKind::Adapter, StageStep::Apply))?;
        Ok((summary, self.checkpoint(StageKind::Adapter, input)))
    }

    fn predict(&self, input: &ModelInputData<T>) -> Result<ModelOutputData<T>, PipelineError> {
        let summary = self
            .model
            .prepare_prediction(input)
            .map_err(PipelineError::stage(StageKind::Model, StageStep::Prepare))?;
        if !summary.diagnostics.is_empty() {
            debug!(diagnostics = ?summary.diagnostics, "Prediction diagnostics");
        }
        let output = self
            .model
            .predict(input, &summary.config)
            .map_err(PipelineError::stage(StageKind::Model, StageStep::Apply))?;
        Ok(self.checkpoint(StageKind::Model, output))
    }

    fn inverse(&self, output: &ModelOutputData<T>) -> Result<PredictedData<T>, PipelineError> {
        let summary = self
            .adapter
            .prepare_inverse(output)
            .map_err(PipelineError::stage(StageKind::InverseAdapter, StageStep::Prepare))?;
        let predicted = self
            .adapter
            .inverse_transform(output, &summary.config)
            .map_err(PipelineError::stage(StageKind::InverseAdapter, StageStep::Apply))?;
        Ok(self.checkpoint(StageKind::InverseAdapter, predicted))
    }

    /// Log a finished stage and, with `validate_stages`, attach a fresh status.
    fn checkpoint<S>(&self, stage: StageKind, entity: S) -> S
    where
        S: Deref<Target = BaseDataEntity<T>> + From<BaseDataEntity<T>>,
    {
        debug!(
            stage = %stage,
            entity = entity.identity(),
            rows = ?entity.row_count(),
            "Stage applied"
        );
        if !self.options.validate_stages {
            return entity;
        }

        let status = entity.validate_against_schema();
        if !status.is_valid() {
            warn!(stage = %stage, errors = ?status.errors(), "Stage output failed validation");
        } else if !status.warnings().is_empty() {
            warn!(stage = %stage, warnings = ?status.warnings(), "Stage output has validation warnings");
        }
        S::from(entity.with_validation_status(status))
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("trained", &self.trained)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Pipeline`]. Stages left unset run their bypass.
pub struct PipelineBuilder<T> {
    cleaner: Option<Box<dyn DataCleaner<T>>>,
    selector: Option<Box<dyn DataSelector<T>>>,
    adapter: Option<Box<dyn ModelAdapter<T>>>,
    model: Option<Box<dyn Model<T>>>,
    evaluator: Option<Box<dyn ModelEvaluator<T>>>,
    transparency: Option<Box<dyn ModelTransparency<T>>>,
    options: PipelineOptions,
}

impl<T: Payload + 'static> PipelineBuilder<T> {
    pub fn new() -> Self {
        Self {
            cleaner: None,
            selector: None,
            adapter: None,
            model: None,
            evaluator: None,
            transparency: None,
            options: PipelineOptions::default(),
        }
    }

    pub fn cleaner(mut self, cleaner: impl DataCleaner<T> + 'static) -> Self {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    pub fn selector(mut self, selector: impl DataSelector<T> + 'static) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    pub fn adapter(mut self, adapter: impl ModelAdapter<T> + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    pub fn model(mut self, model: impl Model<T> + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    pub fn evaluator(mut self, evaluator: impl ModelEvaluator<T> + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn transparency(mut self, transparency: impl ModelTransparency<T> + 'static) -> Self {
        self.transparency = Some(Box::new(transparency));
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate_stages(mut self, enabled: bool) -> Self {
        self.options.validate_stages = enabled;
        self
    }

    pub fn build(self) -> Pipeline<T> {
        Pipeline {
            cleaner: self.cleaner.unwrap_or_else(|| Box::new(BypassCleaner)),
            selector: self.selector.unwrap_or_else(|| Box::new(BypassSelector)),
            adapter: self.adapter.unwrap_or_else(|| Box::new(BypassAdapter)),
            model: self.model.unwrap_or_else(|| Box::new(BypassModel)),
            evaluator: self.evaluator.unwrap_or_else(|| Box::new(BypassEvaluator)),
            transparency: self
                .transparency
                .unwrap_or_else(|| Box::new(BypassTransparency)),
            options: self.options,
            trained: false,
        }
    }
}

impl<T: Payload + 'static> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
