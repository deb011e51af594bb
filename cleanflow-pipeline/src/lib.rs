//! # Cleanflow Pipeline
//!
//! Runs the staged strategies of `cleanflow-core` in order and loads raw
//! files into entities.
//!
//! - [`Pipeline`]: enrichment, prediction, training, evaluation and explanation flows
//!   over injected strategies, with bypasses for unset stages.
//! - [`loader`]: async CSV / JSON / JSONL loaders producing `RawData`.

pub mod error;
pub mod loader;
pub mod pipeline;

pub use error::{LoadError, PipelineError, StageKind, StageStep};
pub use loader::{CsvLoader, DataLoader, JsonLoader, JsonlLoader, LoaderOptions};
pub use pipeline::{Explanation, Pipeline, PipelineBuilder, PipelineOptions, TrainingReport};
