//! # Cleanflow Core
//!
//! Immutable data entities and the contracts of a staged ML data pipeline.
//!
//! - [`entity`]: payload envelopes ([`BaseDataEntity`]) and the nominal stage
//!   types that flow between stages (`RawData` → `CleanedData` → ...).
//! - [`schema`]: declarative dataset schemas with quality constraints.
//! - [`validate`]: schema validation that returns a [`ValidationStatus`]
//!   instead of failing.
//! - [`strategy`]: two-phase (prepare, then apply) strategy traits, with
//!   pass-through bypass implementations.
//! - [`config`]: layered configuration providers.

pub mod config;
pub mod entity;
pub mod error;
pub mod provenance;
pub mod schema;
pub mod strategy;
pub mod validate;

pub use config::{ConfigProvider, FileConfigProvider, StaticConfigProvider};
pub use entity::{
    BaseDataEntity, CleanedData, DataBatch, EntityBuilder, Metadata, ModelInputData,
    ModelOutputData, Payload, PayloadShape, PredictedData, RawData, RowView, SelectedData,
};
pub use error::{
    ConfigError, InvalidEntityError, SchemaDefinitionError, StrategyError,
    ValidationExtractionError,
};
pub use provenance::Provenance;
pub use schema::{DatasetSchema, FeatureType, RangeBound, SchemaConstraints};
pub use validate::{
    DataValidator, SchemaValidator, ValidationDetails, ValidationPolicy, ValidationStatus,
};
