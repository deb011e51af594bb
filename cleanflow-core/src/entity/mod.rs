//! Immutable data envelopes.
//!
//! A [`BaseDataEntity`] binds a payload to its schema, provenance, validation
//! status and lineage. Every "mutation" returns a new entity; the payload is
//! shared behind an [`Arc`] and never mutated in place.

pub mod payload;
pub mod stages;

pub use payload::{DataBatch, Payload, PayloadShape, RowView, SCALAR_COLUMN};
pub use stages::{CleanedData, ModelInputData, ModelOutputData, PredictedData, RawData, SelectedData};

use crate::error::InvalidEntityError;
use crate::provenance::Provenance;
use crate::schema::DatasetSchema;
use crate::validate::{ValidationPolicy, ValidationStatus, validate_payload};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Read-only entity metadata.
pub type Metadata = BTreeMap<String, Value>;

/// Immutable envelope around a payload of type `T`.
pub struct BaseDataEntity<T> {
    data: Arc<T>,
    schema: Option<Arc<DatasetSchema>>,
    metadata: Arc<Metadata>,
    provenance: Option<Provenance>,
    validation_status: Option<ValidationStatus>,
    identity: String,
    version: Option<String>,
    partition_info: Option<String>,
    lineage_id: Option<String>,
    embeddings: Option<Value>,
    feedback: Option<Value>,
    confidence: Option<f64>,
    observation_time: Option<DateTime<Utc>>,
}

// Manual impl: cloning only bumps reference counts, so `T: Clone` is not required.
impl<T> Clone for BaseDataEntity<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            schema: self.schema.clone(),
            metadata: Arc::clone(&self.metadata),
            provenance: self.provenance.clone(),
            validation_status: self.validation_status.clone(),
            identity: self.identity.clone(),
            version: self.version.clone(),
            partition_info: self.partition_info.clone(),
            lineage_id: self.lineage_id.clone(),
            embeddings: self.embeddings.clone(),
            feedback: self.feedback.clone(),
            confidence: self.confidence,
            observation_time: self.observation_time,
        }
    }
}

impl<T: Payload> BaseDataEntity<T> {
    /// Entity with only a payload.
    pub fn new(data: T) -> Result<Self, InvalidEntityError> {
        Self::builder(data).build()
    }

    pub fn builder(data: T) -> EntityBuilder<T> {
        EntityBuilder::new().data(data)
    }

    /// Validate the current payload against the current schema with default
    /// thresholds. Pure: `self` is not touched and every call recomputes.
    pub fn validate_against_schema(&self) -> ValidationStatus {
        self.validate_with(&ValidationPolicy::default())
    }

    pub fn validate_with(&self, policy: &ValidationPolicy) -> ValidationStatus {
        validate_payload(self.data.as_ref(), self.schema(), policy)
    }

    /// Copy carrying a freshly computed validation status.
    pub fn validated(&self) -> Self {
        self.with_validation_status(self.validate_against_schema())
    }

    /// Number of rows, if the payload is row-shaped.
    pub fn row_count(&self) -> Option<usize> {
        self.data.shape().ok().map(|shape| shape.len())
    }
}

impl<T> BaseDataEntity<T> {
    /// Successor entity for a new payload produced by `transform`.
    pub fn derive<U: Payload>(
        &self,
        data: U,
        transform: &str,
    ) -> Result<BaseDataEntity<U>, InvalidEntityError> {
        if data.is_null() {
            return Err(InvalidEntityError::NullData);
        }
        Ok(self.successor(Arc::new(data), transform))
    }

    /// Successor entity sharing this entity's payload.
    pub fn derive_shared(&self, transform: &str) -> Self {
        self.successor(Arc::clone(&self.data), transform)
    }

    fn successor<U>(&self, data: Arc<U>, transform: &str) -> BaseDataEntity<U> {
        BaseDataEntity {
            data,
            schema: self.schema.clone(),
            metadata: Arc::clone(&self.metadata),
            provenance: self.provenance.as_ref().map(|p| p.with_transform(transform)),
            validation_status: None,
            identity: new_identity(),
            version: self.version.clone(),
            partition_info: self.partition_info.clone(),
            lineage_id: self.lineage_id.clone(),
            embeddings: None,
            feedback: None,
            confidence: None,
            observation_time: self.observation_time,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Shared handle to the payload.
    pub fn data_arc(&self) -> &Arc<T> {
        &self.data
    }

    pub fn schema(&self) -> Option<&DatasetSchema> {
        self.schema.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// Last attached status. May be stale relative to the payload.
    pub fn validation_status(&self) -> Option<&ValidationStatus> {
        self.validation_status.as_ref()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn partition_info(&self) -> Option<&str> {
        self.partition_info.as_deref()
    }

    pub fn lineage_id(&self) -> Option<&str> {
        self.lineage_id.as_deref()
    }

    pub fn embeddings(&self) -> Option<&Value> {
        self.embeddings.as_ref()
    }

    pub fn feedback(&self) -> Option<&Value> {
        self.feedback.as_ref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        self.observation_time
    }

    /// Copy with `extras` merged over the metadata. Identity, version, payload
    /// and schema are preserved; `self` is unchanged.
    pub fn with_updated_metadata<I, K>(&self, extras: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut metadata = Metadata::clone(&self.metadata);
        metadata.extend(extras.into_iter().map(|(k, v)| (k.into(), v)));
        Self {
            metadata: Arc::new(metadata),
            ..self.clone()
        }
    }

    pub fn with_validation_status(&self, status: ValidationStatus) -> Self {
        Self {
            validation_status: Some(status),
            ..self.clone()
        }
    }

    pub fn with_schema(&self, schema: DatasetSchema) -> Self {
        Self {
            schema: Some(Arc::new(schema)),
            validation_status: None,
            ..self.clone()
        }
    }

    /// Both entities have schemas with identical columns and targets.
    pub fn is_compatible_with<U>(&self, other: &BaseDataEntity<U>) -> bool {
        match (self.schema(), other.schema()) {
            (Some(a), Some(b)) => a.same_layout(b),
            _ => false,
        }
    }
}

impl<T> fmt::Debug for BaseDataEntity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseDataEntity")
            .field("identity", &self.identity)
            .field("version", &self.version)
            .field("lineage_id", &self.lineage_id)
            .field("has_schema", &self.schema.is_some())
            .finish_non_exhaustive()
    }
}

fn new_identity() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builder for [`BaseDataEntity`]. The payload is mandatory.
pub struct EntityBuilder<T> {
    data: Option<T>,
    schema: Option<DatasetSchema>,
    metadata: Metadata,
    provenance: Option<Provenance>,
    validation_status: Option<ValidationStatus>,
    identity: Option<String>,
    version: Option<String>,
    partition_info: Option<String>,
    lineage_id: Option<String>,
    embeddings: Option<Value>,
    feedback: Option<Value>,
    confidence: Option<f64>,
    observation_time: Option<DateTime<Utc>>,
}

impl<T> Default for EntityBuilder<T> {
    fn default() -> Self {
        Self {
            data: None,
            schema: None,
            metadata: Metadata::new(),
            provenance: None,
            validation_status: None,
            identity: None,
            version: None,
            partition_info: None,
            lineage_id: None,
            embeddings: None,
            feedback: None,
            confidence: None,
            observation_time: None,
        }
    }
}

impl<T: Payload> EntityBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn schema(mut self, schema: DatasetSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn maybe_schema(mut self, schema: Option<DatasetSchema>) -> Self {
        self.schema = schema;
        self
    }

    /// Metadata is copied into the entity; later changes to the source map are not seen.
    pub fn metadata(mut self, metadata: &Metadata) -> Self {
        self.metadata = metadata.clone();
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    pub fn validation_status(mut self, status: ValidationStatus) -> Self {
        self.validation_status = Some(status);
        self
    }

    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn partition_info(mut self, partition_info: impl Into<String>) -> Self {
        self.partition_info = Some(partition_info.into());
        self
    }

    pub fn lineage_id(mut self, lineage_id: impl Into<String>) -> Self {
        self.lineage_id = Some(lineage_id.into());
        self
    }

    pub fn embeddings(mut self, embeddings: Value) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn feedback(mut self, feedback: Value) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn observation_time(mut self, time: DateTime<Utc>) -> Self {
        self.observation_time = Some(time);
        self
    }

    pub fn build(self) -> Result<BaseDataEntity<T>, InvalidEntityError> {
        let data = self.data.ok_or(InvalidEntityError::MissingData)?;
        if data.is_null() {
            return Err(InvalidEntityError::NullData);
        }
        Ok(BaseDataEntity {
            data: Arc::new(data),
            schema: self.schema.map(Arc::new),
            metadata: Arc::new(self.metadata),
            provenance: self.provenance,
            validation_status: self.validation_status,
            identity: self.identity.unwrap_or_else(new_identity),
            version: self.version,
            partition_info: self.partition_info,
            lineage_id: self.lineage_id,
            embeddings: self.embeddings,
            feedback: self.feedback,
            confidence: self.confidence,
            observation_time: self.observation_time,
        })
    }
}
