//! Entity construction, immutability and stage transitions.

use chrono::{FixedOffset, TimeZone, Utc};
use cleanflow_core::{
    BaseDataEntity, CleanedData, DatasetSchema, InvalidEntityError, Metadata, Provenance,
    RawData,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

fn schema() -> DatasetSchema {
    DatasetSchema::builder(["a", "b"])
        .targets(["y"])
        .build()
        .unwrap()
}

#[test]
fn test_null_payload_rejected() {
    let err = BaseDataEntity::new(Value::Null).unwrap_err();
    assert_eq!(err, InvalidEntityError::NullData);
    assert_eq!(err.to_string(), "data cannot be None or null");
}

#[test]
fn test_full_construction() {
    let observed = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let entity = BaseDataEntity::builder(json!([{ "a": 1, "b": 2, "y": 0 }]))
        .schema(schema())
        .meta("origin", "unit")
        .provenance(Provenance::new("warehouse.table", observed))
        .identity("entity-1")
        .version("v2")
        .partition_info("2024-03")
        .lineage_id("lineage-9")
        .embeddings(json!([0.1, 0.2]))
        .feedback(json!({ "label": "ok" }))
        .confidence(0.9)
        .observation_time(observed)
        .build()
        .unwrap();

    assert_eq!(entity.identity(), "entity-1");
    assert_eq!(entity.version(), Some("v2"));
    assert_eq!(entity.partition_info(), Some("2024-03"));
    assert_eq!(entity.lineage_id(), Some("lineage-9"));
    assert_eq!(entity.confidence(), Some(0.9));
    assert_eq!(entity.observation_time(), Some(observed));
    assert_eq!(entity.metadata()["origin"], json!("unit"));
    assert_eq!(entity.provenance().unwrap().source(), "warehouse.table");
    assert_eq!(entity.row_count(), Some(1));
    assert!(entity.validation_status().is_none());
}

#[test]
fn test_identity_is_unique_per_instance() {
    let a = BaseDataEntity::new(json!([1])).unwrap();
    let b = BaseDataEntity::new(json!([1])).unwrap();
    assert_ne!(a.identity(), b.identity());
}

#[test]
fn test_metadata_is_copied_at_construction() {
    let mut source = Metadata::new();
    source.insert("k".into(), json!(1));
    let entity = BaseDataEntity::builder(json!([]))
        .metadata(&source)
        .build()
        .unwrap();
    source.insert("k".into(), json!(2));
    assert_eq!(entity.metadata()["k"], json!(1));
}

#[test]
fn test_with_updated_metadata_leaves_original_untouched() {
    let original = BaseDataEntity::builder(json!([{ "a": 1 }]))
        .schema(schema())
        .meta("stage", "raw")
        .version("v1")
        .build()
        .unwrap();
    let updated = original.with_updated_metadata([("stage", json!("cleaned")), ("rows", json!(1))]);

    assert_eq!(updated.identity(), original.identity());
    assert_eq!(updated.version(), original.version());
    assert!(Arc::ptr_eq(updated.data_arc(), original.data_arc()));
    assert_eq!(updated.schema(), original.schema());
    assert_eq!(updated.metadata()["stage"], json!("cleaned"));
    assert_eq!(updated.metadata()["rows"], json!(1));
    assert_eq!(original.metadata()["stage"], json!("raw"));
    assert!(!original.metadata().contains_key("rows"));
}

#[test]
fn test_compatibility_requires_same_layout() {
    let a = BaseDataEntity::builder(json!([])).schema(schema()).build().unwrap();
    let b = BaseDataEntity::builder(json!({})).schema(schema()).build().unwrap();
    let other = BaseDataEntity::builder(json!([]))
        .schema(DatasetSchema::new(["a", "b"]).unwrap())
        .build()
        .unwrap();
    let bare = BaseDataEntity::new(json!([])).unwrap();

    assert!(a.is_compatible_with(&b));
    assert!(!a.is_compatible_with(&other));
    assert!(!a.is_compatible_with(&bare));
    assert!(!bare.is_compatible_with(&bare));
}

#[test]
fn test_validated_attaches_fresh_status() {
    let entity = BaseDataEntity::builder(json!([{ "a": 1 }]))
        .schema(schema())
        .build()
        .unwrap();
    let checked = entity.validated();
    assert!(entity.validation_status().is_none());
    assert_eq!(
        checked.validation_status(),
        Some(&entity.validate_against_schema())
    );
    assert_eq!(checked.identity(), entity.identity());
}

#[test]
fn test_derive_extends_provenance_and_shares_context() {
    let raw = RawData::from(
        BaseDataEntity::builder(json!([{ "a": 1 }, { "a": null }]))
            .schema(schema())
            .provenance(Provenance::now("csv"))
            .lineage_id("run-1")
            .build()
            .unwrap(),
    )
    .validated();

    let next = raw.derive(json!([{ "a": 1 }]), "cleaner:drop_nulls").unwrap();
    let cleaned = CleanedData::from(next);

    assert_ne!(cleaned.identity(), raw.identity());
    assert_eq!(cleaned.lineage_id(), Some("run-1"));
    assert_eq!(cleaned.schema(), raw.schema());
    assert!(cleaned.validation_status().is_none());
    assert_eq!(
        cleaned.provenance().unwrap().transforms(),
        ["cleaner:drop_nulls"]
    );
    assert!(raw.provenance().unwrap().transforms().is_empty());

    assert_eq!(
        raw.derive(Value::Null, "noop").unwrap_err(),
        InvalidEntityError::NullData
    );
}

#[test]
fn test_provenance_time_normalized_to_utc() {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let local = offset.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let provenance = Provenance::with_offset_time("api", local);
    assert_eq!(
        provenance.extraction_time(),
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    );
}

#[test]
fn test_schema_deserializes_from_json() {
    let parsed: DatasetSchema = serde_json::from_value(json!({
        "columns": ["a", "b"],
        "targets": ["y"]
    }))
    .unwrap();
    assert_eq!(parsed, schema());
}
