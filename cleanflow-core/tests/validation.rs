//! Schema validation over the supported payload shapes.

use cleanflow_core::validate::NO_SCHEMA_ERROR;
use cleanflow_core::{
    BaseDataEntity, DataBatch, DatasetSchema, Payload, SchemaConstraints, StaticConfigProvider,
    ValidationPolicy, ValidationStatus,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn validate<T: Payload>(data: T, schema: DatasetSchema) -> ValidationStatus {
    BaseDataEntity::builder(data)
        .schema(schema)
        .build()
        .unwrap()
        .validate_against_schema()
}

#[test]
fn test_missing_schema_is_single_error() {
    let entity = BaseDataEntity::new(json!([{ "a": 1 }])).unwrap();
    let status = entity.validate_against_schema();
    assert!(!status.is_valid());
    assert_eq!(status.errors(), [NO_SCHEMA_ERROR]);
    assert!(status.warnings().is_empty());
    assert!(status.details().is_none());
}

#[test]
fn test_missing_feature_column() {
    let schema = DatasetSchema::new(["a", "b", "c"]).unwrap();
    let status = validate(json!([{ "a": 1, "b": 2 }]), schema);
    assert!(!status.is_valid());
    assert_eq!(
        status.details().unwrap().missing_columns,
        Some(vec!["c".to_string()])
    );
    assert_eq!(status.errors(), [r#"Missing required feature columns: ["c"]"#]);
}

#[test]
fn test_missing_target_column() {
    let schema = DatasetSchema::builder(["a", "b"])
        .targets(["y"])
        .build()
        .unwrap();
    let status = validate(json!([{ "a": 1, "b": 2 }]), schema);
    assert!(!status.is_valid());
    assert!(status.errors()[0].contains("Missing required target columns"));
    assert_eq!(
        status.details().unwrap().missing_targets,
        Some(vec!["y".to_string()])
    );
    assert!(status.details().unwrap().missing_columns.is_none());
}

#[test]
fn test_not_null_violations_counted_per_column() {
    let schema = DatasetSchema::builder(["a", "b"])
        .constraints(SchemaConstraints::new().not_null(["a", "b"]))
        .build()
        .unwrap();
    let status = validate(
        json!([{ "a": 1, "b": 2 }, { "a": null, "b": 3 }, { "a": 2, "b": null }]),
        schema,
    );
    assert!(!status.is_valid());
    let expected = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 1)]);
    assert_eq!(status.details().unwrap().not_null_violations, Some(expected));
}

#[test]
fn test_range_violations_sampled() {
    let schema = DatasetSchema::builder(["score"])
        .constraints(SchemaConstraints::new().range("score", 0.0, 10.0))
        .build()
        .unwrap();
    let status = validate(
        json!([{ "score": 5 }, { "score": 12 }, { "score": -1 }]),
        schema,
    );
    assert!(!status.is_valid());
    let samples = &status.details().unwrap().range_violations.as_ref().unwrap()["score"];
    assert!(samples.contains(&json!(12)));
    assert!(samples.contains(&json!(-1)));
    assert!(!samples.contains(&json!(5)));
}

#[test]
fn test_range_bounds_are_inclusive() {
    let schema = DatasetSchema::builder(["score"])
        .constraints(SchemaConstraints::new().range("score", 0.0, 10.0))
        .build()
        .unwrap();
    let status = validate(json!([{ "score": 0 }, { "score": 10.0 }]), schema);
    assert!(status.is_valid());
}

#[test]
fn test_range_samples_capped_at_five() {
    let schema = DatasetSchema::builder(["score"])
        .constraints(SchemaConstraints::new().range("score", 0.0, 1.0))
        .build()
        .unwrap();
    let rows: Vec<Value> = (10..30).map(|n| json!({ "score": n })).collect();
    let status = validate(Value::Array(rows), schema);
    let samples = &status.details().unwrap().range_violations.as_ref().unwrap()["score"];
    assert_eq!(samples.len(), 5);
}

#[test]
fn test_range_type_mismatch_reported_separately() {
    let schema = DatasetSchema::builder(["score"])
        .constraints(SchemaConstraints::new().range("score", 0.0, 10.0))
        .build()
        .unwrap();
    let status = validate(json!([{ "score": "high" }, { "score": 3 }]), schema);
    assert!(!status.is_valid());
    let details = status.details().unwrap();
    assert!(details.range_violations.is_none());
    assert_eq!(
        details.range_type_mismatches.as_ref().unwrap()["score"],
        vec![json!("high")]
    );
    assert!(status.errors()[0].starts_with("Range constraint type mismatches"));
}

#[test]
fn test_allowed_values_only_warn() {
    let schema = DatasetSchema::builder(["category"])
        .constraints(SchemaConstraints::new().allowed_values("category", ["A", "B", "C"]))
        .build()
        .unwrap();
    let status = validate(
        json!([{ "category": "A" }, { "category": "X" }, { "category": "Y" }, { "category": "X" }]),
        schema,
    );
    assert!(status.is_valid());
    assert_eq!(status.warnings().len(), 1);
    assert_eq!(
        status.details().unwrap().allowed_value_violations.as_ref().unwrap()["category"],
        vec![json!("X"), json!("Y")]
    );
}

#[test]
fn test_allowed_values_capped_at_five_distinct() {
    let schema = DatasetSchema::builder(["category"])
        .constraints(SchemaConstraints::new().allowed_values("category", ["A"]))
        .build()
        .unwrap();
    let rows: Vec<Value> = ["X", "X", "P", "Q", "R", "P", "S", "T", "U"]
        .iter()
        .map(|c| json!({ "category": c }))
        .collect();
    let status = validate(Value::Array(rows), schema);

    assert!(status.is_valid());
    assert_eq!(
        status.details().unwrap().allowed_value_violations.as_ref().unwrap()["category"],
        vec![json!("X"), json!("P"), json!("Q"), json!("R"), json!("S")]
    );
}

#[test]
fn test_configured_sample_limit_caps_every_sample() {
    let schema = DatasetSchema::builder(["score", "tier"])
        .constraints(
            SchemaConstraints::new()
                .range("score", 0.0, 10.0)
                .allowed_values("tier", ["gold"]),
        )
        .build()
        .unwrap();
    let entity = BaseDataEntity::builder(json!([
        { "score": 11, "tier": "iron" },
        { "score": 12, "tier": "tin" },
        { "score": 13, "tier": "lead" }
    ]))
    .schema(schema)
    .build()
    .unwrap();
    let provider = StaticConfigProvider::new(json!({ "validation": { "sample_limit": 2 } }));
    let status = entity.validate_with(&ValidationPolicy::from_provider(&provider));

    let details = status.details().unwrap();
    assert_eq!(
        details.range_violations.as_ref().unwrap()["score"],
        vec![json!(11), json!(12)]
    );
    assert_eq!(
        details.allowed_value_violations.as_ref().unwrap()["tier"],
        vec![json!("iron"), json!("tin")]
    );
}

#[test]
fn test_zero_sample_limit_still_reports_findings() {
    let schema = DatasetSchema::builder(["score", "tier"])
        .constraints(
            SchemaConstraints::new()
                .range("score", 0.0, 10.0)
                .allowed_values("tier", ["gold"]),
        )
        .build()
        .unwrap();
    let entity = BaseDataEntity::builder(json!([
        { "score": 99, "tier": "gold" },
        { "score": "high", "tier": "iron" }
    ]))
    .schema(schema)
    .build()
    .unwrap();
    let provider = StaticConfigProvider::new(json!({ "validation": { "sample_limit": 0 } }));
    let status = entity.validate_with(&ValidationPolicy::from_provider(&provider));

    assert!(!status.is_valid());
    assert_eq!(
        status.errors(),
        [
            r#"Range constraint violations: {"score":[]}"#,
            r#"Range constraint type mismatches: {"score":[]}"#
        ]
    );
    assert_eq!(status.warnings(), [r#"Allowed-values deviations: {"tier":[]}"#]);
    let details = status.details().unwrap();
    assert_eq!(details.range_violations.as_ref().unwrap()["score"], Vec::<Value>::new());
    assert!(details.range_type_mismatches.is_some());
    assert!(details.allowed_value_violations.is_some());
}

#[test]
fn test_missing_rate_and_high_rate_warning() {
    let schema = DatasetSchema::new(["a", "b"]).unwrap();
    let status = validate(
        json!([{ "a": 1, "b": null }, { "a": null, "b": null }, { "a": 1, "b": 1 }]),
        schema,
    );
    assert!(status.is_valid());
    let rates = status.details().unwrap().missing_rate.as_ref().unwrap();
    assert!((rates["a"] - 1.0 / 3.0).abs() < 1e-12);
    assert!((rates["b"] - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(
        status.warnings(),
        [r#"High missing rate (>50%) in columns: ["b"]"#]
    );
}

#[test]
fn test_zero_rows_skips_missing_rate() {
    let schema = DatasetSchema::new(["a"]).unwrap();
    let status = validate(json!([]), schema);
    assert!(!status.is_valid());
    let details = status.details().unwrap();
    assert!(details.missing_rate.is_none());
    assert_eq!(details.missing_columns, Some(vec!["a".to_string()]));
}

#[test]
fn test_constraints_on_unknown_columns_are_silent() {
    let schema = DatasetSchema::builder(["a"])
        .constraints(
            SchemaConstraints::new()
                .not_null(["zzz"])
                .range("zzz", 0.0, 1.0)
                .allowed_values("zzz", ["q"]),
        )
        .build()
        .unwrap();
    let status = validate(json!([{ "a": 1 }]), schema);
    assert!(status.is_valid());
    assert!(status.warnings().is_empty());
}

#[test]
fn test_single_record_payload() {
    let schema = DatasetSchema::new(["a", "b"]).unwrap();
    let status = validate(json!({ "a": 1, "b": 2 }), schema);
    assert!(status.is_valid());
    let rates = status.details().unwrap().missing_rate.as_ref().unwrap();
    assert_eq!(rates["a"], 0.0);
}

#[test]
fn test_positional_rows_pair_with_schema_columns() {
    let schema = DatasetSchema::builder(["a", "b"])
        .constraints(SchemaConstraints::new().not_null(["b"]))
        .build()
        .unwrap();
    let status = validate(json!([[1, 2], [3, null]]), schema);
    assert!(!status.is_valid());
    assert_eq!(
        status.details().unwrap().not_null_violations,
        Some(BTreeMap::from([("b".to_string(), 1)]))
    );
}

#[test]
fn test_scalar_rows_wrapped_under_value_column() {
    let schema = DatasetSchema::builder(["value"])
        .constraints(SchemaConstraints::new().range("value", 0.0, 1.0))
        .build()
        .unwrap();
    let status = validate(json!([0.2, 0.5, 3]), schema);
    assert_eq!(
        status.details().unwrap().range_violations.as_ref().unwrap()["value"],
        vec![json!(3)]
    );
}

#[test]
fn test_tabular_payload() {
    let schema = DatasetSchema::builder(["a", "b"])
        .constraints(SchemaConstraints::new().not_null(["a"]))
        .build()
        .unwrap();
    let batch = DataBatch::new(
        vec!["a".into(), "b".into()],
        vec![vec![json!(1), json!("x")], vec![Value::Null, json!("y")]],
    );
    let status = validate(batch, schema);
    assert!(!status.is_valid());
    assert_eq!(
        status.details().unwrap().not_null_violations,
        Some(BTreeMap::from([("a".to_string(), 1)]))
    );
}

#[test]
fn test_ragged_table_is_extraction_failure() {
    let schema = DatasetSchema::new(["a", "b"]).unwrap();
    let batch = DataBatch::new(vec!["a".into(), "b".into()], vec![vec![json!(1)]]);
    let status = validate(batch, schema);
    assert!(!status.is_valid());
    assert_eq!(status.errors().len(), 1);
    assert!(status.errors()[0].starts_with("Failed to extract rows from payload"));
    assert!(status.details().is_none());
}

#[test]
fn test_scalar_payload_is_extraction_failure() {
    let schema = DatasetSchema::new(["a"]).unwrap();
    let status = validate(json!(42), schema);
    assert!(!status.is_valid());
    assert!(status.errors()[0].starts_with("Failed to extract rows from payload"));
}

#[test]
fn test_validation_is_idempotent() {
    let schema = DatasetSchema::builder(["a", "b"])
        .targets(["y"])
        .constraints(SchemaConstraints::new().not_null(["a"]).range("b", 0.0, 1.0))
        .build()
        .unwrap();
    let entity = BaseDataEntity::builder(json!([{ "a": null, "b": 4 }, { "a": 1, "b": 0.5 }]))
        .schema(schema)
        .build()
        .unwrap();
    assert_eq!(entity.validate_against_schema(), entity.validate_against_schema());
}

#[test]
fn test_custom_policy_threshold() {
    let schema = DatasetSchema::new(["a"]).unwrap();
    let entity = BaseDataEntity::builder(json!([{ "a": null }, { "a": 1 }, { "a": 1 }]))
        .schema(schema)
        .build()
        .unwrap();
    assert!(entity.validate_against_schema().warnings().is_empty());

    let strict = ValidationPolicy {
        high_missing_rate: 0.25,
        ..ValidationPolicy::default()
    };
    let status = entity.validate_with(&strict);
    assert_eq!(
        status.warnings(),
        [r#"High missing rate (>25%) in columns: ["a"]"#]
    );
}
