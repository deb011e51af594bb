//! Schema validation engine.
//!
//! Validation is an inspection: every finding, including a payload that cannot
//! be read as rows, is returned inside a [`ValidationStatus`] and never raised.

use crate::config::ConfigProvider;
use crate::entity::{BaseDataEntity, Payload, RowView};
use crate::schema::{DatasetSchema, SchemaConstraints};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error reported when an entity has no schema.
pub const NO_SCHEMA_ERROR: &str = "No schema provided.";

/// Outcome of one validation call. `is_valid` holds iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatusSpec")]
pub struct ValidationStatus {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationDetails>,
}

impl ValidationStatus {
    pub fn new(
        errors: Vec<String>,
        warnings: Vec<String>,
        details: Option<ValidationDetails>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            details: details.filter(|d| !d.is_empty()),
        }
    }

    /// A status with a single blocking error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new(), None)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Structured diagnostics; `None` when nothing was recorded.
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }
}

#[derive(Deserialize)]
struct StatusSpec {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    details: Option<ValidationDetails>,
}

impl From<StatusSpec> for ValidationStatus {
    fn from(spec: StatusSpec) -> Self {
        Self::new(spec.errors, spec.warnings, spec.details)
    }
}

/// Diagnostics recorded by validation, keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_targets: Option<Vec<String>>,
    /// Column → number of null rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_null_violations: Option<BTreeMap<String, usize>>,
    /// Column → sampled out-of-range values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_violations: Option<BTreeMap<String, Vec<Value>>>,
    /// Column → sampled values that cannot be compared with numeric bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_type_mismatches: Option<BTreeMap<String, Vec<Value>>>,
    /// Column → distinct sampled values outside the allowed set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_value_violations: Option<BTreeMap<String, Vec<Value>>>,
    /// Column → null rows / total rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_rate: Option<BTreeMap<String, f64>>,
}

impl ValidationDetails {
    pub fn is_empty(&self) -> bool {
        self.missing_columns.is_none()
            && self.missing_targets.is_none()
            && self.not_null_violations.is_none()
            && self.range_violations.is_none()
            && self.range_type_mismatches.is_none()
            && self.allowed_value_violations.is_none()
            && self.missing_rate.is_none()
    }
}

/// Tunable thresholds for validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Missing rate above which a column is flagged with a warning.
    #[serde(default = "default_high_missing_rate")]
    pub high_missing_rate: f64,
    /// Maximum offending values kept per column.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            high_missing_rate: default_high_missing_rate(),
            sample_limit: default_sample_limit(),
        }
    }
}

fn default_high_missing_rate() -> f64 {
    0.5
}

fn default_sample_limit() -> usize {
    5
}

impl ValidationPolicy {
    /// Read `validation.high_missing_rate` and `validation.sample_limit`.
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        let defaults = Self::default();
        let high_missing_rate = provider
            .get(
                "validation.high_missing_rate",
                Value::from(defaults.high_missing_rate),
            )
            .as_f64()
            .unwrap_or(defaults.high_missing_rate);
        let sample_limit = provider
            .get("validation.sample_limit", Value::from(defaults.sample_limit))
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(defaults.sample_limit);
        Self {
            high_missing_rate,
            sample_limit,
        }
    }
}

/// Contract for anything that can judge an entity.
pub trait DataValidator<T: Payload>: Send + Sync {
    fn validate(&self, entity: &BaseDataEntity<T>) -> ValidationStatus;
}

/// Validator that runs the schema engine with a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    policy: ValidationPolicy,
}

impl SchemaValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

impl<T: Payload> DataValidator<T> for SchemaValidator {
    fn validate(&self, entity: &BaseDataEntity<T>) -> ValidationStatus {
        entity.validate_with(&self.policy)
    }
}

/// Validate `data` against `schema`.
pub fn validate_payload<T: Payload + ?Sized>(
    data: &T,
    schema: Option<&DatasetSchema>,
    policy: &ValidationPolicy,
) -> ValidationStatus {
    let Some(schema) = schema else {
        return ValidationStatus::failed(NO_SCHEMA_ERROR);
    };

    let rows = match data.shape().and_then(|shape| shape.rows(schema.columns())) {
        Ok(rows) => rows,
        Err(e) => {
            return ValidationStatus::failed(format!("Failed to extract rows from payload: {e}"));
        }
    };

    let mut check = Checker {
        rows: &rows,
        policy,
        errors: Vec::new(),
        warnings: Vec::new(),
        details: ValidationDetails::default(),
    };

    check.columns_present(schema);
    check.targets_present(schema);
    if let Some(constraints) = schema.constraints() {
        check.not_null(&constraints.not_null);
        check.ranges(constraints);
        check.allowed_values(constraints);
    }
    check.missing_rates(schema);

    ValidationStatus::new(check.errors, check.warnings, Some(check.details))
}

struct Checker<'r, 'a> {
    rows: &'r [RowView<'a>],
    policy: &'r ValidationPolicy,
    errors: Vec<String>,
    warnings: Vec<String>,
    details: ValidationDetails,
}

impl Checker<'_, '_> {
    fn present(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains(column))
    }

    fn null_count(&self, column: &str) -> usize {
        self.rows.iter().filter(|row| row.is_null(column)).count()
    }

    fn absent(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| !self.present(c))
            .cloned()
            .collect()
    }

    fn columns_present(&mut self, schema: &DatasetSchema) {
        let missing = self.absent(schema.columns());
        if !missing.is_empty() {
            self.errors.push(format!(
                "Missing required feature columns: {}",
                render(&missing)
            ));
            self.details.missing_columns = Some(missing);
        }
    }

    fn targets_present(&mut self, schema: &DatasetSchema) {
        if !schema.has_targets() {
            return;
        }
        let missing = self.absent(schema.targets());
        if !missing.is_empty() {
            self.errors.push(format!(
                "Missing required target columns: {}",
                render(&missing)
            ));
            self.details.missing_targets = Some(missing);
        }
    }

    fn not_null(&mut self, columns: &[String]) {
        let violations: BTreeMap<String, usize> = columns
            .iter()
            .filter(|c| self.present(c))
            .map(|c| (c.clone(), self.null_count(c)))
            .filter(|(_, count)| *count > 0)
            .collect();
        if !violations.is_empty() {
            self.errors.push(format!(
                "Not-null constraint violations: {}",
                render(&violations)
            ));
            self.details.not_null_violations = Some(violations);
        }
    }

    fn ranges(&mut self, constraints: &SchemaConstraints) {
        let limit = self.policy.sample_limit;
        let mut violations = BTreeMap::new();
        let mut mismatches = BTreeMap::new();

        for (column, bound) in &constraints.range {
            let mut out_of_range = Samples::new(limit);
            let mut incomparable = Samples::new(limit);
            for value in self.non_null_values(column) {
                match value.as_f64() {
                    Some(n) if !bound.contains(n) => out_of_range.record(value),
                    Some(_) => {}
                    None => incomparable.record(value),
                }
            }
            if let Some(samples) = out_of_range.finish() {
                violations.insert(column.clone(), samples);
            }
            if let Some(samples) = incomparable.finish() {
                mismatches.insert(column.clone(), samples);
            }
        }

        if !violations.is_empty() {
            self.errors.push(format!(
                "Range constraint violations: {}",
                render(&violations)
            ));
            self.details.range_violations = Some(violations);
        }
        if !mismatches.is_empty() {
            self.errors.push(format!(
                "Range constraint type mismatches: {}",
                render(&mismatches)
            ));
            self.details.range_type_mismatches = Some(mismatches);
        }
    }

    fn allowed_values(&mut self, constraints: &SchemaConstraints) {
        let limit = self.policy.sample_limit;
        let mut deviations = BTreeMap::new();

        for (column, allowed) in &constraints.allowed_values {
            let mut unexpected = Samples::new(limit);
            for value in self.non_null_values(column) {
                if !allowed.iter().any(|a| same_value(a, value)) {
                    unexpected.record_distinct(value);
                }
            }
            if let Some(samples) = unexpected.finish() {
                deviations.insert(column.clone(), samples);
            }
        }

        if !deviations.is_empty() {
            self.warnings.push(format!(
                "Allowed-values deviations: {}",
                render(&deviations)
            ));
            self.details.allowed_value_violations = Some(deviations);
        }
    }

    fn missing_rates(&mut self, schema: &DatasetSchema) {
        if self.rows.is_empty() {
            return;
        }
        let total = self.rows.len() as f64;
        let mut rates = BTreeMap::new();
        let mut high = Vec::new();

        for column in schema.all_columns() {
            if !self.present(column) {
                continue;
            }
            let rate = self.null_count(column) as f64 / total;
            if rate > self.policy.high_missing_rate {
                high.push(column.to_string());
            }
            rates.insert(column.to_string(), rate);
        }

        if !high.is_empty() {
            self.warnings.push(format!(
                "High missing rate (>{}%) in columns: {}",
                self.policy.high_missing_rate * 100.0,
                render(&high)
            ));
        }
        if !rates.is_empty() {
            self.details.missing_rate = Some(rates);
        }
    }

    fn non_null_values<'s>(&'s self, column: &'s str) -> impl Iterator<Item = &'s Value> + 's {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column))
            .filter(|v| !v.is_null())
    }
}

/// Offending values for one column: every hit is counted, at most `limit`
/// are kept.
struct Samples {
    limit: usize,
    hits: usize,
    kept: Vec<Value>,
}

impl Samples {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            hits: 0,
            kept: Vec::new(),
        }
    }

    fn record(&mut self, value: &Value) {
        self.hits += 1;
        if self.kept.len() < self.limit {
            self.kept.push(value.clone());
        }
    }

    fn record_distinct(&mut self, value: &Value) {
        self.hits += 1;
        if self.kept.len() < self.limit && !self.kept.iter().any(|k| same_value(k, value)) {
            self.kept.push(value.clone());
        }
    }

    /// The kept sample, or `None` when nothing offended. The sample may be
    /// empty with a zero limit; the finding still stands.
    fn finish(self) -> Option<Vec<Value>> {
        (self.hits > 0).then_some(self.kept)
    }
}

/// JSON equality, except that numbers compare by numeric value.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfigProvider;
    use serde_json::json;

    #[test]
    fn test_is_valid_tracks_errors() {
        assert!(ValidationStatus::new(vec![], vec!["w".into()], None).is_valid());
        assert!(!ValidationStatus::failed("boom").is_valid());
    }

    #[test]
    fn test_empty_details_dropped() {
        let status = ValidationStatus::new(vec![], vec![], Some(ValidationDetails::default()));
        assert!(status.details().is_none());
    }

    #[test]
    fn test_deserialize_recomputes_validity() {
        let status: ValidationStatus =
            serde_json::from_value(json!({ "is_valid": true, "errors": ["x"] })).unwrap();
        assert!(!status.is_valid());
    }

    #[test]
    fn test_same_value_compares_numbers_numerically() {
        assert!(same_value(&json!(1), &json!(1.0)));
        assert!(!same_value(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_policy_from_provider() {
        let provider = StaticConfigProvider::new(json!({
            "validation": { "high_missing_rate": 0.2, "sample_limit": 2 }
        }));
        let policy = ValidationPolicy::from_provider(&provider);
        assert_eq!(policy.high_missing_rate, 0.2);
        assert_eq!(policy.sample_limit, 2);
    }

    #[test]
    fn test_samples_count_hits_beyond_limit() {
        let mut none_kept = Samples::new(0);
        none_kept.record(&json!(99));
        assert_eq!(none_kept.finish(), Some(vec![]));

        let mut distinct = Samples::new(2);
        for v in [json!(1), json!(1.0), json!("a"), json!("b")] {
            distinct.record_distinct(&v);
        }
        assert_eq!(distinct.finish(), Some(vec![json!(1), json!("a")]));

        assert_eq!(Samples::new(5).finish(), None);
    }

    #[test]
    fn test_policy_defaults_when_keys_absent() {
        let provider = StaticConfigProvider::new(json!({ "other": 1 }));
        assert_eq!(
            ValidationPolicy::from_provider(&provider),
            ValidationPolicy::default()
        );
    }
}
