//! Stage-specific entities.
//!
//! Each pipeline position gets its own nominal type so that wiring a stage to
//! the wrong input is a type error. They add no behavior to [`BaseDataEntity`].

use super::{BaseDataEntity, Payload};
use crate::error::InvalidEntityError;
use crate::validate::ValidationStatus;
use serde_json::Value;
use std::fmt;
use std::ops::Deref;

macro_rules! stage_entity {
    ($(#[$doc:meta])* $name:ident, $stage:literal) => {
        $(#[$doc])*
        pub struct $name<T>(BaseDataEntity<T>);

        impl<T> $name<T> {
            /// Pipeline position name, used in logs and provenance trails.
            pub const STAGE: &'static str = $stage;

            pub fn entity(&self) -> &BaseDataEntity<T> {
                &self.0
            }

            pub fn into_inner(self) -> BaseDataEntity<T> {
                self.0
            }

            pub fn with_updated_metadata<I, K>(&self, extras: I) -> Self
            where
                I: IntoIterator<Item = (K, Value)>,
                K: Into<String>,
            {
                Self(self.0.with_updated_metadata(extras))
            }

            pub fn with_validation_status(&self, status: ValidationStatus) -> Self {
                Self(self.0.with_validation_status(status))
            }
        }

        impl<T: Payload> $name<T> {
            pub fn new(data: T) -> Result<Self, InvalidEntityError> {
                BaseDataEntity::new(data).map(Self)
            }

            pub fn validated(&self) -> Self {
                Self(self.0.validated())
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<T> Deref for $name<T> {
            type Target = BaseDataEntity<T>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> From<BaseDataEntity<T>> for $name<T> {
            fn from(entity: BaseDataEntity<T>) -> Self {
                Self(entity)
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    };
}

stage_entity!(
    /// Data as delivered by a loader.
    RawData,
    "raw"
);
stage_entity!(
    /// Output of a cleaner.
    CleanedData,
    "cleaned"
);
stage_entity!(
    /// Output of a feature/record selector.
    SelectedData,
    "selected"
);
stage_entity!(
    /// Model-ready input produced by the forward adapter.
    ModelInputData,
    "model_input"
);
stage_entity!(
    /// Raw model output.
    ModelOutputData,
    "model_output"
);
stage_entity!(
    /// Model output mapped back to domain terms by the inverse adapter.
    PredictedData,
    "predicted"
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_wrapper_derefs_to_entity() {
        let raw = RawData::new(json!([{ "a": 1 }])).unwrap();
        assert_eq!(raw.row_count(), Some(1));
        assert_eq!(RawData::<Value>::STAGE, "raw");
    }

    #[test]
    fn test_stage_conversion_keeps_entity() {
        let raw = RawData::new(json!([1])).unwrap();
        let identity = raw.identity().to_string();
        let cleaned = CleanedData::from(raw.into_inner());
        assert_eq!(cleaned.identity(), identity);
    }

    #[test]
    fn test_metadata_update_keeps_stage_type() {
        let selected = SelectedData::new(json!([])).unwrap();
        let tagged: SelectedData<Value> = selected.with_updated_metadata([("k", json!(1))]);
        assert_eq!(tagged.metadata()["k"], json!(1));
        assert!(selected.metadata().is_empty());
    }
}
