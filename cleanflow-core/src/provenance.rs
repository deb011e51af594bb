//! Origin and transform trail of a data artifact.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a payload came from and which transforms it has been through.
///
/// The transform trail is append-only: [`with_transform`](Self::with_transform)
/// returns an extended copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    source: String,
    extraction_time: DateTime<Utc>,
    #[serde(default)]
    transforms: Vec<String>,
}

impl Provenance {
    pub fn new(source: impl Into<String>, extraction_time: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            extraction_time,
            transforms: Vec::new(),
        }
    }

    /// Provenance captured now.
    pub fn now(source: impl Into<String>) -> Self {
        Self::new(source, Utc::now())
    }

    /// Timestamp carrying an offset, normalized to UTC.
    pub fn with_offset_time(source: impl Into<String>, time: DateTime<FixedOffset>) -> Self {
        Self::new(source, time.with_timezone(&Utc))
    }

    /// Naive timestamp, assumed to already be UTC.
    pub fn with_naive_time(source: impl Into<String>, time: NaiveDateTime) -> Self {
        Self::new(source, time.and_utc())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn extraction_time(&self) -> DateTime<Utc> {
        self.extraction_time
    }

    pub fn transforms(&self) -> &[String] {
        &self.transforms
    }

    pub fn with_transform(&self, transform: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.transforms.push(transform.into());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_offset_time_normalized_to_utc() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let p = Provenance::with_offset_time("bcb", local);
        assert_eq!(
            p.extraction_time(),
            Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_naive_time_assumed_utc() {
        let naive = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let p = Provenance::with_naive_time("yfinance", naive);
        assert_eq!(p.extraction_time().naive_utc(), naive);
    }

    #[test]
    fn test_transform_trail_is_append_only() {
        let p = Provenance::now("unit_test");
        let cleaned = p.with_transform("clean");
        let selected = cleaned.with_transform("select");
        assert!(p.transforms().is_empty());
        assert_eq!(cleaned.transforms(), ["clean"]);
        assert_eq!(selected.transforms(), ["clean", "select"]);
        assert_eq!(selected.source(), "unit_test");
    }
}
