//! Shapes a raw metrics document into the metric sequence of one district.
//!
//! The metrics file is loosely shaped: either an array with one record per district or a
//! single district record. [`normalize`] always returns a well-formed [`DistrictMetrics`];
//! absent data becomes an empty sequence.

use crate::model::DistrictMetrics;
use serde::Deserialize;
use serde_json::{Map, Value};

const DISTRICT_ID_FIELD: &str = "districtId";

/// What to do with a single-object document whose `districtId` names another district.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Only a matching `districtId` yields metrics.
    #[default]
    Strict,
    /// Adopt the object's metrics for the requested district regardless of its id.
    AdoptMetrics,
}

/// The shapes a metrics document can take.
#[derive(Debug)]
pub enum RawShape<'a> {
    /// One record per district.
    Records(&'a [Value]),
    /// A single district record.
    Single(&'a Map<String, Value>),
    /// Null, a scalar, or anything else without usable records.
    Other,
}

impl<'a> RawShape<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Array(items) => Self::Records(items),
            Value::Object(map) => Self::Single(map),
            _ => Self::Other,
        }
    }
}

pub fn normalize(
    raw: &Value,
    district_id: Option<&str>,
    policy: MismatchPolicy,
) -> DistrictMetrics {
    let Some(district_id) = district_id.filter(|id| !id.is_empty()) else {
        return DistrictMetrics::empty(None);
    };

    match RawShape::classify(raw) {
        RawShape::Records(items) => items
            .iter()
            .find(|item| field_matches(item, district_id))
            .map_or_else(
                || DistrictMetrics::empty(Some(district_id)),
                |found| decode_record(found, district_id),
            ),
        RawShape::Single(_) => {
            if field_matches(raw, district_id) {
                return decode_record(raw, district_id);
            }
            match policy {
                MismatchPolicy::Strict => DistrictMetrics::empty(Some(district_id)),
                MismatchPolicy::AdoptMetrics => adopt_metrics(raw, district_id),
            }
        }
        RawShape::Other => DistrictMetrics::empty(Some(district_id)),
    }
}

fn field_matches(item: &Value, district_id: &str) -> bool {
    item.get(DISTRICT_ID_FIELD).and_then(Value::as_str) == Some(district_id)
}

fn decode_record(value: &Value, district_id: &str) -> DistrictMetrics {
    match DistrictMetrics::deserialize(value) {
        Ok(metrics) => metrics,
        Err(err) => {
            log::warn!("metrics record for {district_id} is malformed: {err}");
            DistrictMetrics::empty(Some(district_id))
        }
    }
}

fn adopt_metrics(raw: &Value, district_id: &str) -> DistrictMetrics {
    DistrictMetrics {
        district_id: Some(district_id.to_string()),
        ..decode_record(raw, district_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_array() -> Value {
        json!([
            {
                "districtId": "MH-PUNE",
                "metrics": [
                    {"month": 8, "year": 2025, "person_days": 1000, "wages_paid": 250_000, "pending": 5000},
                    {"month": 9, "year": 2025, "person_days": 1200, "wages_paid": 300_000, "pending": 4000}
                ],
                "last_updated": "2025-10-01T09:30:00Z"
            },
            {
                "districtId": "MH-PUNE",
                "metrics": [],
                "last_updated": null
            },
            {
                "districtId": "UP-LKO",
                "metrics": [{"month": 9, "year": 2025, "person_days": 800, "wages_paid": 150_000, "pending": 0}],
                "last_updated": null
            }
        ])
    }

    #[test]
    fn empty_id_short_circuits() {
        let raw = sample_array();
        for id in [None, Some("")] {
            let result = normalize(&raw, id, MismatchPolicy::AdoptMetrics);
            assert_eq!(result, DistrictMetrics::empty(None));
        }
    }

    #[test]
    fn first_match_wins_in_arrays() {
        let result = normalize(&sample_array(), Some("MH-PUNE"), MismatchPolicy::Strict);
        assert_eq!(result.metrics.len(), 2);
        assert_eq!(result.metrics[1].person_days, 1200.0);
        assert_eq!(result.last_updated.as_deref(), Some("2025-10-01T09:30:00Z"));
    }

    #[test]
    fn unknown_id_in_array_is_empty() {
        let result = normalize(&sample_array(), Some("KA-BLR"), MismatchPolicy::Strict);
        assert_eq!(result, DistrictMetrics::empty(Some("KA-BLR")));
    }

    #[test]
    fn matching_single_object_is_returned_as_is() {
        let raw = json!({
            "districtId": "UP-LKO",
            "metrics": [{"month": 1, "year": 2025, "person_days": 10, "wages_paid": 20, "pending": 30}],
            "last_updated": "2025-02-01T00:00:00Z"
        });
        let result = normalize(&raw, Some("UP-LKO"), MismatchPolicy::Strict);
        let expected: DistrictMetrics = serde_json::from_value(raw).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn mismatched_single_object_depends_on_policy() {
        let raw = json!({
            "districtId": "UP-LKO",
            "metrics": [{"month": 1, "year": 2025, "person_days": 10, "wages_paid": 20, "pending": 30}],
            "last_updated": "2025-02-01T00:00:00Z"
        });

        let strict = normalize(&raw, Some("MH-PUNE"), MismatchPolicy::Strict);
        assert_eq!(strict, DistrictMetrics::empty(Some("MH-PUNE")));

        let adopted = normalize(&raw, Some("MH-PUNE"), MismatchPolicy::AdoptMetrics);
        assert_eq!(adopted.district_id.as_deref(), Some("MH-PUNE"));
        assert_eq!(adopted.metrics.len(), 1);
        assert_eq!(adopted.last_updated.as_deref(), Some("2025-02-01T00:00:00Z"));
    }

    #[test]
    fn adopting_object_without_metrics_gives_empty_sequence() {
        let raw = json!({"note": "no data yet"});
        let adopted = normalize(&raw, Some("MH-PUNE"), MismatchPolicy::AdoptMetrics);
        assert_eq!(adopted, DistrictMetrics::empty(Some("MH-PUNE")));
    }

    #[test]
    fn scalars_and_null_are_empty() {
        for raw in [Value::Null, json!(42), json!("metrics"), json!(true)] {
            let result = normalize(&raw, Some("MH-PUNE"), MismatchPolicy::AdoptMetrics);
            assert_eq!(result, DistrictMetrics::empty(Some("MH-PUNE")));
        }
    }

    #[test]
    fn unusable_metrics_field_reads_as_empty() {
        let raw = json!([{"districtId": "MH-PUNE", "metrics": "oops"}]);
        let result = normalize(&raw, Some("MH-PUNE"), MismatchPolicy::Strict);
        assert_eq!(result, DistrictMetrics::empty(Some("MH-PUNE")));
    }

    #[test]
    fn null_metrics_keep_last_updated() {
        let raw = json!([{"districtId": "A", "last_updated": "x", "metrics": null}]);
        let result = normalize(&raw, Some("A"), MismatchPolicy::Strict);
        assert_eq!(result.district_id.as_deref(), Some("A"));
        assert!(result.metrics.is_empty());
        assert_eq!(result.last_updated.as_deref(), Some("x"));
    }

    #[test]
    fn float_month_keeps_the_district() {
        let raw = json!([{
            "districtId": "A",
            "metrics": [
                {"month": 8, "year": 2025, "person_days": 100},
                {"month": 9.0, "year": 2025.0, "person_days": 120}
            ]
        }]);
        let result = normalize(&raw, Some("A"), MismatchPolicy::Strict);
        let months: Vec<u32> = result.metrics.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![8, 9]);
        assert_eq!(result.metrics[1].year, 2025);
    }

    #[test]
    fn numeric_string_amounts_are_read() {
        let raw = json!({
            "districtId": "A",
            "metrics": [{"month": 9, "year": 2025, "person_days": "100", "wages_paid": "2500", "pending": "n/a"}]
        });
        let result = normalize(&raw, Some("A"), MismatchPolicy::Strict);
        assert_eq!(result.metrics.len(), 1);
        assert_eq!(result.metrics[0].person_days, 100.0);
        assert_eq!(result.metrics[0].wages_paid, 2500.0);
        assert_eq!(result.metrics[0].pending, 0.0);
    }

    #[test]
    fn adopted_null_metrics_match_matching_branch() {
        let raw = json!({"districtId": "B", "last_updated": "x", "metrics": null});
        let adopted = normalize(&raw, Some("A"), MismatchPolicy::AdoptMetrics);
        let matched = normalize(&raw, Some("B"), MismatchPolicy::Strict);
        assert_eq!(adopted.metrics, matched.metrics);
        assert_eq!(adopted.last_updated, matched.last_updated);
        assert_eq!(adopted.district_id.as_deref(), Some("A"));
    }
}
