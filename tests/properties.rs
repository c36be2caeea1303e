use mgnrega_dash::model::Centroid;
use mgnrega_dash::stats::Summary;
use mgnrega_dash::{
    Coordinates, District, DistrictMetrics, MetricKey, MetricRecord, MismatchPolicy, Trend,
    nearest, normalize, summarize, trend,
};
use serde_json::json;

fn district(id: &str, lat: f64, lng: f64) -> District {
    District {
        id: id.to_string(),
        name: id.to_string(),
        state: String::new(),
        centroid: Centroid { lat, lng },
    }
}

fn person_days(value: f64) -> MetricRecord {
    MetricRecord {
        person_days: value,
        ..MetricRecord::default()
    }
}

#[test]
fn absent_ids_normalize_to_empty_sequences() {
    let raw = json!([
        {"districtId": "A", "metrics": [{"month": 1, "year": 2025, "person_days": 10}]},
        {"districtId": "B", "metrics": []}
    ]);
    for id in ["C", "a", "A ", "Z-99"] {
        for policy in [MismatchPolicy::Strict, MismatchPolicy::AdoptMetrics] {
            assert_eq!(
                normalize(&raw, Some(id), policy),
                DistrictMetrics::empty(Some(id))
            );
        }
    }
}

#[test]
fn empty_ids_ignore_the_document() {
    let documents = [
        json!([{"districtId": "", "metrics": [{"month": 1}]}]),
        json!({"districtId": "", "metrics": [{"month": 1}]}),
        json!(null),
        json!("garbage"),
    ];
    for raw in &documents {
        for id in [None, Some("")] {
            let normalized = normalize(raw, id, MismatchPolicy::AdoptMetrics);
            assert_eq!(normalized, DistrictMetrics::empty(None));
            assert!(normalized.district_id.is_none());
            assert!(normalized.last_updated.is_none());
        }
    }
}

#[test]
fn empty_sequence_summarizes_to_zero() {
    for key in MetricKey::ALL {
        assert_eq!(
            summarize(&[], key),
            Summary {
                total: 0.0,
                average: 0.0,
                min: 0.0,
                max: 0.0
            }
        );
    }
}

#[test]
fn trend_needs_a_previous_month() {
    for value in [0.0, 1.0, 250.5] {
        for key in MetricKey::ALL {
            assert!(trend(&person_days(value), None, key).is_none());
        }
    }
}

#[test]
fn trend_examples() {
    assert_eq!(
        trend(&person_days(100.0), Some(&person_days(100.0)), MetricKey::PersonDays),
        Some(Trend {
            is_positive: true,
            percentage: 0.0
        })
    );
    assert_eq!(
        trend(&person_days(90.0), Some(&person_days(100.0)), MetricKey::PersonDays),
        Some(Trend {
            is_positive: false,
            percentage: 10.0
        })
    );
    assert_eq!(
        trend(&person_days(5.0), Some(&person_days(0.0)), MetricKey::PersonDays),
        Some(Trend {
            is_positive: true,
            percentage: 0.0
        })
    );
}

#[test]
fn nearest_examples() {
    let districts = [district("a", 10.0, 10.0), district("b", 20.0, 20.0)];
    let found = nearest(Coordinates { lat: 10.0, lng: 10.0 }, &districts);
    assert_eq!(found.map(|d| d.id.as_str()), Some("a"));

    assert!(nearest(Coordinates { lat: 10.0, lng: 10.0 }, &[]).is_none());

    let tied = [district("a", 1.0, 0.0), district("b", -1.0, 0.0)];
    let found = nearest(Coordinates { lat: 0.0, lng: 0.0 }, &tied);
    assert_eq!(found.map(|d| d.id.as_str()), Some("a"));
}

#[test]
fn well_formed_record_normalizes_unchanged() {
    let record = DistrictMetrics {
        district_id: Some("MH-PUNE".to_string()),
        metrics: vec![
            MetricRecord {
                month: 8,
                year: 2025,
                person_days: 1200.0,
                wages_paid: 250_000.0,
                pending: 1000.0,
            },
            MetricRecord {
                month: 9,
                year: 2025,
                person_days: 1350.0,
                wages_paid: 281_250.0,
                pending: 0.0,
            },
        ],
        last_updated: Some("2025-10-01T09:30:00Z".to_string()),
    };
    let raw = serde_json::to_value(&record).unwrap();
    for policy in [MismatchPolicy::Strict, MismatchPolicy::AdoptMetrics] {
        assert_eq!(normalize(&raw, Some("MH-PUNE"), policy), record);
    }
}
