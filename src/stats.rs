//! Aggregate statistics and period-over-period trends over a district's metric sequence.

use crate::model::{MetricKey, MetricRecord, Trend};
use serde::Serialize;

const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Result of comparing the same metric across two districts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    #[serde(rename = "isHigher")]
    pub is_higher: bool,
    pub percentage: f64,
}

/// Totals, mean and extremes of one metric. An empty sequence yields all zeros.
pub fn summarize(records: &[MetricRecord], key: MetricKey) -> Summary {
    if records.is_empty() {
        return Summary::default();
    }

    let mut total = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in records.iter().map(|record| record.value(key)) {
        total += value;
        min = min.min(value);
        max = max.max(value);
    }

    #[allow(clippy::cast_precision_loss)]
    let average = total / records.len() as f64;

    Summary {
        total,
        average,
        min,
        max,
    }
}

/// Change of `current` against `previous`. Zero change counts as positive and a zero
/// baseline reports 0%.
pub fn trend(
    current: &MetricRecord,
    previous: Option<&MetricRecord>,
    key: MetricKey,
) -> Option<Trend> {
    previous.map(|previous| change_between(previous.value(key), current.value(key)))
}

/// Trend of the latest month against the month before it.
pub fn latest_trend(records: &[MetricRecord], key: MetricKey) -> Option<Trend> {
    let (current, rest) = records.split_last()?;
    trend(current, rest.last(), key)
}

/// Trend of the last month against the first one.
pub fn span_trend(records: &[MetricRecord], key: MetricKey) -> Option<Trend> {
    let first = records.first()?;
    let last = records.last()?;
    Some(change_between(first.value(key), last.value(key)))
}

fn change_between(baseline: f64, value: f64) -> Trend {
    let change = value - baseline;
    let percentage = if baseline == 0.0 {
        0.0
    } else {
        round_one_decimal((change / baseline * 100.0).abs())
    };
    Trend {
        is_positive: change >= 0.0,
        percentage,
    }
}

/// Relative difference of `value` against `other`. Missing (zero) values have no comparison.
pub fn compare(value: f64, other: f64) -> Option<Comparison> {
    if value == 0.0 || other == 0.0 {
        return None;
    }
    let diff = round_one_decimal((value - other) / other * 100.0);
    Some(Comparison {
        is_higher: diff > 0.0,
        percentage: diff.abs(),
    })
}

/// Month label and value pairs for a bar chart.
pub fn series(records: &[MetricRecord], key: MetricKey) -> Vec<(String, f64)> {
    records
        .iter()
        .map(|record| (month_label(record.month), record.value(key)))
        .collect()
}

pub fn month_label(month: u32) -> String {
    usize::try_from(month)
        .ok()
        .and_then(|month| month.checked_sub(1))
        .and_then(|idx| MONTH_NAMES_SHORT.get(idx))
        .map_or_else(|| format!("M{month}"), |name| (*name).to_string())
}

/// Maps values into a 0..=100 box, x left to right and y growing downwards.
/// A flat series sits on the bottom edge.
pub fn sparkline_points(values: &[f64]) -> Vec<(f64, f64)> {
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    let min = values.iter().copied().fold(max, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let steps = values.len().saturating_sub(1).max(1);

    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            #[allow(clippy::cast_precision_loss)]
            let x = idx as f64 / steps as f64 * 100.0;
            let y = 100.0 - (value - min) / range * 100.0;
            (x, y)
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(person_days: f64, wages_paid: f64, pending: f64) -> MetricRecord {
        MetricRecord {
            month: 1,
            year: 2025,
            person_days,
            wages_paid,
            pending,
        }
    }

    #[test]
    fn empty_summary_is_zero() {
        for key in MetricKey::ALL {
            assert_eq!(summarize(&[], key), Summary::default());
        }
    }

    #[test]
    fn summary_over_records() {
        let records = [
            record(100.0, 10.0, 0.0),
            record(300.0, 30.0, 5.0),
            record(200.0, 20.0, 1.0),
        ];
        let summary = summarize(&records, MetricKey::PersonDays);
        assert_eq!(summary.total, 600.0);
        assert_eq!(summary.average, 200.0);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 300.0);

        let pending = summarize(&records, MetricKey::Pending);
        assert_eq!(pending.min, 0.0);
        assert_eq!(pending.max, 5.0);
    }

    #[test]
    fn no_previous_means_no_trend() {
        let current = record(100.0, 0.0, 0.0);
        for key in MetricKey::ALL {
            assert!(trend(&current, None, key).is_none());
        }
    }

    #[test]
    fn unchanged_value_is_positive_zero() {
        let value = trend(
            &record(100.0, 0.0, 0.0),
            Some(&record(100.0, 0.0, 0.0)),
            MetricKey::PersonDays,
        );
        assert_eq!(
            value,
            Some(Trend {
                is_positive: true,
                percentage: 0.0
            })
        );
    }

    #[test]
    fn decrease_reports_absolute_percentage() {
        let value = trend(
            &record(90.0, 0.0, 0.0),
            Some(&record(100.0, 0.0, 0.0)),
            MetricKey::PersonDays,
        );
        assert_eq!(
            value,
            Some(Trend {
                is_positive: false,
                percentage: 10.0
            })
        );
    }

    #[test]
    fn zero_baseline_reports_zero_percent() {
        let value = trend(
            &record(0.0, 5.0, 0.0),
            Some(&record(0.0, 0.0, 0.0)),
            MetricKey::WagesPaid,
        );
        assert_eq!(
            value,
            Some(Trend {
                is_positive: true,
                percentage: 0.0
            })
        );
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let value = trend(
            &record(4.0, 0.0, 0.0),
            Some(&record(3.0, 0.0, 0.0)),
            MetricKey::PersonDays,
        )
        .unwrap();
        assert_eq!(value.percentage, 33.3);
    }

    #[test]
    fn latest_trend_uses_last_two_months() {
        let records = [
            record(50.0, 0.0, 0.0),
            record(100.0, 0.0, 0.0),
            record(120.0, 0.0, 0.0),
        ];
        let value = latest_trend(&records, MetricKey::PersonDays).unwrap();
        assert!(value.is_positive);
        assert_eq!(value.percentage, 20.0);
        assert!(latest_trend(&records[..1], MetricKey::PersonDays).is_none());
        assert!(latest_trend(&[], MetricKey::PersonDays).is_none());
    }

    #[test]
    fn span_trend_compares_first_and_last() {
        let records = [
            record(200.0, 0.0, 0.0),
            record(500.0, 0.0, 0.0),
            record(150.0, 0.0, 0.0),
        ];
        let value = span_trend(&records, MetricKey::PersonDays).unwrap();
        assert!(!value.is_positive);
        assert_eq!(value.percentage, 25.0);

        let single = span_trend(&records[..1], MetricKey::PersonDays).unwrap();
        assert!(single.is_positive);
        assert_eq!(single.percentage, 0.0);

        assert!(span_trend(&[], MetricKey::PersonDays).is_none());
    }

    #[test]
    fn compare_skips_missing_values() {
        assert!(compare(0.0, 100.0).is_none());
        assert!(compare(100.0, 0.0).is_none());

        let higher = compare(110.0, 100.0).unwrap();
        assert!(higher.is_higher);
        assert_eq!(higher.percentage, 10.0);

        let lower = compare(50.0, 200.0).unwrap();
        assert!(!lower.is_higher);
        assert_eq!(lower.percentage, 75.0);

        let equal = compare(100.0, 100.0).unwrap();
        assert!(!equal.is_higher);
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "M0");
        assert_eq!(month_label(13), "M13");
    }

    #[test]
    fn sparkline_spans_box() {
        let points = sparkline_points(&[10.0, 30.0, 20.0]);
        assert_eq!(points, vec![(0.0, 100.0), (50.0, 0.0), (100.0, 50.0)]);
    }

    #[test]
    fn flat_sparkline_sits_on_bottom() {
        let points = sparkline_points(&[7.0, 7.0]);
        assert!(points.iter().all(|(_, y)| *y == 100.0));
        assert_eq!(sparkline_points(&[3.0]), vec![(0.0, 100.0)]);
        assert!(sparkline_points(&[]).is_empty());
    }
}
