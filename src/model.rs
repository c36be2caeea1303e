use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub centroid: Centroid,
}

/// One district's performance for one calendar month.
///
/// Decoding is forgiving: numbers may arrive as integral floats or numeric strings, and a
/// field that is missing or unreadable reads as zero instead of rejecting the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default, deserialize_with = "loose_month")]
    pub month: u32,
    #[serde(default, deserialize_with = "loose_year")]
    pub year: i32,
    #[serde(default, deserialize_with = "loose_amount")]
    pub person_days: f64,
    #[serde(default, deserialize_with = "loose_amount")]
    pub wages_paid: f64,
    #[serde(default, deserialize_with = "loose_amount")]
    pub pending: f64,
}

impl MetricRecord {
    pub const fn value(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::PersonDays => self.person_days,
            MetricKey::WagesPaid => self.wages_paid,
            MetricKey::Pending => self.pending,
        }
    }
}

/// Any JSON scalar, kept only when it can be read as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    fn number(self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => Some(value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        value.filter(|value| value.is_finite())
    }

    fn whole_number(self, min: f64, max: f64) -> Option<f64> {
        self.number()
            .filter(|value| value.fract() == 0.0 && (min..=max).contains(value))
    }
}

fn loose_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?
        .number()
        .unwrap_or_default())
}

fn loose_month<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Loose::deserialize(deserializer)?.whole_number(0.0, f64::from(u32::MAX));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let month = value.map_or(0, |value| value as u32);
    Ok(month)
}

fn loose_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value =
        Loose::deserialize(deserializer)?.whole_number(f64::from(i32::MIN), f64::from(i32::MAX));
    #[allow(clippy::cast_possible_truncation)]
    let year = value.map_or(0, |value| value as i32);
    Ok(year)
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(text) => Some(text),
        Loose::Number(_) | Loose::Other(_) => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseRecord {
    Record(MetricRecord),
    Skipped(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseRecords {
    List(Vec<LooseRecord>),
    Other(IgnoredAny),
}

/// A record list where `null` or a non-list reads as empty and entries that are not
/// records are dropped.
fn loose_records<'de, D>(deserializer: D) -> Result<Vec<MetricRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let LooseRecords::List(entries) = LooseRecords::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = entries.len();
    let records: Vec<MetricRecord> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            LooseRecord::Record(record) => Some(record),
            LooseRecord::Skipped(_) => None,
        })
        .collect();
    if records.len() < total {
        log::warn!(
            "skipped {} metric entries that are not records",
            total - records.len()
        );
    }
    Ok(records)
}

/// Metric sequence of a single district, oldest month first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistrictMetrics {
    #[serde(rename = "districtId", default, deserialize_with = "loose_text")]
    pub district_id: Option<String>,
    #[serde(default, deserialize_with = "loose_records")]
    pub metrics: Vec<MetricRecord>,
    #[serde(default, deserialize_with = "loose_text")]
    pub last_updated: Option<String>,
}

impl DistrictMetrics {
    pub fn empty(district_id: Option<&str>) -> Self {
        Self {
            district_id: district_id.map(str::to_string),
            metrics: Vec::new(),
            last_updated: None,
        }
    }

    pub fn latest(&self) -> Option<&MetricRecord> {
        self.metrics.last()
    }

    pub fn previous(&self) -> Option<&MetricRecord> {
        self.metrics.len().checked_sub(2).map(|idx| &self.metrics[idx])
    }

    pub fn last_updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.last_updated
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum MetricKey {
    PersonDays,
    WagesPaid,
    Pending,
}

impl MetricKey {
    pub const ALL: [Self; 3] = [Self::PersonDays, Self::WagesPaid, Self::Pending];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PersonDays => "person_days",
            Self::WagesPaid => "wages_paid",
            Self::Pending => "pending",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonDays => "Person-days",
            Self::WagesPaid => "Wages paid",
            Self::Pending => "Pending wages",
        }
    }

    /// Whether the metric is an amount in rupees rather than a count.
    pub const fn is_currency(self) -> bool {
        !matches!(self, Self::PersonDays)
    }
}

/// Direction and magnitude of a change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    #[serde(rename = "isPositive")]
    pub is_positive: bool,
    /// Absolute change in percent, rounded to one decimal place.
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_district_id() {
        let parsed: DistrictMetrics = serde_json::from_str(
            r#"{"districtId":"MH-PUNE","metrics":[{"month":4,"year":2025,"person_days":120}],"last_updated":"2025-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.district_id.as_deref(), Some("MH-PUNE"));
        assert_eq!(parsed.metrics.len(), 1);
        assert_eq!(parsed.metrics[0].wages_paid, 0.0);
        assert!(parsed.last_updated_at().is_some());
    }

    #[test]
    fn missing_metrics_field_reads_as_empty() {
        let parsed: DistrictMetrics = serde_json::from_str(r#"{"districtId":"x"}"#).unwrap();
        assert!(parsed.metrics.is_empty());
        assert!(parsed.last_updated.is_none());
    }

    #[test]
    fn null_amounts_read_as_zero() {
        let record: MetricRecord =
            serde_json::from_str(r#"{"month":1,"year":2025,"person_days":null,"pending":15.5}"#)
                .unwrap();
        assert_eq!(record.person_days, 0.0);
        assert_eq!(record.pending, 15.5);
    }

    #[test]
    fn integral_floats_and_numeric_strings_are_read() {
        let record: MetricRecord = serde_json::from_str(
            r#"{"month":9.0,"year":"2025","person_days":"100","wages_paid":" 2500.5 ","pending":true}"#,
        )
        .unwrap();
        assert_eq!(record.month, 9);
        assert_eq!(record.year, 2025);
        assert_eq!(record.person_days, 100.0);
        assert_eq!(record.wages_paid, 2500.5);
        assert_eq!(record.pending, 0.0);
    }

    #[test]
    fn unreadable_month_reads_as_zero() {
        for month in ["9.5", "-1", "\"Sep\"", "null"] {
            let record: MetricRecord =
                serde_json::from_str(&format!(r#"{{"month":{month},"person_days":3}}"#)).unwrap();
            assert_eq!(record.month, 0);
            assert_eq!(record.person_days, 3.0);
        }
    }

    #[test]
    fn null_metrics_keep_the_rest_of_the_record() {
        let parsed: DistrictMetrics = serde_json::from_str(
            r#"{"districtId":"A","last_updated":"x","metrics":null}"#,
        )
        .unwrap();
        assert_eq!(parsed.district_id.as_deref(), Some("A"));
        assert!(parsed.metrics.is_empty());
        assert_eq!(parsed.last_updated.as_deref(), Some("x"));
    }

    #[test]
    fn entries_that_are_not_records_are_dropped() {
        let parsed: DistrictMetrics = serde_json::from_str(
            r#"{"metrics":[{"month":1,"person_days":5},"oops",null,{"month":2}]}"#,
        )
        .unwrap();
        let months: Vec<u32> = parsed.metrics.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2]);
    }

    #[test]
    fn previous_needs_two_records() {
        let mut metrics = DistrictMetrics::empty(Some("x"));
        metrics.metrics.push(MetricRecord::default());
        assert!(metrics.previous().is_none());
        metrics.metrics.push(MetricRecord {
            month: 2,
            ..MetricRecord::default()
        });
        assert_eq!(metrics.previous().map(|m| m.month), Some(0));
        assert_eq!(metrics.latest().map(|m| m.month), Some(2));
    }

    #[test]
    fn metric_key_serializes_snake_case() {
        let json = serde_json::to_string(&MetricKey::WagesPaid).unwrap();
        assert_eq!(json, "\"wages_paid\"");
        assert_eq!(MetricKey::Pending.as_str(), "pending");
        assert!(!MetricKey::PersonDays.is_currency());
    }
}
