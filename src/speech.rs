//! Plain-language summaries handed to a text-to-speech engine.

use crate::formatting::format_plain_number;
use crate::model::{MetricKey, MetricRecord};
use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "hi-IN";
pub const DEFAULT_RATE: f32 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, lang: &str) -> Self {
        Self {
            text: text.into(),
            lang: lang.to_string(),
            rate: DEFAULT_RATE,
        }
    }
}

/// Spoken when a district is selected.
pub fn latest_summary(latest: &MetricRecord) -> String {
    format!(
        "Latest person days {}. Wages paid {} rupees. Pending {} rupees.",
        format_plain_number(latest.person_days),
        format_plain_number(latest.wages_paid),
        format_plain_number(latest.pending)
    )
}

/// Spoken from a single summary tile.
pub fn tile_phrase(key: MetricKey, latest: &MetricRecord) -> String {
    let value = format_plain_number(latest.value(key));
    match key {
        MetricKey::PersonDays => format!("This month, person days are {value}"),
        MetricKey::WagesPaid => format!("Wages paid {value} rupees"),
        MetricKey::Pending => format!("Pending wages {value} rupees"),
    }
}

pub const fn prompt() -> &'static str {
    "Select a district to hear summary"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest() -> MetricRecord {
        MetricRecord {
            month: 9,
            year: 2025,
            person_days: 15234.0,
            wages_paid: 4_120_500.0,
            pending: 12_000.5,
        }
    }

    #[test]
    fn summary_reads_all_metrics() {
        assert_eq!(
            latest_summary(&latest()),
            "Latest person days 15234. Wages paid 4120500 rupees. Pending 12000.5 rupees."
        );
    }

    #[test]
    fn tile_phrases() {
        let latest = latest();
        assert_eq!(
            tile_phrase(MetricKey::PersonDays, &latest),
            "This month, person days are 15234"
        );
        assert_eq!(
            tile_phrase(MetricKey::WagesPaid, &latest),
            "Wages paid 4120500 rupees"
        );
        assert_eq!(
            tile_phrase(MetricKey::Pending, &latest),
            "Pending wages 12000.5 rupees"
        );
    }

    #[test]
    fn utterance_defaults() {
        let utterance = Utterance::new(prompt(), DEFAULT_LANGUAGE);
        assert_eq!(utterance.lang, "hi-IN");
        assert!((utterance.rate - 0.95).abs() < f32::EPSILON);
    }
}
