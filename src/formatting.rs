use crate::model::{MetricKey, Trend};
use crate::stats::Comparison;

/// Number as it reads aloud: integers without a fraction, no grouping.
pub fn format_plain_number(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        "0".to_string()
    }
}

/// Indian digit grouping (`12,34,567.5`), at most three fraction digits.
pub fn format_indian(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rendered = format!("{:.3}", value.abs());
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = group_indian(integer);
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    if value < 0.0 && grouped.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        grouped.insert(0, '-');
    }
    grouped
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Short form using thousand, lakh and crore suffixes (`1.2K`, `45L`, `3.1Cr`).
pub fn format_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e7, "Cr"), (1e5, "L"), (1e3, "K")];
    if !value.is_finite() {
        return "-".to_string();
    }
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    for (scale, suffix) in UNITS {
        if magnitude >= scale {
            return format!("{sign}{}{suffix}", compact_digits(magnitude / scale));
        }
    }
    format!("{sign}{}", compact_digits(magnitude))
}

fn compact_digits(value: f64) -> String {
    if value < 10.0 {
        let rounded = (value * 10.0).round() / 10.0;
        let text = format!("{rounded:.1}");
        text.strip_suffix(".0").map_or(text.clone(), str::to_string)
    } else {
        format!("{value:.0}")
    }
}

pub fn format_rupees(value: f64) -> String {
    format!("₹ {}", format_indian(value))
}

pub fn format_metric(key: MetricKey, value: f64) -> String {
    if key.is_currency() {
        format_rupees(value)
    } else {
        format_indian(value)
    }
}

pub fn format_trend(trend: Option<Trend>) -> String {
    trend.map_or_else(
        || "-".to_string(),
        |trend| {
            let sign = if trend.is_positive { '+' } else { '-' };
            format!("{sign}{:.1}%", trend.percentage)
        },
    )
}

pub fn format_comparison(comparison: Option<Comparison>) -> String {
    comparison.map_or_else(
        || "-".to_string(),
        |comparison| {
            let arrow = if comparison.is_higher { '↑' } else { '↓' };
            format!("{arrow} {:.1}% difference", comparison.percentage)
        },
    )
}
