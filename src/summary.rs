use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use mgnrega_dash::formatting::{
    format_comparison, format_compact, format_indian, format_metric, format_trend,
};
use mgnrega_dash::model::{District, DistrictMetrics, MetricKey, MetricRecord, Trend};
use mgnrega_dash::session::Session;
use mgnrega_dash::speech::{self, Utterance};
use mgnrega_dash::stats::{self, compare};
use std::path::Path;

const BAR_WIDTH: usize = 40;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DIVIDER: &str = "=============================================================";
const MOCK_NOTICE: &str = "Data shown is sample/mock data. For production, connect to a server that caches the data.gov.in API.";

pub struct SummaryPaths<'a> {
    pub(crate) html: Option<&'a Path>,
    pub(crate) csv: Option<&'a Path>,
}

pub struct DashboardContext<'a> {
    pub(crate) session: &'a Session,
    pub(crate) district: Option<&'a District>,
    pub(crate) metrics: &'a DistrictMetrics,
    pub(crate) metric: MetricKey,
    pub(crate) speak: bool,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) paths: SummaryPaths<'a>,
}

pub struct ComparedDistrict<'a> {
    pub(crate) id: &'a str,
    pub(crate) district: Option<&'a District>,
    pub(crate) metrics: &'a DistrictMetrics,
}

impl ComparedDistrict<'_> {
    pub(crate) fn display_name(&self, fallback: &str) -> String {
        self.district
            .map_or_else(|| fallback.to_string(), |district| district.name.clone())
    }
}

pub fn print_district_list(districts: &[&District], term: Option<&str>) {
    println!();
    println!("{}", "Districts".bold().bright_magenta());
    if districts.is_empty() {
        let message = term.map_or_else(
            || "No districts available.".to_string(),
            |term| format!("No districts match {term:?}."),
        );
        println!("{}", message.bright_black());
        return;
    }
    println!(
        "{}",
        format!("{:<12} | {:<24} | {:<20} | {:>16}", "Id", "Name", "State", "Centroid")
            .bold()
            .bright_white()
    );
    println!(
        "{}",
        "-------------+--------------------------+----------------------+-----------------".bright_black()
    );
    for district in districts {
        let centroid = format!("{:.3},{:.3}", district.centroid.lat, district.centroid.lng);
        println!(
            "{}",
            format!(
                "{:<12} | {:<24} | {:<20} | {:>16}",
                district.id, district.name, district.state, centroid
            )
            .bright_green()
        );
    }
}

pub fn print_dashboard(context: &DashboardContext<'_>) {
    println!();
    print_header(context.run_started_at);
    print_district_line(context);

    let Some(latest) = context.metrics.latest() else {
        println!();
        println!("{}", "Select a district to see stats".bright_black());
        if context.speak {
            print_utterance(&Utterance::new(speech::prompt(), &context.session.language));
        }
        println!("{}", DIVIDER.bright_cyan());
        return;
    };

    println!();
    print_tiles(&context.metrics.metrics, latest);
    println!();
    print_bar_chart(&context.metrics.metrics, context.metric);
    println!();
    print_sparkline(
        &context.metrics.metrics,
        MetricKey::WagesPaid,
        "Wages disbursed (monthly)",
    );

    if context.speak {
        println!();
        print_utterance(&Utterance::new(
            speech::latest_summary(latest),
            &context.session.language,
        ));
        for key in MetricKey::ALL {
            print_utterance(&Utterance::new(
                speech::tile_phrase(key, latest),
                &context.session.language,
            ));
        }
    }

    println!();
    print_path_line("HTML dashboard", context.paths.html, "not saved (use --save-html)");
    print_path_line("Metrics CSV", context.paths.csv, "not saved (use --save-csv)");
    println!("{}", MOCK_NOTICE.bright_black());
    println!("{}", DIVIDER.bright_cyan());
}

fn print_header(run_started_at: &DateTime<Local>) {
    println!(
        "{}",
        "==================== MGNREGA District View ===================="
            .bold()
            .bright_cyan()
    );
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
}

fn print_district_line(context: &DashboardContext<'_>) {
    let name = match (context.district, context.session.selected()) {
        (Some(district), _) => format!("{} ({})", district.name, district.state),
        (None, Some(id)) => id.to_string(),
        (None, None) => "none selected".to_string(),
    };
    println!("{} {}", "District".bright_yellow().bold(), name.bright_white());
    let updated = context.metrics.last_updated_at().map_or_else(
        || context.metrics.last_updated.clone().unwrap_or_else(|| "—".to_string()),
        |at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    );
    println!(
        "{} {}",
        "Last updated".bright_yellow().bold(),
        updated.bright_white()
    );
}

fn print_tiles(records: &[MetricRecord], latest: &MetricRecord) {
    for key in MetricKey::ALL {
        let subtitle = match key {
            MetricKey::PersonDays => format!("Month: {}/{}", latest.month, latest.year),
            MetricKey::WagesPaid => "Amount disbursed to workers".to_string(),
            MetricKey::Pending => "Amount pending".to_string(),
        };
        let trend = stats::latest_trend(records, key);
        println!(
            "{} {} {} {}",
            format!("{:<14}", key.label()).bright_yellow().bold(),
            format!("{:>16}", format_metric(key, latest.value(key))).bright_white().bold(),
            colored_trend(trend),
            subtitle.bright_black()
        );
    }
}

fn colored_trend(trend: Option<Trend>) -> ColoredString {
    let text = format!("{:>8}", format_trend(trend));
    match trend {
        Some(trend) if trend.is_positive => text.bright_green(),
        Some(_) => text.bright_red(),
        None => text.bright_black(),
    }
}

fn print_bar_chart(records: &[MetricRecord], key: MetricKey) {
    println!("{}", format!("{} (monthly)", key.label()).bold().bright_magenta());
    let series = stats::series(records, key);
    let max = series
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0_f64, f64::max);
    for (label, value) in &series {
        println!(
            "{} {} {}",
            format!("{label:>4}").bright_white(),
            bar(*value, max).bright_blue(),
            format_metric(key, *value).bright_white()
        );
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return " ".repeat(BAR_WIDTH);
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((value / max) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.clamp(1, BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

pub(crate) fn sparkline_text(values: &[f64]) -> String {
    stats::sparkline_points(values)
        .into_iter()
        .map(|(_, y)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let level = ((100.0 - y) / 100.0 * 7.0).round().clamp(0.0, 7.0) as usize;
            SPARK_LEVELS[level]
        })
        .collect()
}

fn print_sparkline(records: &[MetricRecord], key: MetricKey, title: &str) {
    println!("{}", title.bold().bright_magenta());
    if records.is_empty() {
        println!("{}", "No data available".bright_black());
        return;
    }
    let values: Vec<f64> = records.iter().map(|record| record.value(key)).collect();
    let summary = stats::summarize(records, key);
    let trend = stats::span_trend(records, key);
    println!(
        "{}  {} {}",
        sparkline_text(&values).bright_blue(),
        colored_trend(trend),
        "vs first month".bright_black()
    );
    println!(
        "{} {}  {} {}  {} {}",
        "Min".bright_yellow(),
        format_compact(summary.min).bright_white(),
        "Avg".bright_yellow(),
        format_compact(summary.average).bright_white(),
        "Max".bright_yellow(),
        format_compact(summary.max).bright_white()
    );
    let latest = values.last().copied().unwrap_or_default();
    let months = values.len();
    let plural = if months == 1 { "" } else { "s" };
    println!(
        "{} {}  {}",
        "Latest".bright_yellow(),
        format_indian(latest).bright_white(),
        format!("{months} month{plural}").bright_black()
    );
}

fn print_utterance(utterance: &Utterance) {
    println!(
        "{} {} {}",
        "Speak".bright_yellow().bold(),
        format!("[{}]", utterance.lang).bright_black(),
        utterance.text.bright_white()
    );
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

pub fn print_comparison(
    first: &ComparedDistrict<'_>,
    second: &ComparedDistrict<'_>,
    run_started_at: &DateTime<Local>,
    html: Option<&Path>,
) {
    println!();
    print_header(run_started_at);
    let first_name = first.display_name("District 1");
    let second_name = second.display_name("District 2");
    println!(
        "{} {} {} {}",
        "Comparing".bright_yellow().bold(),
        first_name.bright_white().bold(),
        "vs".bright_black(),
        second_name.bright_white().bold()
    );
    println!();

    match (first.metrics.latest(), second.metrics.latest()) {
        (Some(a), Some(b)) => {
            println!(
                "{}",
                format!("{:<14} | {:>16} | {:>16} | {}", "Metric", first_name, second_name, "Difference")
                    .bold()
                    .bright_white()
            );
            for key in MetricKey::ALL {
                let comparison = compare(a.value(key), b.value(key));
                let difference = format_comparison(comparison);
                let difference = match comparison {
                    Some(c) if c.is_higher => difference.bright_green(),
                    Some(_) => difference.bright_red(),
                    None => difference.bright_black(),
                };
                println!(
                    "{:<14} | {:>16} | {:>16} | {}",
                    key.label().bright_yellow(),
                    format_metric(key, a.value(key)),
                    format_metric(key, b.value(key)),
                    difference
                );
            }
        }
        _ => {
            for side in [first, second] {
                if side.metrics.metrics.is_empty() {
                    println!(
                        "{}",
                        format!("No data available for {}.", side.id).bright_black()
                    );
                }
            }
        }
    }

    for (side, name) in [(first, &first_name), (second, &second_name)] {
        println!();
        print_sparkline(
            &side.metrics.metrics,
            MetricKey::PersonDays,
            &format!("{name}: Person-days (latest month)"),
        );
    }

    println!();
    print_path_line("HTML comparison", html, "not saved (use --save-html)");
    println!("{}", DIVIDER.bright_cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_levels_follow_values() {
        assert_eq!(sparkline_text(&[0.0, 50.0, 100.0]), "▁▅█");
        assert_eq!(sparkline_text(&[5.0, 5.0]), "▁▁");
        assert_eq!(sparkline_text(&[]), "");
    }

    #[test]
    fn bars_scale_to_maximum() {
        assert_eq!(bar(10.0, 10.0).trim_end().chars().count(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).trim_end().chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0.0, 10.0).trim(), "");
        assert_eq!(bar(0.01, 10.0).trim_end().chars().count(), 1);
    }
}
