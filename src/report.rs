use crate::summary::ComparedDistrict;
use crate::write_output_file;
use anyhow::Result;
use chrono::{DateTime, Local};
use mgnrega_dash::formatting::{
    format_comparison, format_compact, format_indian, format_metric, format_trend,
};
use mgnrega_dash::model::{District, DistrictMetrics, MetricKey, MetricRecord, Trend};
use mgnrega_dash::speech;
use mgnrega_dash::stats::{self, compare};
use std::fmt::Write as _;
use std::path::Path;

pub struct HtmlReportContext<'a> {
    pub(crate) district: Option<&'a District>,
    pub(crate) district_id: Option<&'a str>,
    pub(crate) metrics: &'a DistrictMetrics,
    pub(crate) metric: MetricKey,
    pub(crate) language: &'a str,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) csv_path: Option<&'a Path>,
    pub(crate) output_path: &'a Path,
}

pub struct HtmlComparisonContext<'a> {
    pub(crate) first: &'a ComparedDistrict<'a>,
    pub(crate) second: &'a ComparedDistrict<'a>,
    pub(crate) run_started_at: &'a DateTime<Local>,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context);
    write_output_file(output_path, html.as_bytes()).await
}

pub async fn save_html_comparison(
    output_path: &Path,
    context: &HtmlComparisonContext<'_>,
) -> Result<()> {
    let html = render_html_comparison(context);
    write_output_file(output_path, html.as_bytes()).await
}

fn render_html_report(context: &HtmlReportContext<'_>) -> String {
    let district_name = context.district.map_or_else(
        || context.district_id.unwrap_or("No district").to_string(),
        |district| format!("{}, {}", district.name, district.state),
    );
    let title = format!("MGNREGA - {district_name}");
    let updated = context.metrics.last_updated_at().map_or_else(
        || "—".to_string(),
        |at| at.format("%Y-%m-%d %H:%M %Z").to_string(),
    );

    let mut html = page_open(&title);
    html.push_str("<header class=\"hero\">\n");
    let _ = writeln!(
        html,
        "<div class=\"pill\">mgnrega-dash v{}</div>",
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&district_name));
    html.push_str("<div class=\"meta\">\n");
    let _ = writeln!(
        html,
        "<div><span class=\"label\">Generated</span><span class=\"value mono\">{}</span></div>",
        escape_html(&format_generated(context.run_started_at))
    );
    let _ = writeln!(
        html,
        "<div><span class=\"label\">Last updated</span><span class=\"value mono\">{}</span></div>",
        escape_html(&updated)
    );
    html.push_str("</div>\n");
    if let Some(latest) = context.metrics.latest() {
        html.push_str(&speak_button(
            &speech::latest_summary(latest),
            context.language,
            "Hear summary",
        ));
    } else {
        html.push_str(&speak_button(
            speech::prompt(),
            context.language,
            "Hear summary",
        ));
    }
    html.push_str("</header>\n");

    match context.metrics.latest() {
        Some(latest) => {
            html.push_str(&render_tiles(
                &context.metrics.metrics,
                latest,
                context.language,
            ));
            html.push_str("<section class=\"panels\">\n");
            html.push_str(&render_bar_chart(
                &context.metrics.metrics,
                context.metric,
            ));
            html.push_str(&render_sparkline_panel(
                &context.metrics.metrics,
                MetricKey::WagesPaid,
                "Wages disbursed (monthly)",
            ));
            html.push_str("</section>\n");
        }
        None => {
            html.push_str(
                "<section class=\"empty\"><p>Select a district to see stats</p></section>\n",
            );
        }
    }

    html.push_str(&render_downloads(context));
    html.push_str(&page_close());
    html
}

fn render_html_comparison(context: &HtmlComparisonContext<'_>) -> String {
    let first_name = context.first.display_name("District 1");
    let second_name = context.second.display_name("District 2");
    let title = format!("MGNREGA - {first_name} vs {second_name}");

    let mut html = page_open(&title);
    html.push_str("<header class=\"hero\">\n");
    let _ = writeln!(
        html,
        "<div class=\"pill\">mgnrega-dash v{}</div>",
        env!("CARGO_PKG_VERSION")
    );
    html.push_str("<h1>Compare districts</h1>\n");
    html.push_str("<p class=\"subtitle\">Compare MGNREGA performance across districts.</p>\n");
    html.push_str("<div class=\"meta\">\n");
    let _ = writeln!(
        html,
        "<div><span class=\"label\">Generated</span><span class=\"value mono\">{}</span></div>",
        escape_html(&format_generated(context.run_started_at))
    );
    html.push_str("</div>\n</header>\n");

    if let (Some(a), Some(b)) = (
        context.first.metrics.latest(),
        context.second.metrics.latest(),
    ) {
        html.push_str("<section class=\"table-section\">\n<div class=\"table-wrap\">\n<table>\n");
        let _ = writeln!(
            html,
            "<thead><tr><th>Metric</th><th>{}</th><th>{}</th><th>Difference</th></tr></thead>\n<tbody>",
            escape_html(&first_name),
            escape_html(&second_name)
        );
        for key in MetricKey::ALL {
            let comparison = compare(a.value(key), b.value(key));
            let class = match comparison {
                Some(c) if c.is_higher => "up",
                Some(_) => "down",
                None => "neutral",
            };
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td><span class=\"trend {class}\">{}</span></td></tr>",
                escape_html(key.label()),
                escape_html(&format_metric(key, a.value(key))),
                escape_html(&format_metric(key, b.value(key))),
                escape_html(&format_comparison(comparison))
            );
        }
        html.push_str("</tbody>\n</table>\n</div>\n</section>\n");
    }

    html.push_str("<section class=\"panels\">\n");
    for (side, name) in [
        (context.first, &first_name),
        (context.second, &second_name),
    ] {
        html.push_str(&render_sparkline_panel(
            &side.metrics.metrics,
            MetricKey::PersonDays,
            &format!("{name}: Person-days (latest month)"),
        ));
    }
    html.push_str("</section>\n");
    html.push_str(&page_close());
    html
}

fn page_open(title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(title));
    html.push_str("<meta name=\"color-scheme\" content=\"light\">\n");
    html.push_str("<style>\n");
    html.push_str(REPORT_STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str("<div class=\"page\">\n");
    html
}

fn page_close() -> String {
    let mut html = String::new();
    html.push_str("<footer class=\"footer\">\n");
    html.push_str("<div>This is a demo. Data shown is sample/mock data. For production, connect to a server that caches the data.gov.in API.</div>\n");
    html.push_str("</footer>\n");
    html.push_str("</div>\n<script>\n");
    html.push_str(SPEAK_SCRIPT);
    html.push_str("\n</script>\n</body>\n</html>\n");
    html
}

fn format_generated(run_started_at: &DateTime<Local>) -> String {
    run_started_at.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

fn render_tiles(records: &[MetricRecord], latest: &MetricRecord, language: &str) -> String {
    let mut section = String::new();
    section.push_str("<section class=\"cards\">\n");
    for key in MetricKey::ALL {
        let subtitle = match key {
            MetricKey::PersonDays => format!("Month: {}/{}", latest.month, latest.year),
            MetricKey::WagesPaid => "Amount disbursed to workers".to_string(),
            MetricKey::Pending => "Amount pending".to_string(),
        };
        section.push_str("<div class=\"card\">\n");
        let _ = writeln!(section, "<div class=\"card-label\">{}</div>", escape_html(key.label()));
        let _ = writeln!(
            section,
            "<div class=\"card-value\">{}{}</div>",
            escape_html(&format_metric(key, latest.value(key))),
            trend_badge(stats::latest_trend(records, key))
        );
        let _ = writeln!(
            section,
            "<div class=\"card-subtitle\">{}</div>",
            escape_html(&subtitle)
        );
        section.push_str(&speak_button(
            &speech::tile_phrase(key, latest),
            language,
            "Hear",
        ));
        section.push_str("</div>\n");
    }
    section.push_str("</section>\n");
    section
}

fn trend_badge(trend: Option<Trend>) -> String {
    trend.map_or_else(String::new, |trend| {
        let class = if trend.is_positive { "up" } else { "down" };
        format!(
            " <span class=\"trend {class}\">{}</span>",
            escape_html(&format_trend(Some(trend)))
        )
    })
}

fn render_bar_chart(records: &[MetricRecord], key: MetricKey) -> String {
    const CHART_WIDTH: f64 = 600.0;
    const CHART_HEIGHT: f64 = 220.0;
    const LABEL_SPACE: f64 = 24.0;

    let series = stats::series(records, key);
    let max = series
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0_f64, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let slot = CHART_WIDTH / series.len().max(1) as f64;
    let plot_height = CHART_HEIGHT - LABEL_SPACE;

    let mut panel = String::new();
    panel.push_str("<div class=\"panel\">\n");
    let _ = writeln!(panel, "<h2>{} (monthly)</h2>", escape_html(key.label()));
    let _ = writeln!(
        panel,
        "<svg class=\"chart\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" role=\"img\">"
    );
    for (idx, (label, value)) in series.iter().enumerate() {
        let height = if max > 0.0 {
            value / max * plot_height
        } else {
            0.0
        };
        #[allow(clippy::cast_precision_loss)]
        let x = slot * idx as f64 + slot * 0.15;
        let width = slot * 0.7;
        let _ = writeln!(
            panel,
            "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{width:.1}\" height=\"{height:.1}\" rx=\"4\"><title>{}</title></rect>",
            plot_height - height,
            escape_html(&format!("{label}: {}", format_indian(*value)))
        );
        let _ = writeln!(
            panel,
            "<text x=\"{:.1}\" y=\"{:.1}\">{}</text>",
            x + width / 2.0,
            CHART_HEIGHT - 6.0,
            escape_html(label)
        );
    }
    panel.push_str("</svg>\n</div>\n");
    panel
}

fn render_sparkline_panel(records: &[MetricRecord], key: MetricKey, title: &str) -> String {
    let mut panel = String::new();
    panel.push_str("<div class=\"panel\">\n");
    let _ = writeln!(panel, "<h2>{}</h2>", escape_html(title));
    if records.is_empty() {
        panel.push_str("<p class=\"muted\">No data available</p>\n</div>\n");
        return panel;
    }

    let values: Vec<f64> = records.iter().map(|record| record.value(key)).collect();
    let summary = stats::summarize(records, key);
    let trend = stats::span_trend(records, key);
    let points = stats::sparkline_points(&values)
        .into_iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");

    let _ = writeln!(
        panel,
        "<div class=\"spark-trend\">{} <span class=\"muted\">vs first month</span></div>",
        trend_badge(trend)
    );
    panel.push_str("<svg class=\"spark\" viewBox=\"-2 -2 104 104\" preserveAspectRatio=\"none\">\n");
    let _ = writeln!(
        panel,
        "<polyline points=\"{points}\" fill=\"none\" stroke=\"#0ea5e9\" stroke-width=\"2\" vector-effect=\"non-scaling-stroke\"/>"
    );
    panel.push_str("</svg>\n");
    let _ = writeln!(
        panel,
        "<div class=\"stats\"><span>Min <b>{}</b></span><span>Avg <b>{}</b></span><span>Max <b>{}</b></span></div>",
        escape_html(&format_compact(summary.min)),
        escape_html(&format_compact(summary.average)),
        escape_html(&format_compact(summary.max))
    );
    let months = values.len();
    let plural = if months == 1 { "" } else { "s" };
    let _ = writeln!(
        panel,
        "<div class=\"muted\">Latest: <b>{}</b> &middot; {months} month{plural}</div>",
        escape_html(&format_metric(key, values.last().copied().unwrap_or_default()))
    );
    panel.push_str("</div>\n");
    panel
}

fn speak_button(text: &str, language: &str, label: &str) -> String {
    format!(
        "<button class=\"speak\" type=\"button\" data-say=\"{}\" data-lang=\"{}\">{}</button>\n",
        escape_html(text),
        escape_html(language),
        escape_html(label)
    )
}

fn render_downloads(context: &HtmlReportContext<'_>) -> String {
    let mut section = String::new();
    section.push_str("<section class=\"downloads\">\n");
    section.push_str("<h3>Downloads</h3>\n");
    let Some(path) = context.csv_path else {
        section.push_str("<p class=\"muted\">No CSV file was saved. Use --save-csv.</p>\n");
        section.push_str("</section>\n");
        return section;
    };

    let full_display = path.to_string_lossy();
    let display_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(full_display.as_ref());
    if let Some(rel) = relative_link(context.output_path, path) {
        let _ = writeln!(
            section,
            "<a class=\"download-link\" href=\"{}\" title=\"{}\">{}</a>",
            escape_html(&rel),
            escape_html(full_display.as_ref()),
            escape_html(display_name)
        );
    } else {
        let _ = writeln!(
            section,
            "<span class=\"download-path\" title=\"{}\">{}</span>",
            escape_html(full_display.as_ref()),
            escape_html(display_name)
        );
    }
    section.push_str("</section>\n");
    section
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const SPEAK_SCRIPT: &str = r"
document.querySelectorAll('button.speak').forEach(function (button) {
  button.addEventListener('click', function () {
    if (!('speechSynthesis' in window)) return;
    try {
      window.speechSynthesis.cancel();
      var utterance = new SpeechSynthesisUtterance(button.dataset.say);
      utterance.lang = button.dataset.lang;
      utterance.rate = 0.95;
      window.speechSynthesis.speak(utterance);
    } catch (err) {
      console.warn('speech error', err);
    }
  });
});
";

const REPORT_STYLE: &str = r#"
:root {
  color-scheme: light;
  --ink: #111827;
  --muted: #6b7280;
  --card: #ffffff;
  --border: #e5e7eb;
  --accent: #0ea5e9;
  --accent-strong: #2563eb;
  --up: #16a34a;
  --down: #dc2626;
  --shadow: 0 12px 32px rgba(17, 24, 39, 0.08);
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: "Segoe UI", system-ui, sans-serif;
  color: var(--ink);
  background: linear-gradient(160deg, #eff6ff, #eef2ff);
}

.page {
  max-width: 1100px;
  margin: 0 auto;
  padding: 40px 20px 56px;
}

.hero,
.card,
.panel,
.table-section,
.downloads,
.empty {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 16px;
  box-shadow: var(--shadow);
  padding: 20px 24px;
  margin-bottom: 20px;
}

.pill {
  display: inline-block;
  font-size: 12px;
  padding: 4px 10px;
  border-radius: 999px;
  background: #dbeafe;
  color: var(--accent-strong);
}

.meta {
  display: flex;
  gap: 24px;
  flex-wrap: wrap;
  margin: 12px 0;
}

.label {
  display: block;
  font-size: 11px;
  text-transform: uppercase;
  color: var(--muted);
}

.mono {
  font-family: ui-monospace, monospace;
}

.cards,
.panels {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
  gap: 20px;
}

.card-label {
  font-size: 12px;
  text-transform: uppercase;
  color: var(--muted);
}

.card-value {
  font-size: 28px;
  font-weight: 700;
  margin: 8px 0;
}

.card-subtitle,
.muted {
  font-size: 12px;
  color: var(--muted);
}

.trend {
  font-size: 13px;
  font-weight: 700;
  padding: 2px 8px;
  border-radius: 8px;
}

.trend.up {
  color: var(--up);
  background: #f0fdf4;
}

.trend.down {
  color: var(--down);
  background: #fef2f2;
}

.trend.neutral {
  color: var(--muted);
}

.speak {
  margin-top: 10px;
  border: none;
  border-radius: 8px;
  padding: 6px 12px;
  background: #dbeafe;
  color: var(--accent-strong);
  cursor: pointer;
}

.chart rect {
  fill: var(--accent);
}

.chart text {
  font-size: 11px;
  fill: var(--muted);
  text-anchor: middle;
}

.spark {
  width: 100%;
  height: 120px;
}

.stats {
  display: flex;
  justify-content: space-between;
  font-size: 12px;
  margin: 8px 0;
}

table {
  width: 100%;
  border-collapse: collapse;
}

th,
td {
  text-align: left;
  padding: 8px;
  border-bottom: 1px solid var(--border);
}

td.num {
  text-align: right;
  font-variant-numeric: tabular-nums;
}

.footer {
  font-size: 12px;
  color: var(--muted);
  text-align: center;
}
"#;
