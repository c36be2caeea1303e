use crate::cli::{Cli, Commands, ShowArgs, generate_completions};
use crate::progress::{ProgressState, Stage, run_with_spinner};
use crate::report::{
    HtmlComparisonContext, HtmlReportContext, save_html_comparison, save_html_report,
};
use crate::summary::{
    ComparedDistrict, DashboardContext, SummaryPaths, print_comparison, print_dashboard,
    print_district_list,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use csv::Writer;
use env_logger::Env;
use flate2::Compression;
use flate2::write::GzEncoder;
use mgnrega_dash::locate::locate_district;
use mgnrega_dash::model::{District, MetricRecord};
use mgnrega_dash::search::{find, search};
use mgnrega_dash::session::Session;
use mgnrega_dash::source::{DataSource, Source, fetch_location};
use mgnrega_dash::{Coordinates, MismatchPolicy};
use reqwest::Client;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt::Display;
use std::future::{Future, ready};
use std::io::{IsTerminal, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

mod cli;
mod progress;
mod report;
mod summary;

const HTTP_TIMEOUT_SECONDS: u64 = 20;

struct App {
    data: DataSource,
    progress: ProgressState,
    language: String,
    run_started_at: DateTime<Local>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    colored::control::set_override(true);

    let Cli {
        districts,
        metrics,
        adopt_mismatched,
        no_progress,
        language,
        command,
    } = Cli::parse();

    if let Commands::Completions {
        shell,
        output_dir,
        install,
    } = command
    {
        return generate_completions(shell, output_dir, install);
    }

    let client = Client::builder()
        .user_agent(concat!("mgnrega-dash/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .build()
        .context("failed to build HTTP client")?;
    let policy = if adopt_mismatched {
        MismatchPolicy::AdoptMetrics
    } else {
        MismatchPolicy::Strict
    };

    let app = App {
        data: DataSource::new(
            client,
            Source::parse(&districts),
            Source::parse(&metrics),
            policy,
        ),
        progress: ProgressState::new(!no_progress, std::io::stderr().is_terminal()),
        language,
        run_started_at: Local::now(),
    };

    let outcome = match command {
        Commands::Districts { search } => {
            list_districts(&app, search.as_deref()).await;
            Ok(())
        }
        Commands::Show(args) => show_district(&app, args).await,
        Commands::Compare {
            first,
            second,
            save_html,
        } => compare_districts(&app, &first, &second, save_html.as_deref()).await,
        Commands::Completions { .. } => Ok(()),
    };
    app.progress.clear();
    outcome
}

async fn list_districts(app: &App, term: Option<&str>) {
    let districts = run_with_spinner(
        &app.progress,
        Stage::Fetch,
        "districts",
        app.data.districts(),
        |list| !list.is_empty(),
    )
    .await;
    let matches = search(&districts, term.unwrap_or_default());
    app.progress.clear();
    print_district_list(&matches, term);
}

async fn show_district(app: &App, args: ShowArgs) -> Result<()> {
    let (districts, explicit_metrics) = run_with_spinner(
        &app.progress,
        Stage::Fetch,
        "districts and metrics",
        async {
            tokio::join!(app.data.districts(), async {
                match args.district.as_deref() {
                    Some(id) => Some(app.data.metrics(Some(id)).await),
                    None => None,
                }
            })
        },
        |(list, _)| !list.is_empty(),
    )
    .await;

    let mut session = Session::new(Some(app.language.as_str()));
    let selected = match args.district.as_deref() {
        Some(id) => Some(id.to_string()),
        None => select_district(&args, &districts, || {
            run_with_spinner(
                &app.progress,
                Stage::Locate,
                "approximate position",
                fetch_location(app.data.client(), &args.locate_url),
                Result::is_ok,
            )
        })
        .await
        .map(|district| district.id.clone()),
    };
    if let Some(id) = selected {
        session.select(id);
    }

    let metrics = match explicit_metrics {
        Some(metrics) => metrics,
        None => app.data.metrics(session.selected()).await,
    };
    let district = session.selected().and_then(|id| find(&districts, id));
    if district.is_none()
        && let Some(id) = session.selected()
    {
        log::warn!("district {id} is not in the reference list");
    }

    let csv_path = match args.save_csv.as_deref() {
        Some(path) => Some(save_metrics_csv(path, &metrics.metrics, args.archive_csv).await?),
        None => None,
    };

    if let Some(path) = args.save_html.as_deref() {
        let context = HtmlReportContext {
            district,
            district_id: session.selected(),
            metrics: &metrics,
            metric: args.metric,
            language: &session.language,
            run_started_at: &app.run_started_at,
            csv_path: csv_path.as_deref(),
            output_path: path,
        };
        run_with_spinner(
            &app.progress,
            Stage::Render,
            "HTML dashboard",
            save_html_report(path, &context),
            Result::is_ok,
        )
        .await?;
    }

    app.progress.clear();
    print_dashboard(&DashboardContext {
        session: &session,
        district,
        metrics: &metrics,
        metric: args.metric,
        speak: args.speak,
        run_started_at: &app.run_started_at,
        paths: SummaryPaths {
            html: args.save_html.as_deref(),
            csv: csv_path.as_deref(),
        },
    });
    Ok(())
}

/// Picks a district from `--search`, `--near` or `--locate`. Without any of them the first
/// district of the list stands in as the example district. A selector that finds nothing
/// leaves the selection empty.
async fn select_district<'a, L, F, E>(
    args: &ShowArgs,
    districts: &'a [District],
    locate: L,
) -> Option<&'a District>
where
    L: FnOnce() -> F,
    F: Future<Output = Result<Coordinates, E>>,
    E: Display,
{
    let limit = Duration::from_secs(args.locate_timeout);
    if let Some(term) = args.search.as_deref() {
        let found = search(districts, term).into_iter().next();
        if found.is_none() {
            log::warn!("no district matches {term:?}");
        }
        found
    } else if let Some(point) = args.near {
        locate_district(ready(Ok::<_, Infallible>(point)), districts, limit).await
    } else if args.locate {
        locate_district(locate(), districts, limit).await
    } else {
        districts.first()
    }
}

async fn compare_districts(
    app: &App,
    first_id: &str,
    second_id: &str,
    save_html: Option<&Path>,
) -> Result<()> {
    let (districts, first_metrics, second_metrics) = run_with_spinner(
        &app.progress,
        Stage::Fetch,
        "districts and metrics",
        async {
            tokio::join!(
                app.data.districts(),
                app.data.metrics(Some(first_id)),
                app.data.metrics(Some(second_id))
            )
        },
        |(list, _, _)| !list.is_empty(),
    )
    .await;

    let first = ComparedDistrict {
        id: first_id,
        district: find(&districts, first_id),
        metrics: &first_metrics,
    };
    let second = ComparedDistrict {
        id: second_id,
        district: find(&districts, second_id),
        metrics: &second_metrics,
    };

    if let Some(path) = save_html {
        let context = HtmlComparisonContext {
            first: &first,
            second: &second,
            run_started_at: &app.run_started_at,
        };
        run_with_spinner(
            &app.progress,
            Stage::Render,
            "HTML comparison",
            save_html_comparison(path, &context),
            Result::is_ok,
        )
        .await?;
    }

    app.progress.clear();
    print_comparison(&first, &second, &app.run_started_at, save_html);
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvRecord {
    year: i32,
    month: u32,
    person_days: f64,
    wages_paid: f64,
    pending: f64,
}

impl From<&MetricRecord> for CsvRecord {
    fn from(record: &MetricRecord) -> Self {
        Self {
            year: record.year,
            month: record.month,
            person_days: record.person_days,
            wages_paid: record.wages_paid,
            pending: record.pending,
        }
    }
}

/// Writes the monthly records as CSV and returns the path actually written, which gains a
/// `.gz` suffix when archived.
async fn save_metrics_csv(path: &Path, records: &[MetricRecord], archive: bool) -> Result<PathBuf> {
    let serialized = serialize_metrics(records)?;
    if archive {
        let archived_path = archive_path(path);
        let compressed = compress(&serialized)?;
        write_output_file(&archived_path, &compressed).await?;
        Ok(archived_path)
    } else {
        write_output_file(path, &serialized).await?;
        Ok(path.to_path_buf())
    }
}

fn serialize_metrics(records: &[MetricRecord]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(CsvRecord::from(record))
            .context("failed to serialize metric record")?;
    }
    finalize_writer(writer, "metrics CSV writer")
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .context("failed to compress metrics CSV")?;
    encoder.finish().context("failed to finish metrics archive")
}

fn archive_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

pub(crate) async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}
