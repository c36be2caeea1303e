use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};
use mgnrega_dash::{Coordinates, MetricKey};

pub const DEFAULT_DISTRICTS_SOURCE: &str = "public/districts.json";
pub const DEFAULT_METRICS_SOURCE: &str = "public/sample-metrics.json";
pub const DEFAULT_LOCATE_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_HTML_PATH: &str = "data/output/district.html";
pub const DEFAULT_COMPARE_HTML_PATH: &str = "data/output/compare.html";
pub const DEFAULT_CSV_PATH: &str = "data/output/metrics.csv";
pub const DEFAULT_LOCATE_TIMEOUT_SECS: u64 = 10;

pub const DISTRICTS_HELP: &str = "District reference file, as a local path or an http(s) URL (defaults to public/districts.json).";
pub const METRICS_HELP: &str = "Metrics file, as a local path or an http(s) URL (defaults to public/sample-metrics.json).";
pub const ADOPT_MISMATCHED_HELP: &str = "When the metrics file is a single record for another district, show its metrics anyway instead of an empty dashboard.";
pub const SAVE_HTML_HELP: &str = "Save the HTML dashboard to the given file (defaults to data/output/district.html when no path is provided).";
pub const SAVE_COMPARE_HTML_HELP: &str = "Save the HTML comparison to the given file (defaults to data/output/compare.html when no path is provided).";
pub const SAVE_CSV_HELP: &str = "Save the district's monthly metrics to the given CSV file (defaults to data/output/metrics.csv when no path is provided). Use --archive-csv to store a .gz instead.";
pub const ARCHIVE_CSV_HELP: &str = "Archive the saved CSV into a .gz file.";

#[derive(Debug, Parser)]
#[command(
    name = "mgnrega",
    about = "Show MGNREGA district performance: person-days, wages paid and pending wages.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "SRC", default_value = DEFAULT_DISTRICTS_SOURCE, help = DISTRICTS_HELP)]
    pub districts: String,
    #[arg(long, global = true, value_name = "SRC", default_value = DEFAULT_METRICS_SOURCE, help = METRICS_HELP)]
    pub metrics: String,
    #[arg(long, global = true, help = ADOPT_MISMATCHED_HELP)]
    pub adopt_mismatched: bool,
    #[arg(long, global = true, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[arg(
        long,
        global = true,
        value_name = "LANG",
        default_value = mgnrega_dash::speech::DEFAULT_LANGUAGE,
        help = "Language tag for spoken summaries."
    )]
    pub language: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List districts, optionally filtered by name or state.
    Districts {
        #[arg(long, value_name = "TERM", help = "Only show districts whose name or state contains TERM.")]
        search: Option<String>,
    },
    /// Show the dashboard of one district.
    Show(ShowArgs),
    /// Compare the latest month of two districts side by side.
    Compare {
        #[arg(value_name = "DISTRICT")]
        first: String,
        #[arg(value_name = "DISTRICT")]
        second: String,
        #[arg(
            long,
            value_name = "FILE",
            num_args = 0..=1,
            default_missing_value = DEFAULT_COMPARE_HTML_PATH,
            help = SAVE_COMPARE_HTML_HELP
        )]
        save_html: Option<PathBuf>,
    },
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// District id. Without it the district comes from --search, --near or --locate, or
    /// the first district in the list is used as an example.
    #[arg(value_name = "DISTRICT")]
    pub district: Option<String>,
    #[arg(long, value_name = "TERM", conflicts_with_all = ["district", "near", "locate"], help = "Pick the first district whose name or state contains TERM.")]
    pub search: Option<String>,
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true, conflicts_with_all = ["district", "locate"], help = "Pick the district nearest to the given coordinates.")]
    pub near: Option<Coordinates>,
    #[arg(long, conflicts_with = "district", help = "Pick the district nearest to this machine's approximate location.")]
    pub locate: bool,
    #[arg(long, value_name = "URL", default_value = DEFAULT_LOCATE_URL, help = "IP geolocation endpoint used by --locate.")]
    pub locate_url: String,
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_LOCATE_TIMEOUT_SECS, help = "Give up on --locate after this many seconds.")]
    pub locate_timeout: u64,
    #[arg(long, value_enum, default_value = "person_days", help = "Metric shown in the monthly chart.")]
    pub metric: MetricKey,
    #[arg(long, help = "Print the spoken summary of the latest month.")]
    pub speak: bool,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CSV_PATH,
        help = SAVE_CSV_HELP
    )]
    pub save_csv: Option<PathBuf>,
    #[arg(long, help = ARCHIVE_CSV_HELP)]
    pub archive_csv: bool,
}

pub fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = if let Some(dir) = output_dir {
        Some(dir)
    } else if install {
        Some(default_install_dir(shell)?)
    } else {
        None
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let mut path = PathBuf::from(home);

    match shell {
        Shell::Bash => path.push(".local/share/bash-completion/completions"),
        Shell::Elvish => path.push(".elvish/lib/completions"),
        Shell::Fish => path.push(".config/fish/completions"),
        Shell::PowerShell => path.push(".local/share/powershell/Scripts"),
        Shell::Zsh => path.push(".local/share/zsh/site-functions"),
        other => {
            return Err(anyhow!(
                "no default install location for {other:?}; specify --output-dir"
            ));
        }
    }
    Ok(path)
}
