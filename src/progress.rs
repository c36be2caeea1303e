use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const SPINNER_TICKS: [&str; 8] = ["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"];
const SPINNER_TICKS_ASCII: &str = "|/-\\";
const STAGE_COUNT: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Locate,
    Render,
}

impl Stage {
    const ORDER: [Self; STAGE_COUNT] = [Self::Fetch, Self::Locate, Self::Render];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|stage| *stage == self)
            .map_or(STAGE_COUNT, |idx| idx + 1)
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Fetch => "Loading data",
            Self::Locate => "Locating",
            Self::Render => "Rendering",
        }
    }
}

/// One spinner line: `[n/3] Stage: label`, finished with the outcome appended.
struct StageLine {
    bar: ProgressBar,
    text: String,
}

impl StageLine {
    fn finish(self, ok: bool) {
        let outcome = if ok {
            "done".bright_green().bold()
        } else {
            "failed".bright_red().bold()
        };
        self.bar.finish_with_message(format!("{} {outcome}", self.text));
    }
}

pub struct ProgressState {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl ProgressState {
    pub(crate) fn new(enabled: bool, use_color: bool) -> Self {
        let multi = MultiProgress::with_draw_target(if enabled {
            ProgressDrawTarget::stderr_with_hz(15)
        } else {
            ProgressDrawTarget::hidden()
        });
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let style = if is_dumb_term() {
            style.tick_chars(SPINNER_TICKS_ASCII)
        } else {
            let ticks: Vec<String> = SPINNER_TICKS
                .iter()
                .map(|tick| {
                    if use_color {
                        tick.bright_cyan().bold().to_string()
                    } else {
                        (*tick).to_string()
                    }
                })
                .collect();
            let ticks: Vec<&str> = ticks.iter().map(String::as_str).collect();
            style.tick_strings(&ticks)
        };
        Self { multi, style }
    }

    fn start(&self, stage: Stage, label: &str) -> StageLine {
        let text = format!(
            "{} {}: {}",
            format!("[{}/{STAGE_COUNT}]", stage.position())
                .bright_yellow()
                .bold(),
            stage.title().bright_cyan().bold(),
            label.bright_white().bold()
        );
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(self.style.clone());
        bar.set_message(text.clone());
        bar.enable_steady_tick(Duration::from_millis(100));
        StageLine { bar, text }
    }

    pub(crate) fn clear(&self) {
        let _ = self.multi.clear();
    }
}

fn is_dumb_term() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Runs `fut` behind a spinner. The loaders recover from their own failures, so
/// `succeeded` judges the outcome from the value.
pub async fn run_with_spinner<T>(
    progress: &ProgressState,
    stage: Stage,
    label: &str,
    fut: impl Future<Output = T>,
    succeeded: impl FnOnce(&T) -> bool,
) -> T {
    let line = progress.start(stage, label);
    let result = fut.await;
    line.finish(succeeded(&result));
    result
}
