use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use eframe::egui;

use bikeshare_dashboard::app::DashboardApp;
use bikeshare_dashboard::config::{DashboardConfig, Variant};
use bikeshare_dashboard::data::{filter::DayType, loader};
use bikeshare_dashboard::report;
use bikeshare_dashboard::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "bikeshare-dashboard", about = "Interactive bike-rental dashboard")]
struct Cli {
    /// CSV file to load (overrides the config file)
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON config file (default: ./dashboard.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which tab set to show
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Print a text summary of the filtered data instead of opening a window
    #[arg(long)]
    summary: bool,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Season labels to include (repeatable)
    #[arg(long = "season")]
    seasons: Vec<String>,

    /// Weather labels to include (repeatable)
    #[arg(long = "weather")]
    weathers: Vec<String>,

    #[arg(long, value_enum, default_value = "all")]
    day_type: DayTypeArg,
}

/// `--day-type` values.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DayTypeArg {
    All,
    Weekday,
    Weekend,
}

impl From<DayTypeArg> for DayType {
    fn from(arg: DayTypeArg) -> Self {
        match arg {
            DayTypeArg::All => DayType::All,
            DayTypeArg::Weekday => DayType::Weekday,
            DayTypeArg::Weekend => DayType::Weekend,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let mut config = DashboardConfig::discover(cli.config.as_deref(), &cwd)?;
    if let Some(path) = cli.data {
        config.data_path = path;
    }
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }

    // Fatal on failure: there is nothing to show without data.
    let dataset = loader::load_once(&config.data_path)?;
    let mut state = AppState::new(dataset, &config);

    let start = cli.start.unwrap_or(state.params.start);
    let end = cli.end.unwrap_or(state.params.end);
    state.set_date_range(start, end);
    // Unknown labels still count as a selection; they just match nothing.
    for label in state.dataset.unknown_seasons(&cli.seasons) {
        log::warn!(
            "season '{label}' is not in the dataset (known: {})",
            state.dataset.season_options.join(", ")
        );
    }
    for label in state.dataset.unknown_weathers(&cli.weathers) {
        log::warn!(
            "weather '{label}' is not in the dataset (known: {})",
            state.dataset.weather_options.join(", ")
        );
    }
    if !cli.seasons.is_empty() {
        state.set_seasons(cli.seasons);
    }
    if !cli.weathers.is_empty() {
        state.set_weathers(cli.weathers);
    }
    state.set_day_type(cli.day_type.into());

    if cli.summary {
        print!("{}", report::render_summary(&state));
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Rental Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
