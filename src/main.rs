use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use eframe::egui;

use scorescope::app::ScorescopeApp;
use scorescope::config::DashboardConfig;
use scorescope::state::{AppState, FrameState};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Student scores file (.csv, .json or .parquet); overrides the config
    #[arg(value_name = "DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long, default_value = "scorescope.toml")]
    config: PathBuf,

    /// Print KPIs and chart data for the default filters as JSON and exit
    #[arg(long, default_value_t = false)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = DashboardConfig::load_or_default(&args.config);
    let data_file = args.data_file.unwrap_or_else(|| config.data_file.clone());
    let mut state = AppState::new(config);

    if args.summary {
        return print_summary(&mut state, &data_file);
    }

    if let Err(e) = state.open(&data_file) {
        log::error!("{e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Scorescope – Student Performance Dashboard",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ScorescopeApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Headless mode: load, apply the default selection, print the frame.
fn print_summary(state: &mut AppState, data_file: &Path) -> Result<()> {
    state.open(data_file)?;
    match &state.frame {
        FrameState::Ready(frame) => {
            let json = serde_json::to_string_pretty(frame).context("serialising summary")?;
            println!("{json}");
            Ok(())
        }
        FrameState::Empty => {
            bail!("No students match the selected filters. Please adjust your selections.")
        }
        FrameState::NoData => bail!("no data loaded from {}", data_file.display()),
    }
}
