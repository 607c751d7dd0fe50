mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use eframe::egui;

use app::BatteryWindowsApp;
use battery_windows::config::{Rate, ReportConfig};
use battery_windows::report::{Report, ReportKind, build_all};
use state::AppState;

#[derive(Parser)]
#[command(name = "battery-windows")]
#[command(about = "Plot battery cell data and print discharge window times", long_about = None)]
struct Cli {
    /// JSON config with data file paths and windowing options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the summary only; do not open the chart viewer
    #[arg(long, global = true)]
    no_plot: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Original cell cycle data
    Cycle,
    /// Original and processed HPPC data
    Hppc,
    /// Original and processed discharge and temperature data
    Temp {
        /// Discharge rate
        rate: Option<Rate>,
    },
    /// Every report; reports whose indices cannot be derived are skipped
    All,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ReportConfig::load(cli.config.as_deref())?;

    let reports = match cli.command {
        Commands::Cycle => vec![Report::build(ReportKind::Cycle, &config)?],
        Commands::Hppc => vec![Report::build(ReportKind::Hppc, &config)?],
        Commands::Temp { rate: None } => {
            println!("Error: provide discharge rate as 1c, 2c, or 3c");
            return Ok(());
        }
        Commands::Temp { rate: Some(rate) } => {
            vec![Report::build(ReportKind::Temp(rate), &config)?]
        }
        Commands::All => build_all(&ReportKind::all(), &config)?,
    };

    for report in &reports {
        for line in report.summary() {
            println!("{line}");
        }
    }

    if cli.no_plot {
        return Ok(());
    }
    show(&reports)
}

fn show(reports: &[Report]) -> Result<()> {
    let state = AppState::new(reports);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Battery Windows",
        options,
        Box::new(|_cc| Ok(Box::new(BatteryWindowsApp::new(state)))),
    )
    .map_err(|e| anyhow!("chart viewer failed: {e}"))
}
