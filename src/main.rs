use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use retail_insights::app::SalesDashboardApp;
use retail_insights::config::AppConfig;
use retail_insights::state::AppState;

/// Interactive sales dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Sales table to open at start-up (.csv, .json or .parquet)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Configuration file (defaults to ./retail-insights.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(path) = args.data {
        config.data.sales_path = Some(path);
    }

    let mut state = AppState::new(config);
    if let Some(path) = state.config.data.sales_path.clone() {
        // A failed load is shown in the status line; the window still opens.
        let _ = state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Retail Insights – Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the UI: {e}"))
}
