use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use retail_insights::app::CostPredictorApp;
use retail_insights::config::AppConfig;
use retail_insights::state::PredictorState;

/// Medical-cost prediction form backed by a trained model.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Model file written by `train_model`
    #[arg(long)]
    model: Option<PathBuf>,

    /// Configuration file (defaults to ./retail-insights.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    let model_path = args.model.unwrap_or(config.model.path);
    log::info!("using model {}", model_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 620.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Medical Cost Predictor",
        options,
        Box::new(|_cc| Ok(Box::new(CostPredictorApp::new(PredictorState::new(model_path))))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the UI: {e}"))
}
