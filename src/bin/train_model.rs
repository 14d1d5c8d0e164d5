use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use retail_insights::config::AppConfig;
use retail_insights::predict::forest::RandomForest;
use retail_insights::predict::training::{load_insurance_csv, r2_score};

/// Fit the medical-cost random forest and save it for the cost predictor.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Labeled insurance CSV
    #[arg(long)]
    data: Option<PathBuf>,

    /// Where to write the model
    #[arg(long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to ./retail-insights.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    let data_path = args.data.unwrap_or(config.data.insurance_path);
    let output = args.output.unwrap_or(config.model.path);

    let dataset = load_insurance_csv(&data_path)
        .with_context(|| format!("reading {}", data_path.display()))?;
    if dataset.is_empty() {
        bail!("{} contains no rows", data_path.display());
    }
    log::info!("{} labeled rows, {} features", dataset.len(), dataset.n_features());

    let split = dataset.random_split(config.model.test_ratio, config.model.split_seed);
    if split.train.is_empty() {
        bail!("not enough rows to train on after holding out the test split");
    }

    let forest = RandomForest::fit(&config.model.forest, &split.train);
    log::info!(
        "fitted {} trees (deepest: {}, seed {})",
        forest.n_trees(),
        forest.max_depth(),
        forest.config().seed
    );

    if split.test.is_empty() {
        log::warn!("test split is empty; skipping R² report");
    } else {
        let predicted = split
            .test
            .features
            .iter()
            .map(|row| forest.predict_row(row))
            .collect::<Result<Vec<f64>, _>>()?;
        let r2 = r2_score(&split.test.targets, &predicted);
        log::info!("R² on {} held-out rows: {r2:.4}", split.test.len());
        println!("R² = {r2:.4}");
    }

    forest
        .save(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Model saved to {}", output.display());
    Ok(())
}
