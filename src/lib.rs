pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod evaluation;
pub mod predictor;
pub mod report;
pub mod services;
pub mod similarity;
pub mod split;
pub mod sweep;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::{Command, CommonArgs, FactorArgs};
use crate::config::settings::AppConfig;
use crate::dataset::load_ratings_file;
use crate::report::{Report, write_json};
use crate::services::ExperimentService;
use crate::similarity::Metric;

const RATINGS_PATH_VAR: &str = "RATINGS_PATH";

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_compare(common: &CommonArgs, k: usize, factor: &FactorArgs) -> Result<()> {
    let mut config = common.to_config();
    config.knn.k = k;
    factor.apply(&mut config.factor);

    let service = build_service(common, config)?;
    let report = service.compare_algorithms()?;
    publish(&report, common.output.as_deref())
}

pub fn handle_similarities(common: &CommonArgs, k: usize) -> Result<()> {
    let mut config = common.to_config();
    config.knn.k = k;

    let service = build_service(common, config)?;
    let report = service.compare_similarities()?;
    publish(&report, common.output.as_deref())
}

pub fn handle_sweep(common: &CommonArgs, sizes: &[usize], metric: Metric) -> Result<()> {
    let mut config = common.to_config();
    config.sweep.neighborhood_sizes = sizes.to_vec();
    config.knn.metric = metric;

    let service = build_service(common, config)?;
    let report = service.sweep_neighborhood_sizes()?;
    publish(&report, common.output.as_deref())
}

fn build_service(common: &CommonArgs, config: AppConfig) -> Result<ExperimentService> {
    let path = resolve_ratings_path(common.ratings.as_deref())?;
    let dataset = load_ratings_file(&path, &config.loader)?;
    Ok(ExperimentService::new(config, dataset))
}

fn resolve_ratings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    std::env::var(RATINGS_PATH_VAR)
        .map(PathBuf::from)
        .map_err(|_| anyhow::anyhow!("No rating file given: pass --ratings or set {}", RATINGS_PATH_VAR))
}

fn publish(report: &Report, output: Option<&Path>) -> Result<()> {
    println!("{}", report.render());

    if let Some(path) = output {
        write_json(path, report)?;
    }

    info!("Finished experiment '{}'", report.experiment);
    Ok(())
}
