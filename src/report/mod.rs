//! Plain records and text/JSON renderings handed to the reporting layer.
//!
//! Nothing here draws charts; the JSON output carries the series an
//! external plotting tool needs.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::errors::write_context;
use crate::evaluation::{AggregateScore, CrossValidation, FoldScore, ScoreSpread};
use crate::sweep::SweepPoint;

/// Aggregate score keyed by a caller-chosen algorithm label
#[derive(Debug, Clone, Serialize)]
pub struct LabeledScore {
    pub label: String,
    pub score: AggregateScore,
    pub spread: ScoreSpread,
    pub folds: Vec<FoldScore>,
}

impl LabeledScore {
    pub fn from_cross_validation(label: impl Into<String>, cv: &CrossValidation) -> Self {
        Self {
            label: label.into(),
            score: cv.aggregate,
            spread: cv.spread,
            folds: cv.fold_scores(),
        }
    }
}

/// Scores of one algorithm across a parameter grid
#[derive(Debug, Clone, Serialize)]
pub struct SweepSeries {
    pub label: String,
    pub parameter: String,
    pub points: Vec<SweepPoint<usize>>,
}

impl SweepSeries {
    pub fn rmse(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.score.rmse).collect()
    }

    pub fn mae(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.score.mae).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub experiment: String,
    pub scores: Vec<LabeledScore>,
    pub series: Vec<SweepSeries>,
}

impl Report {
    pub fn new(experiment: impl Into<String>) -> Self {
        Self {
            experiment: experiment.into(),
            ..Self::default()
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.scores.is_empty() {
            out.push_str(&format_scores_table(&self.scores));
        }
        for series in &self.series {
            out.push_str(&format_series_table(series));
        }
        out
    }
}

pub fn format_scores_table(scores: &[LabeledScore]) -> String {
    let width = label_width(scores.iter().map(|s| s.label.as_str()));
    let mut out = format!("{:<width$}  {:>8}  {:>8}\n", "Algorithm", "RMSE", "MAE");

    for entry in scores {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8.4}  {:>8.4}",
            entry.label, entry.score.rmse, entry.score.mae
        );
    }
    out
}

pub fn format_series_table(series: &SweepSeries) -> String {
    let mut out = format!("{}\n{:>10}  {:>8}  {:>8}\n", series.label, series.parameter, "RMSE", "MAE");

    for point in &series.points {
        let _ = writeln!(
            out,
            "{:>10}  {:>8.4}  {:>8.4}",
            point.value, point.score.rmse, point.score.mae
        );
    }
    out
}

/// Writes the report as pretty JSON
pub fn write_json<P: AsRef<Path>>(path: P, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| write_context(&display))?;

    info!("Saved report to: {}", display);
    Ok(())
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(str::len).max().unwrap_or(0).max("Algorithm".len())
}
