use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::settings::{AppConfig, FactorSettings};
use crate::similarity::Metric;

#[derive(Parser, Debug)]
#[command(author, version, about = "recommender evaluation with k-fold cross-validation")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Compare PMF, user-based CF and item-based CF
    Compare {
        #[command(flatten)]
        common: CommonArgs,
        /// Neighborhood size for the KNN predictors
        #[arg(short, long, default_value_t = 40)]
        k: usize,
        #[command(flatten)]
        factor: FactorArgs,
    },
    /// Score user- and item-based CF under cosine, MSD and Pearson similarity
    Similarities {
        #[command(flatten)]
        common: CommonArgs,
        /// Neighborhood size
        #[arg(short, long, default_value_t = 40)]
        k: usize,
    },
    /// Sweep the neighborhood size for user- and item-based CF
    Sweep {
        #[command(flatten)]
        common: CommonArgs,
        /// Neighborhood sizes to evaluate (comma separated)
        #[arg(long, value_delimiter = ',', default_values_t = [5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100])]
        sizes: Vec<usize>,
        /// Similarity metric (cosine, msd, pearson)
        #[arg(short, long, default_value = "msd")]
        metric: Metric,
    },
}

/// Options shared by every experiment
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CommonArgs {
    /// Rating file (user,item,rating,timestamp); falls back to $RATINGS_PATH
    #[arg(short, long)]
    pub ratings: Option<PathBuf>,
    /// Field separator of the rating file
    #[arg(long, default_value_t = ',')]
    pub separator: char,
    /// Header lines to skip
    #[arg(long, default_value_t = 1)]
    pub skip_lines: usize,
    /// Number of cross-validation folds
    #[arg(short, long, default_value_t = 5)]
    pub folds: usize,
    /// Seed for fold shuffling and factor initialisation
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
    /// Clip estimates to the training rating scale
    #[arg(long)]
    pub clip: bool,
    /// Write the results as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// PMF hyperparameters
#[derive(Args, Debug, Clone, PartialEq)]
pub struct FactorArgs {
    /// Latent factor count
    #[arg(long, default_value_t = 100)]
    pub factors: usize,
    /// SGD epochs
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,
    /// SGD learning rate
    #[arg(long, default_value_t = 0.005)]
    pub learning_rate: f64,
    /// Regularization weight
    #[arg(long, default_value_t = 0.02)]
    pub regularization: f64,
}

impl FactorArgs {
    pub fn apply(&self, settings: &mut FactorSettings) {
        settings.factors = self.factors;
        settings.epochs = self.epochs;
        settings.learning_rate = self.learning_rate;
        settings.regularization = self.regularization;
    }
}

impl CommonArgs {
    /// Configuration with these options applied over the defaults
    pub fn to_config(&self) -> AppConfig {
        let mut config = AppConfig::new();
        config.loader.separator = self.separator;
        config.loader.skip_lines = self.skip_lines;
        config.evaluation.folds = self.folds;
        config.evaluation.seed = self.seed;
        config.evaluation.clip_predictions = self.clip;
        config.factor.seed = self.seed;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_defaults() {
        let cli = Cli::try_parse_from(["recsys_eval", "sweep", "--ratings", "ratings.csv"]).unwrap();

        match cli.command {
            Command::Sweep {
                common,
                sizes,
                metric,
            } => {
                assert_eq!(sizes, vec![5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
                assert_eq!(metric, Metric::Msd);
                assert_eq!(common.folds, 5);
                assert_eq!(common.ratings, Some(PathBuf::from("ratings.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_common_args_to_config() {
        let cli = Cli::try_parse_from([
            "recsys_eval",
            "compare",
            "--folds",
            "3",
            "--seed",
            "42",
            "--clip",
            "--learning-rate",
            "0.01",
        ])
        .unwrap();

        let Command::Compare { common, factor, .. } = cli.command else {
            panic!("expected compare");
        };

        let mut config = common.to_config();
        factor.apply(&mut config.factor);
        assert_eq!(config.evaluation.folds, 3);
        assert_eq!(config.evaluation.seed, 42);
        assert_eq!(config.factor.seed, 42);
        assert!(config.evaluation.clip_predictions);
        assert_eq!(config.factor.learning_rate, 0.01);
        assert_eq!(config.factor.factors, 100);
    }

    #[test]
    fn test_multi_word_flags_are_kebab_case() {
        let cli = Cli::try_parse_from([
            "recsys_eval",
            "compare",
            "--skip-lines",
            "0",
            "--learning-rate",
            "0.02",
            "--regularization",
            "0.1",
        ])
        .unwrap();

        let Command::Compare { common, factor, .. } = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(common.skip_lines, 0);
        assert_eq!(factor.learning_rate, 0.02);
        assert_eq!(factor.regularization, 0.1);

        assert!(Cli::try_parse_from(["recsys_eval", "compare", "--learningrate", "0.02"]).is_err());
    }

    #[test]
    fn test_unknown_metric_lists_possible_values() {
        let err = Cli::try_parse_from(["recsys_eval", "sweep", "--metric", "jaccard"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cosine"));
        assert!(message.contains("pearson"));
    }

    #[test]
    fn test_custom_sizes_and_metric() {
        let cli = Cli::try_parse_from(["recsys_eval", "sweep", "--sizes", "1,2,3", "--metric", "pearson"]).unwrap();

        let Command::Sweep { sizes, metric, .. } = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(sizes, vec![1, 2, 3]);
        assert_eq!(metric, Metric::Pearson);
    }
}
