pub mod settings;

pub use settings::{
    AppConfig, EvaluationSettings, FactorSettings, KnnSettings, LoaderSettings, SweepSettings,
};
