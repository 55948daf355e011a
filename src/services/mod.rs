pub mod experiments;

pub use experiments::ExperimentService;
