//! # sb-runner
//!
//! Orchestrates a synbench experiment: load an [`ExperimentConfig`],
//! resolve the problem, configure the requested methods and hand both to a
//! [`MethodEvaluator`].
//!
//! [`ExperimentConfig`]: sb_types::ExperimentConfig

pub mod config;
pub mod evaluator;
pub mod runner;

pub use config::{load_config, parse_method_list, ConfigOverrides};
pub use evaluator::{MethodEvaluator, PlanRecorder, RunReport};
pub use runner::{run_experiment, ExperimentRunner};
