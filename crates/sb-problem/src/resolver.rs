//! Turns an [`ExperimentConfig`] into a fully resolved [`ProblemDescriptor`].

use sb_types::{BenchError, BenchResult, Domain, ExperimentConfig, NoiseType, TimeDistribution};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::functions::{get_function, FunctionCaller, Objective};
use crate::reporter::{get_reporter, Reporter};
use crate::study::StudyParameters;
use crate::worker::SyntheticWorkerManager;

/// Options forwarded to the trial evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOptions {
    /// File of previously evaluated points to seed each trial with.
    pub prev_eval_points: Option<PathBuf>,
    /// Number of points evaluated before a method takes over.
    pub initial_pool_size: usize,
}

/// Everything the method configurator and the trial evaluator need to know
/// about one benchmark problem.
///
/// The objective is a maximization problem: `objective.eval(opt_pt) == -opt_val`.
#[derive(Debug)]
pub struct ProblemDescriptor {
    pub study_name: String,
    pub num_trials: usize,
    pub max_capital: f64,
    pub noisy_evals: bool,
    pub noise_type: NoiseType,
    pub noise_scale: Option<f64>,
    pub time_distro: TimeDistribution,
    pub num_workers: usize,
    pub objective: Objective,
    pub func_caller: FunctionCaller,
    /// Minimizer of the raw test function.
    pub opt_pt: Vec<f64>,
    /// Minimum of the raw test function.
    pub opt_val: f64,
    pub domain: Domain,
    pub worker_manager: SyntheticWorkerManager,
    pub evaluation_options: EvaluationOptions,
    pub save_results_dir: PathBuf,
    pub save_file_prefix: String,
    pub reporter: Arc<dyn Reporter>,
}

impl ProblemDescriptor {
    /// Best achievable value of the (maximizing) objective.
    pub fn max_val(&self) -> f64 {
        -self.opt_val
    }

    /// Part of the study name used to look up tables and paths.
    pub fn study_prefix(&self) -> &str {
        sb_types::study_prefix(&self.study_name)
    }

    /// Serializable snapshot of the resolved problem.
    pub fn summary(&self) -> ProblemSummary {
        ProblemSummary {
            study_name: self.study_name.clone(),
            num_trials: self.num_trials,
            max_capital: self.max_capital,
            noisy_evals: self.noisy_evals,
            noise_type: self.noise_type,
            noise_scale: self.noise_scale,
            time_distro: self.time_distro,
            num_workers: self.num_workers,
            worker_time_distro: self.worker_manager.time_distro(),
            fidel_dim: self.func_caller.fidel_dim(),
            opt_pt: self.opt_pt.clone(),
            opt_val: self.opt_val,
            max_val: self.max_val(),
            domain: self.domain.clone(),
            evaluation_options: self.evaluation_options.clone(),
            save_results_dir: self.save_results_dir.clone(),
            save_file_prefix: self.save_file_prefix.clone(),
        }
    }
}

/// Plain-data view of a [`ProblemDescriptor`], suitable for persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub study_name: String,
    pub num_trials: usize,
    pub max_capital: f64,
    pub noisy_evals: bool,
    pub noise_type: NoiseType,
    pub noise_scale: Option<f64>,
    pub time_distro: TimeDistribution,
    pub num_workers: usize,
    pub worker_time_distro: TimeDistribution,
    pub fidel_dim: Option<usize>,
    pub opt_pt: Vec<f64>,
    pub opt_val: f64,
    pub max_val: f64,
    pub domain: Domain,
    pub evaluation_options: EvaluationOptions,
    pub save_results_dir: PathBuf,
    pub save_file_prefix: String,
}

/// Resolve the problem described by `config`.
///
/// Fails with a configuration error for an unknown study, and with a
/// filesystem error if the results directory cannot be created. Nothing is
/// created on disk unless every other step succeeded.
pub fn resolve_problem(config: &ExperimentConfig) -> BenchResult<ProblemDescriptor> {
    config.validate()?;
    let params = StudyParameters::lookup(&config.study_name)?;

    let num_trials = config.effective_trials();
    let max_capital = config.effective_capital();

    let (noise_type, noise_scale) = if config.noisy_evals {
        (NoiseType::Gauss, Some(params.noise_scale))
    } else {
        (NoiseType::NoNoise, None)
    };

    let initial_pool_size = if config.use_initial_pool {
        params.initial_pool_size
    } else {
        0
    };

    let function = get_function(
        &config.study_name,
        noise_type,
        noise_scale,
        params.fidel_dim,
        config.noise_seed,
    )?;
    let objective = function.objective();

    let worker_manager = SyntheticWorkerManager::new(
        config.num_workers,
        config.worker_cost_model,
        config.noise_seed.map(|seed| seed.wrapping_add(1)),
    )?;
    let reporter = get_reporter(&config.reporter)?;

    let save_results_dir = config.save_results_dir.clone();
    std::fs::create_dir_all(&save_results_dir).map_err(|source| BenchError::Filesystem {
        path: save_results_dir.clone(),
        source,
    })?;
    debug!("Results directory ready: {}", save_results_dir.display());

    info!(
        "Resolved study {}: {} trials, capital {}, noise {}, {} worker(s)",
        config.study_name, num_trials, max_capital, noise_type, config.num_workers
    );

    Ok(ProblemDescriptor {
        study_name: config.study_name.clone(),
        num_trials,
        max_capital,
        noisy_evals: config.noisy_evals,
        noise_type,
        noise_scale,
        time_distro: config.time_distro,
        num_workers: config.num_workers,
        objective,
        func_caller: function.caller,
        opt_pt: function.opt_pt,
        opt_val: function.opt_val,
        domain: function.domain,
        worker_manager,
        evaluation_options: EvaluationOptions {
            prev_eval_points: None,
            initial_pool_size,
        },
        save_results_dir,
        save_file_prefix: config.save_file_prefix(),
        reporter,
    })
}
