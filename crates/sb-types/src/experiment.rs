//! Immutable experiment configuration handed to the problem resolver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{BenchResult, ConfigError};
use crate::kinds::{CapitalType, TimeDistribution};

/// Trial count forced by debug mode.
pub const DEBUG_NUM_TRIALS: usize = 3;
/// Capital forced by debug mode.
pub const DEBUG_MAX_CAPITAL: f64 = 10.0;

/// Filesystem locations used by process-isolated optimizers.
///
/// These differ per machine, so they are always supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProcessPaths {
    /// Root under which one experiment directory per study lives.
    pub exp_root: PathBuf,
    /// Installed package directory of the external optimizer.
    pub pkg_dir: PathBuf,
}

impl ExternalProcessPaths {
    pub fn new(exp_root: impl Into<PathBuf>, pkg_dir: impl Into<PathBuf>) -> Self {
        Self {
            exp_root: exp_root.into(),
            pkg_dir: pkg_dir.into(),
        }
    }

    /// Experiment directory for a study; the suffix after the first hyphen is dropped.
    pub fn exp_dir(&self, study_name: &str) -> PathBuf {
        self.exp_root.join(study_prefix(study_name))
    }
}

/// Part of a study name before the first hyphen (`"hartmann6-debug"` -> `"hartmann6"`).
pub fn study_prefix(study_name: &str) -> &str {
    study_name.split('-').next().unwrap_or(study_name)
}

/// Top-level configuration for one benchmark invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Study to benchmark (e.g. "park2", "hartmann6").
    pub study_name: String,

    /// Fast-iteration mode: forces a handful of trials on a tiny budget.
    pub debug: bool,

    /// Whether evaluations are corrupted with Gaussian noise.
    pub noisy_evals: bool,

    /// Number of independent trials per method.
    pub num_trials: usize,

    /// Capital available to each trial.
    pub max_capital: f64,

    /// Number of simulated parallel workers.
    pub num_workers: usize,

    /// Time distribution recorded on the problem.
    pub time_distro: TimeDistribution,

    /// Cost model the worker manager is built with.
    pub worker_cost_model: TimeDistribution,

    /// Directory results are written into.
    pub save_results_dir: PathBuf,

    /// Method identifiers to benchmark, in reporting order.
    pub methods: Vec<String>,

    /// Unit in which capital is measured.
    pub capital_type: CapitalType,

    /// Use the study's initial-pool size instead of starting from an empty pool.
    pub use_initial_pool: bool,

    /// Reporter sink kind ("default" or "silent").
    pub reporter: String,

    /// Seed for evaluation noise and simulated worker timings.
    pub noise_seed: Option<u64>,

    /// Paths for process-isolated optimizers.
    pub external: Option<ExternalProcessPaths>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            study_name: "park2".to_string(),
            debug: false,
            noisy_evals: false,
            num_trials: 20,
            max_capital: 200.0,
            num_workers: 1,
            time_distro: TimeDistribution::Const,
            worker_cost_model: TimeDistribution::CallerEvalCost,
            save_results_dir: PathBuf::from("results"),
            methods: vec!["rand".to_string(), "dragonfly".to_string()],
            capital_type: CapitalType::ReturnValue,
            use_initial_pool: false,
            reporter: "default".to_string(),
            noise_seed: None,
            external: None,
        }
    }
}

impl ExperimentConfig {
    pub fn new(study_name: impl Into<String>) -> Self {
        Self {
            study_name: study_name.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_noise(mut self, noisy: bool) -> Self {
        self.noisy_evals = noisy;
        self
    }

    pub fn with_trials(mut self, n: usize) -> Self {
        self.num_trials = n;
        self
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.max_capital = capital;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_time_distro(mut self, distro: TimeDistribution) -> Self {
        self.time_distro = distro;
        self
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_results_dir = dir.into();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reporter(mut self, kind: impl Into<String>) -> Self {
        self.reporter = kind.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn with_external(mut self, paths: ExternalProcessPaths) -> Self {
        self.external = Some(paths);
        self
    }

    /// Trial count after the debug override.
    pub fn effective_trials(&self) -> usize {
        if self.debug {
            DEBUG_NUM_TRIALS
        } else {
            self.num_trials
        }
    }

    /// Capital after the debug override.
    pub fn effective_capital(&self) -> f64 {
        if self.debug {
            DEBUG_MAX_CAPITAL
        } else {
            self.max_capital
        }
    }

    /// File-name prefix for saved results.
    pub fn save_file_prefix(&self) -> String {
        if self.debug {
            format!("{}-debug", self.study_name)
        } else {
            self.study_name.clone()
        }
    }

    /// Reject settings no resolution could honour.
    pub fn validate(&self) -> BenchResult<()> {
        let invalid = |message: String| Err(ConfigError::Invalid { message }.into());

        if self.study_name.is_empty() {
            return invalid("study_name must not be empty".to_string());
        }
        if self.num_workers == 0 {
            return invalid("num_workers must be at least 1".to_string());
        }
        if !self.debug {
            if self.num_trials == 0 {
                return invalid("num_trials must be at least 1".to_string());
            }
            if !self.max_capital.is_finite() || self.max_capital <= 0.0 {
                return invalid(format!(
                    "max_capital must be positive and finite, got {}",
                    self.max_capital
                ));
            }
        }
        if self.methods.is_empty() {
            return invalid("at least one method must be requested".to_string());
        }
        Ok(())
    }
}
