//! Loading an [`ExperimentConfig`] and layering command-line overrides on it.

use sb_types::{BenchError, BenchResult, ExperimentConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a JSON experiment config. Missing fields take their defaults.
pub fn load_config(path: &Path) -> BenchResult<ExperimentConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| BenchError::Filesystem {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ExperimentConfig = serde_json::from_str(&text)?;
    debug!("Loaded experiment config from {}", path.display());
    Ok(config)
}

/// Values supplied on the command line; `None` keeps the loaded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub study_name: Option<String>,
    pub debug: bool,
    pub noisy_evals: bool,
    pub methods: Option<Vec<String>>,
    pub num_workers: Option<usize>,
    pub num_trials: Option<usize>,
    pub max_capital: Option<f64>,
    pub save_results_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Apply the overrides and validate the result.
    ///
    /// The two flags only ever switch their setting on.
    pub fn apply(self, mut config: ExperimentConfig) -> BenchResult<ExperimentConfig> {
        if let Some(study) = self.study_name {
            config.study_name = study;
        }
        config.debug |= self.debug;
        config.noisy_evals |= self.noisy_evals;
        if let Some(methods) = self.methods {
            config.methods = methods;
        }
        if let Some(workers) = self.num_workers {
            config.num_workers = workers;
        }
        if let Some(trials) = self.num_trials {
            config.num_trials = trials;
        }
        if let Some(capital) = self.max_capital {
            config.max_capital = capital;
        }
        if let Some(dir) = self.save_results_dir {
            config.save_results_dir = dir;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Split a comma-separated method list, dropping blanks.
pub fn parse_method_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
