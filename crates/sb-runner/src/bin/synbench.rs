use anyhow::{Context, Result};
use clap::Parser;
use sb_methods::default_backend;
use sb_runner::{load_config, parse_method_list, run_experiment, ConfigOverrides, PlanRecorder};
use sb_types::ExperimentConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "synbench",
    about = "Resolve a synthetic benchmark study and configure optimization methods for it"
)]
struct Cli {
    /// JSON experiment config; omitted fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Study to benchmark (e.g. park2, hartmann6, branin)
    #[arg(long)]
    study: Option<String>,

    /// Debug mode: 3 trials with a capital of 10
    #[arg(long)]
    debug: bool,

    /// Add Gaussian noise to evaluations
    #[arg(long)]
    noisy: bool,

    /// Comma-separated method identifiers (e.g. rand,dragonfly,hyperopt)
    #[arg(long)]
    methods: Option<String>,

    /// Number of simulated workers
    #[arg(long)]
    workers: Option<usize>,

    /// Trials per method
    #[arg(long)]
    trials: Option<usize>,

    /// Capital budget per trial
    #[arg(long)]
    capital: Option<f64>,

    /// Directory for results
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            study_name: self.study.clone(),
            debug: self.debug,
            noisy_evals: self.noisy,
            methods: self.methods.as_deref().map(parse_method_list),
            num_workers: self.workers,
            num_trials: self.trials,
            max_capital: self.capital,
            save_results_dir: self.save_dir.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    let config = cli
        .overrides()
        .apply(base)
        .context("invalid experiment configuration")?;

    let mut recorder = PlanRecorder::new();
    let report = run_experiment(&config, default_backend(), &mut recorder)
        .with_context(|| format!("experiment on {} failed", config.study_name))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
