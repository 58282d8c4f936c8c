//! End-to-end experiment orchestration.

use cpu_time::ProcessTime;
use sb_methods::{MethodConfigurator, TpeBackend};
use sb_problem::{resolve_problem, Reporter};
use sb_types::{BenchResult, ExperimentConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::evaluator::{MethodEvaluator, RunReport};

/// Resolves, configures and evaluates one experiment.
#[derive(Debug, Default)]
pub struct ExperimentRunner {
    tpe: Option<Arc<dyn TpeBackend>>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl ExperimentRunner {
    pub fn new(tpe: Option<Arc<dyn TpeBackend>>) -> Self {
        Self {
            tpe,
            reporter: None,
        }
    }

    /// Send summary lines here instead of the config's reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn run(
        &self,
        config: &ExperimentConfig,
        evaluator: &mut dyn MethodEvaluator,
    ) -> BenchResult<RunReport> {
        let started = Instant::now();
        let cpu_started = ProcessTime::try_now()?;

        let mut problem = resolve_problem(config)?;
        if let Some(reporter) = &self.reporter {
            problem.reporter = Arc::clone(reporter);
        }

        let methods = MethodConfigurator::new()
            .with_tpe(self.tpe.clone())
            .with_external(config.external.clone())
            .configure(&problem, config.methods.as_slice(), config.capital_type)?;

        let mut report = evaluator.run_trials(&problem, &methods)?;
        report.elapsed_secs = started.elapsed().as_secs_f64();
        report.cpu_secs = cpu_started.try_elapsed()?.as_secs_f64();

        let reporter = &problem.reporter;
        reporter.writeln("");
        reporter.writeln(&format!("realtime taken: {:.6}", report.elapsed_secs));
        reporter.writeln(&format!("cputime taken: {:.6}", report.cpu_secs));
        info!(
            "Run {} on {} finished in {:.3}s ({:.3}s cpu)",
            report.run_id, report.study_name, report.elapsed_secs, report.cpu_secs
        );
        Ok(report)
    }
}

/// Run `config` with the given TPE backend through `evaluator`.
pub fn run_experiment(
    config: &ExperimentConfig,
    tpe: Option<Arc<dyn TpeBackend>>,
    evaluator: &mut dyn MethodEvaluator,
) -> BenchResult<RunReport> {
    ExperimentRunner::new(tpe).run(config, evaluator)
}
