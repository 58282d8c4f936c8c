//! Trial evaluation seam and the plan-recording evaluator.

use chrono::{DateTime, Utc};
use sb_methods::{MethodKind, MethodOptions};
use sb_problem::ProblemDescriptor;
use sb_types::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Outcome of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub study_name: String,
    pub methods: Vec<MethodKind>,
    /// Trials per method the evaluator committed to.
    pub trials_planned: usize,
    /// Wall-clock seconds for the whole run, filled in by the runner.
    pub elapsed_secs: f64,
    /// Process CPU seconds for the whole run, filled in by the runner.
    pub cpu_secs: f64,
    /// Files written during the run.
    pub artifacts: Vec<PathBuf>,
}

impl RunReport {
    pub fn new(problem: &ProblemDescriptor, methods: &MethodOptions) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            study_name: problem.study_name.clone(),
            methods: methods.keys().collect(),
            trials_planned: problem.num_trials,
            elapsed_secs: 0.0,
            cpu_secs: 0.0,
            artifacts: Vec::new(),
        }
    }
}

/// Runs the configured methods against a resolved problem.
pub trait MethodEvaluator {
    fn run_trials(
        &mut self,
        problem: &ProblemDescriptor,
        methods: &MethodOptions,
    ) -> BenchResult<RunReport>;
}

/// Writes the resolved problem and method options to
/// `<save_dir>/<prefix>.plan.json` without running any trials.
#[derive(Debug, Default)]
pub struct PlanRecorder {
    written: Vec<PathBuf>,
}

impl PlanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn plan_path(problem: &ProblemDescriptor) -> PathBuf {
        problem
            .save_results_dir
            .join(format!("{}.plan.json", problem.save_file_prefix))
    }
}

impl MethodEvaluator for PlanRecorder {
    fn run_trials(
        &mut self,
        problem: &ProblemDescriptor,
        methods: &MethodOptions,
    ) -> BenchResult<RunReport> {
        let mut report = RunReport::new(problem, methods);
        let path = Self::plan_path(problem);

        let plan = json!({
            "run_id": report.run_id,
            "started_at": report.started_at,
            "problem": problem.summary(),
            "methods": methods.to_json(),
        });
        let file = File::create(&path).map_err(|source| BenchError::Filesystem {
            path: path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &plan)?;

        info!(
            "Wrote plan for {} method(s) x {} trial(s) to {}",
            methods.len(),
            problem.num_trials,
            path.display()
        );
        report.artifacts.push(path.clone());
        self.written.push(path);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_methods::MethodConfigurator;
    use sb_problem::resolve_problem;
    use sb_types::{CapitalType, ExperimentConfig};
    use tempfile::TempDir;

    #[test]
    fn plan_file_holds_problem_and_methods() {
        let dir = TempDir::new().unwrap();
        let config = ExperimentConfig::new("park1")
            .with_debug(true)
            .with_save_dir(dir.path())
            .with_reporter("silent");
        let problem = resolve_problem(&config).unwrap();
        let methods = MethodConfigurator::new()
            .configure(&problem, &["dragonfly", "rand"], CapitalType::ReturnValue)
            .unwrap();

        let mut recorder = PlanRecorder::new();
        let report = recorder.run_trials(&problem, &methods).unwrap();

        let path = dir.path().join("park1-debug.plan.json");
        assert_eq!(report.artifacts, vec![path.clone()]);
        assert_eq!(recorder.written(), &[path.clone()]);
        assert_eq!(report.trials_planned, 3);
        assert_eq!(report.methods, vec![MethodKind::Dragonfly, MethodKind::Rand]);

        let plan: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(plan["problem"]["study_name"], "park1");
        assert_eq!(plan["problem"]["num_trials"], 3);
        assert_eq!(plan["methods"][0]["method"], "dragonfly");
        assert_eq!(plan["run_id"], report.run_id.to_string());
    }

    #[test]
    fn unwritable_plan_is_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let config = ExperimentConfig::new("park2")
            .with_save_dir(dir.path())
            .with_reporter("silent");
        let mut problem = resolve_problem(&config).unwrap();
        let methods = MethodConfigurator::new()
            .configure(&problem, &["rand"], CapitalType::ReturnValue)
            .unwrap();
        problem.save_results_dir = dir.path().join("gone");

        let err = PlanRecorder::new().run_trials(&problem, &methods).unwrap_err();
        assert!(matches!(err, BenchError::Filesystem { .. }));
    }
}
