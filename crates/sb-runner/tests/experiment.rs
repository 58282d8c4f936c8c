use sb_methods::{default_backend, MethodKind, MethodOptions, MethodOverrides};
use sb_problem::{BufferReporter, ProblemDescriptor};
use sb_runner::{run_experiment, ExperimentRunner, MethodEvaluator, PlanRecorder, RunReport};
use sb_types::{
    BenchError, BenchResult, CapitalType, ExperimentConfig, ExternalProcessPaths, NoiseType,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Captures what the runner hands to the evaluator.
#[derive(Default)]
struct Capture {
    calls: usize,
    study: Option<String>,
    trials: usize,
    capital: f64,
    noise: Option<NoiseType>,
    methods: Vec<MethodKind>,
    overrides: Vec<MethodOverrides>,
}

impl MethodEvaluator for Capture {
    fn run_trials(
        &mut self,
        problem: &ProblemDescriptor,
        methods: &MethodOptions,
    ) -> BenchResult<RunReport> {
        self.calls += 1;
        self.study = Some(problem.study_name.clone());
        self.trials = problem.num_trials;
        self.capital = problem.max_capital;
        self.noise = Some(problem.noise_type);
        self.methods = methods.keys().collect();
        self.overrides = methods.iter().map(|r| r.overrides.clone()).collect();
        Ok(RunReport::new(problem, methods))
    }
}

fn config(dir: &TempDir, study: &str) -> ExperimentConfig {
    ExperimentConfig::new(study)
        .with_save_dir(dir.path().join("out"))
        .with_reporter("silent")
        .with_seed(11)
}

#[test]
fn debug_run_resolves_and_configures_in_order() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "hartmann6")
        .with_debug(true)
        .with_noise(true)
        .with_methods(["dragonfly", "rand", "pdoo"]);

    let mut capture = Capture::default();
    let report = run_experiment(&config, None, &mut capture).unwrap();

    assert_eq!(capture.calls, 1);
    assert_eq!(capture.study.as_deref(), Some("hartmann6"));
    assert_eq!(capture.trials, 3);
    assert_eq!(capture.capital, 10.0);
    assert_eq!(capture.noise, Some(NoiseType::Gauss));
    assert_eq!(
        capture.methods,
        vec![MethodKind::Dragonfly, MethodKind::Rand, MethodKind::Pdoo]
    );
    assert!(matches!(capture.overrides[2], MethodOverrides::Objective { .. }));
    assert_eq!(report.methods, capture.methods);
    assert!(report.elapsed_secs >= 0.0);
    assert!(dir.path().join("out").is_dir());
}

#[test]
fn timing_lines_go_to_reporter() {
    let dir = TempDir::new().unwrap();
    let reporter = Arc::new(BufferReporter::new());
    let runner = ExperimentRunner::new(None).with_reporter(reporter.clone());

    let report = runner
        .run(&config(&dir, "park2"), &mut Capture::default())
        .unwrap();

    let lines = reporter.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "");

    let real = lines[1]
        .strip_prefix("realtime taken: ")
        .expect("realtime prefix");
    assert_eq!(real.split('.').nth(1).map(str::len), Some(6));
    let real: f64 = real.parse().unwrap();
    assert!((real - report.elapsed_secs).abs() < 1e-6);

    let cpu = lines[2]
        .strip_prefix("cputime taken: ")
        .expect("cputime prefix");
    assert_eq!(cpu.split('.').nth(1).map(str::len), Some(6));
    let cpu: f64 = cpu.parse().unwrap();
    assert!((cpu - report.cpu_secs).abs() < 1e-6);
    assert!(report.cpu_secs >= 0.0);
}

#[test]
fn hyperopt_without_backend_stops_before_evaluation() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "branin").with_methods(["rand", "hyperopt"]);

    let mut capture = Capture::default();
    let err = run_experiment(&config, None, &mut capture).unwrap_err();
    assert!(err.is_missing_dependency());
    assert_eq!(capture.calls, 0);
}

#[test]
fn hyperopt_with_backend_reaches_evaluator() {
    let Some(backend) = default_backend() else {
        return;
    };
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "branin").with_methods(["hyperopt"]);

    let mut capture = Capture::default();
    run_experiment(&config, Some(backend), &mut capture).unwrap();
    assert!(matches!(capture.overrides[0], MethodOverrides::Tpe { .. }));
}

#[test]
fn unknown_study_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "rosenbrock");

    let err = run_experiment(&config, None, &mut Capture::default()).unwrap_err();
    assert!(err.is_config());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn spearmint_uses_configured_paths() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "park1-v2")
        .with_methods(["spearmint"])
        .with_external(ExternalProcessPaths::new(dir.path().join("exp"), "/opt/spearmint"));

    let mut capture = Capture::default();
    run_experiment(&config, None, &mut capture).unwrap();
    match &capture.overrides[0] {
        MethodOverrides::ExternalProcess { exp_dir, pkg_dir } => {
            assert_eq!(exp_dir, &dir.path().join("exp").join("park1"));
            assert_eq!(pkg_dir.to_str(), Some("/opt/spearmint"));
        }
        other => panic!("expected external-process overrides, got {other:?}"),
    }
    // Referenced, never created.
    assert!(!dir.path().join("exp").exists());
}

#[test]
fn plan_recorder_writes_plan_next_to_results() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "borehole").with_debug(true);

    let mut recorder = PlanRecorder::new();
    let report = run_experiment(&config, None, &mut recorder).unwrap();

    let plan_path = dir.path().join("out").join("borehole-debug.plan.json");
    assert_eq!(report.artifacts, vec![plan_path.clone()]);
    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(plan_path).unwrap()).unwrap();
    assert_eq!(plan["methods"].as_array().map(Vec::len), Some(2));
    assert_eq!(plan["methods"][1]["options"]["capital_type"], "return_value");
}

#[test]
fn evaluator_errors_propagate() {
    struct Failing;

    impl MethodEvaluator for Failing {
        fn run_trials(
            &mut self,
            _: &ProblemDescriptor,
            _: &MethodOptions,
        ) -> BenchResult<RunReport> {
            Err(sb_types::internal_error!("evaluator crashed"))
        }
    }

    let dir = TempDir::new().unwrap();
    let config = ExperimentConfig {
        capital_type: CapitalType::RealTime,
        ..config(&dir, "park2")
    };
    let err = run_experiment(&config, None, &mut Failing).unwrap_err();
    assert!(matches!(err, BenchError::Internal(ref msg) if msg == "evaluator crashed"));
}
