//! Per-method option records built from a resolved problem.

use sb_problem::{Objective, ProblemDescriptor};
use sb_types::{BenchResult, CapitalType, ConfigError, DependencyError, ExternalProcessPaths};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::method::MethodKind;
use crate::options::{gp_bandit_option_schema, load_options, OptionValue};
use crate::tpe::{SpaceConstructor, TpeAlgorithm, TpeBackend};

/// Structural, method-specific additions to an option record.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOverrides {
    /// Method runs from the shared defaults alone.
    None,
    /// Method drives the objective directly.
    Objective { func: Objective },
    /// Tree-structured Parzen method: objective plus algorithm and space handles.
    Tpe {
        func: Objective,
        algo: TpeAlgorithm,
        space: SpaceConstructor,
    },
    /// Process-isolated method working out of two directories.
    ExternalProcess { exp_dir: PathBuf, pkg_dir: PathBuf },
}

/// Resolved configuration for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOptionRecord {
    pub method: MethodKind,
    pub capital_type: CapitalType,
    /// Plain options seeded from the GP-bandit schema, plus `capital_type`.
    pub options: BTreeMap<String, OptionValue>,
    pub overrides: MethodOverrides,
}

impl MethodOptionRecord {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Objective handle, for methods that call the function themselves.
    pub fn func(&self) -> Option<&Objective> {
        match &self.overrides {
            MethodOverrides::Objective { func } | MethodOverrides::Tpe { func, .. } => Some(func),
            _ => None,
        }
    }

    /// JSON view of the record; handles are rendered by name.
    pub fn to_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .options
            .iter()
            .map(|(name, value)| (name.clone(), json!(value)))
            .collect();
        match &self.overrides {
            MethodOverrides::None => {}
            MethodOverrides::Objective { func } => {
                map.insert("func".to_string(), json!(func.name()));
            }
            MethodOverrides::Tpe { func, algo, .. } => {
                map.insert("func".to_string(), json!(func.name()));
                map.insert("algo".to_string(), json!(algo.name()));
                map.insert("space".to_string(), json!("uniform"));
            }
            MethodOverrides::ExternalProcess { exp_dir, pkg_dir } => {
                map.insert("exp_dir".to_string(), json!(exp_dir));
                map.insert("pkg_dir".to_string(), json!(pkg_dir));
            }
        }
        Value::Object(map)
    }
}

/// Option records keyed by method, in request order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodOptions {
    records: Vec<MethodOptionRecord>,
}

impl MethodOptions {
    pub fn get(&self, method: MethodKind) -> Option<&MethodOptionRecord> {
        self.records.iter().find(|record| record.method == method)
    }

    pub fn keys(&self) -> impl Iterator<Item = MethodKind> + '_ {
        self.records.iter().map(|record| record.method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodOptionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<MethodOptionRecord> {
        self.records
    }

    /// Ordered JSON array of `{"method": ..., "options": ...}` objects.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.records
                .iter()
                .map(|record| json!({ "method": record.method, "options": record.to_json() }))
                .collect(),
        )
    }
}

/// Builds [`MethodOptions`] for a resolved problem.
///
/// Optional collaborators are injected: the TPE backend needed by
/// [`MethodKind::Hyperopt`] and the directories needed by
/// [`MethodKind::Spearmint`].
#[derive(Debug, Clone, Default)]
pub struct MethodConfigurator {
    tpe: Option<Arc<dyn TpeBackend>>,
    external: Option<ExternalProcessPaths>,
}

impl MethodConfigurator {
    /// A configurator with no optional collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tpe(mut self, backend: Option<Arc<dyn TpeBackend>>) -> Self {
        self.tpe = backend;
        self
    }

    pub fn with_external(mut self, paths: Option<ExternalProcessPaths>) -> Self {
        self.external = paths;
        self
    }

    /// One record per requested identifier, in request order.
    ///
    /// Every identifier is parsed and every override built before anything is
    /// returned; any failure fails the whole call.
    pub fn configure<S: AsRef<str>>(
        &self,
        problem: &ProblemDescriptor,
        method_ids: &[S],
        capital_type: CapitalType,
    ) -> BenchResult<MethodOptions> {
        let mut seen = HashSet::new();
        let mut kinds = Vec::with_capacity(method_ids.len());
        for id in method_ids {
            let id = id.as_ref();
            let kind: MethodKind = id.parse()?;
            if !seen.insert(kind) {
                return Err(ConfigError::DuplicateMethod {
                    method: id.to_string(),
                }
                .into());
            }
            kinds.push(kind);
        }

        let schema = gp_bandit_option_schema();
        let mut records = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let overrides = self.overrides_for(kind, problem)?;
            debug!("Configured {} with overrides {:?}", kind, overrides);
            let mut options = load_options(schema);
            options.insert(
                "capital_type".to_string(),
                OptionValue::from(capital_type.as_str()),
            );
            records.push(MethodOptionRecord {
                method: kind,
                capital_type,
                options,
                overrides,
            });
        }

        info!(
            "Configured {} method(s) for {}: {}",
            records.len(),
            problem.study_name,
            records
                .iter()
                .map(|record| record.method.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(MethodOptions { records })
    }

    fn overrides_for(
        &self,
        kind: MethodKind,
        problem: &ProblemDescriptor,
    ) -> BenchResult<MethodOverrides> {
        match kind {
            MethodKind::Rand | MethodKind::Dragonfly => Ok(MethodOverrides::None),
            MethodKind::Pdoo | MethodKind::Gpyopt | MethodKind::Smac => {
                Ok(MethodOverrides::Objective {
                    func: problem.objective.clone(),
                })
            }
            MethodKind::Hyperopt => {
                let backend = self.tpe.as_ref().ok_or_else(|| DependencyError::Missing {
                    capability: "tpe".to_string(),
                    method: kind.to_string(),
                })?;
                Ok(MethodOverrides::Tpe {
                    func: problem.objective.clone(),
                    algo: backend.algorithm(),
                    space: backend.uniform_space(),
                })
            }
            MethodKind::Spearmint => {
                let paths =
                    self.external
                        .as_ref()
                        .ok_or_else(|| ConfigError::MissingExternalPaths {
                            method: kind.to_string(),
                        })?;
                Ok(MethodOverrides::ExternalProcess {
                    exp_dir: paths.exp_dir(&problem.study_name),
                    pkg_dir: paths.pkg_dir.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tpe::default_backend;
    use sb_problem::resolve_problem;
    use sb_types::{BenchError, ExperimentConfig};
    use tempfile::TempDir;

    fn problem(dir: &TempDir, study: &str) -> ProblemDescriptor {
        let config = ExperimentConfig::new(study)
            .with_save_dir(dir.path().join("results"))
            .with_reporter("silent")
            .with_seed(5);
        resolve_problem(&config).unwrap()
    }

    fn configurator() -> MethodConfigurator {
        MethodConfigurator::new()
            .with_tpe(default_backend())
            .with_external(Some(ExternalProcessPaths::new("/srv/exp", "/srv/spearmint")))
    }

    #[test]
    fn rand_and_dragonfly_keep_request_order() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let options = configurator()
            .configure(&problem, &["rand", "dragonfly"], CapitalType::ReturnValue)
            .unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(
            options.keys().collect::<Vec<_>>(),
            vec![MethodKind::Rand, MethodKind::Dragonfly]
        );
        for record in options.iter() {
            assert_eq!(record.capital_type, CapitalType::ReturnValue);
            assert_eq!(record.overrides, MethodOverrides::None);
            assert!(record.func().is_none());
        }

        let reversed = configurator()
            .configure(&problem, &["dragonfly", "rand"], CapitalType::ReturnValue)
            .unwrap();
        assert_eq!(
            reversed.keys().collect::<Vec<_>>(),
            vec![MethodKind::Dragonfly, MethodKind::Rand]
        );
    }

    #[cfg(feature = "tpe")]
    #[test]
    fn capital_type_is_applied_to_every_record() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "branin");
        let ids: Vec<&str> = MethodKind::ALL.iter().map(MethodKind::as_str).collect();
        let options = configurator()
            .configure(&problem, &ids, CapitalType::RealTime)
            .unwrap();
        assert_eq!(options.len(), MethodKind::ALL.len());
        assert!(options.iter().all(|r| r.capital_type == CapitalType::RealTime));
    }

    #[test]
    fn capital_type_is_part_of_the_option_mapping() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let options = MethodConfigurator::new()
            .configure(&problem, &["rand", "pdoo"], CapitalType::CpuTime)
            .unwrap();
        for record in options.iter() {
            assert_eq!(record.get("capital_type"), Some(&OptionValue::from("cputime")));
            assert_eq!(record.options.len(), gp_bandit_option_schema().len() + 1);
            assert_eq!(record.to_json()["capital_type"], "cputime");
        }
    }

    #[cfg(feature = "tpe")]
    #[test]
    fn function_access_methods_share_the_problem_objective() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "hartmann3");
        let options = configurator()
            .configure(
                &problem,
                &["pdoo", "gpyopt", "smac", "hyperopt"],
                CapitalType::ReturnValue,
            )
            .unwrap();
        for record in options.iter() {
            let func = record.func().expect("objective override");
            assert!(func.same_as(&problem.objective));
            let at_opt = func.eval(&problem.opt_pt).unwrap();
            assert!((at_opt - problem.max_val()).abs() < 1e-5);
        }
    }

    #[cfg(feature = "tpe")]
    #[test]
    fn hyperopt_gets_tpe_handles() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "branin");
        let backend = default_backend().unwrap();
        let options = MethodConfigurator::new()
            .with_tpe(Some(backend.clone()))
            .configure(&problem, &["hyperopt"], CapitalType::ReturnValue)
            .unwrap();

        match &options.get(MethodKind::Hyperopt).unwrap().overrides {
            MethodOverrides::Tpe { algo, space, .. } => {
                assert_eq!(*algo, backend.algorithm());
                let dims = space.for_domain(&problem.domain);
                assert_eq!(dims.len(), 2);
                assert_eq!((dims[0].low, dims[0].high), (-5.0, 10.0));
            }
            other => panic!("expected TPE overrides, got {other:?}"),
        }
    }

    #[test]
    fn hyperopt_without_backend_is_missing_dependency() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let err = MethodConfigurator::new()
            .configure(&problem, &["rand", "hyperopt"], CapitalType::ReturnValue)
            .unwrap_err();
        assert!(err.is_missing_dependency());
        match err {
            BenchError::Dependency(DependencyError::Missing { capability, method }) => {
                assert_eq!(capability, "tpe");
                assert_eq!(method, "hyperopt");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn other_methods_do_not_need_the_backend() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let options = MethodConfigurator::new()
            .configure(&problem, &["rand", "dragonfly", "pdoo"], CapitalType::ReturnValue)
            .unwrap();
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn spearmint_paths_follow_study_prefix() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "borehole-debug");
        let options = configurator()
            .configure(&problem, &["spearmint"], CapitalType::ReturnValue)
            .unwrap();
        assert_eq!(
            options.get(MethodKind::Spearmint).unwrap().overrides,
            MethodOverrides::ExternalProcess {
                exp_dir: PathBuf::from("/srv/exp/borehole"),
                pkg_dir: PathBuf::from("/srv/spearmint"),
            }
        );
    }

    #[test]
    fn spearmint_without_paths_is_config_error() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let err = MethodConfigurator::new()
            .configure(&problem, &["spearmint"], CapitalType::ReturnValue)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn unknown_or_duplicate_identifiers_fail_whole_call() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let err = configurator()
            .configure(&problem, &["rand", "cmaes"], CapitalType::ReturnValue)
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Config(ConfigError::UnknownMethod { ref method }) if method == "cmaes"
        ));

        let err = configurator()
            .configure(&problem, &["rand", "rand"], CapitalType::ReturnValue)
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(ConfigError::DuplicateMethod { .. })));
    }

    #[test]
    fn repeated_calls_give_equal_but_independent_records() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park2");
        let configurator = configurator();
        let first = configurator
            .configure(&problem, &["rand", "dragonfly"], CapitalType::ReturnValue)
            .unwrap();
        let second = configurator
            .configure(&problem, &["rand", "dragonfly"], CapitalType::ReturnValue)
            .unwrap();
        assert_eq!(first, second);

        let mut records = first.into_records();
        records[0]
            .options
            .insert("acq".to_string(), OptionValue::from("ucb"));
        assert_eq!(
            second.get(MethodKind::Rand).unwrap().get("acq"),
            Some(&OptionValue::from("default"))
        );
        // Records within one call do not alias each other either.
        assert_eq!(records[1].get("acq"), Some(&OptionValue::from("default")));
    }

    #[test]
    fn json_view_is_ordered_and_names_handles() {
        let dir = TempDir::new().unwrap();
        let problem = problem(&dir, "park1");
        let options = configurator()
            .configure(&problem, &["spearmint", "gpyopt", "rand"], CapitalType::ReturnValue)
            .unwrap();
        let json = options.to_json();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["method"], "spearmint");
        assert_eq!(entries[0]["options"]["exp_dir"], "/srv/exp/park1");
        assert_eq!(entries[1]["options"]["func"], "park1");
        assert_eq!(entries[2]["options"]["capital_type"], "return_value");
        assert!(entries[2]["options"].get("func").is_none());
    }
}
