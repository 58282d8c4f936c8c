//! Static per-study parameters.

use sb_types::{study_prefix, BenchResult, ConfigError};
use serde::Serialize;

/// Noise scale, initial-pool size and fidelity dimensionality of a study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudyParameters {
    pub name: &'static str,
    /// Standard deviation of the Gaussian evaluation noise.
    pub noise_scale: f64,
    /// Number of points in the initial evaluation pool.
    pub initial_pool_size: usize,
    /// Dimensionality of the fidelity space, if the study is multi-fidelity.
    pub fidel_dim: Option<usize>,
}

const STUDIES: &[StudyParameters] = &[
    StudyParameters {
        name: "hartmann3",
        noise_scale: 0.1,
        initial_pool_size: 20,
        fidel_dim: Some(2),
    },
    StudyParameters {
        name: "hartmann6",
        noise_scale: 0.1,
        initial_pool_size: 30,
        fidel_dim: Some(1),
    },
    StudyParameters {
        name: "hartmann",
        noise_scale: 0.1,
        initial_pool_size: 30,
        fidel_dim: Some(1),
    },
    StudyParameters {
        name: "branin",
        noise_scale: 0.1,
        initial_pool_size: 20,
        fidel_dim: Some(3),
    },
    StudyParameters {
        name: "borehole",
        noise_scale: 5.0,
        initial_pool_size: 40,
        fidel_dim: Some(1),
    },
    StudyParameters {
        name: "park1",
        noise_scale: 0.2,
        initial_pool_size: 30,
        fidel_dim: None,
    },
    StudyParameters {
        name: "park2",
        noise_scale: 0.1,
        initial_pool_size: 30,
        fidel_dim: None,
    },
];

impl StudyParameters {
    /// Parameters for a study; the part of the name after the first hyphen is ignored.
    pub fn lookup(study_name: &str) -> BenchResult<&'static StudyParameters> {
        let prefix = study_prefix(study_name);
        STUDIES
            .iter()
            .find(|study| study.name == prefix)
            .ok_or_else(|| {
                ConfigError::UnknownStudy {
                    study: study_name.to_string(),
                }
                .into()
            })
    }

    /// Every recognised study name.
    pub fn names() -> impl Iterator<Item = &'static str> {
        STUDIES.iter().map(|study| study.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::function_names;
    use std::collections::HashSet;

    #[test]
    fn one_entry_per_study() {
        let names: Vec<_> = StudyParameters::names().collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), 7);
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn every_study_has_a_function() {
        let functions: HashSet<_> = function_names().collect();
        for name in StudyParameters::names() {
            assert!(functions.contains(name), "no synthetic function for {name}");
        }
    }

    #[test]
    fn lookup_by_prefix() {
        let params = StudyParameters::lookup("borehole-debug").unwrap();
        assert_eq!(params.name, "borehole");
        assert_eq!(params.noise_scale, 5.0);
        assert_eq!(params.initial_pool_size, 40);
        assert_eq!(params.fidel_dim, Some(1));

        assert_eq!(StudyParameters::lookup("park1").unwrap().fidel_dim, None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(StudyParameters::lookup("Branin").unwrap_err().is_config());
        assert!(StudyParameters::lookup("currin_exp").is_err());
    }
}
