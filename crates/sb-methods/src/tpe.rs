//! Tree-structured Parzen estimator capability.
//!
//! The TPE method is configured with two handles taken from a backend: an
//! algorithm that proposes the next point from past observations, and a
//! constructor for uniform search dimensions. The backend is optional; with
//! the `tpe` feature the crate binds [`ParzenBackend`] to the TPE sampler of
//! the `optimizer` crate.

use sb_types::{BenchResult, Domain};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A uniformly distributed search dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSpace {
    pub label: String,
    pub low: f64,
    pub high: f64,
}

/// An evaluated point; larger values are better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub point: Vec<f64>,
    pub value: f64,
}

type SuggestFn =
    dyn Fn(&[Observation], &[UniformSpace], u64) -> BenchResult<Vec<f64>> + Send + Sync;
type SpaceFn = dyn Fn(&str, f64, f64) -> UniformSpace + Send + Sync;

/// Handle to a suggestion algorithm. Clones share the algorithm.
#[derive(Clone)]
pub struct TpeAlgorithm {
    name: Arc<str>,
    suggest: Arc<SuggestFn>,
}

impl TpeAlgorithm {
    pub fn new<F>(name: &str, suggest: F) -> Self
    where
        F: Fn(&[Observation], &[UniformSpace], u64) -> BenchResult<Vec<f64>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: Arc::from(name),
            suggest: Arc::new(suggest),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Propose the next point to evaluate.
    pub fn suggest(
        &self,
        history: &[Observation],
        space: &[UniformSpace],
        seed: u64,
    ) -> BenchResult<Vec<f64>> {
        (self.suggest)(history, space, seed)
    }
}

impl PartialEq for TpeAlgorithm {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.suggest, &other.suggest)
    }
}

impl fmt::Debug for TpeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TpeAlgorithm").field("name", &self.name).finish()
    }
}

/// Handle to a uniform-dimension constructor. Clones share the constructor.
#[derive(Clone)]
pub struct SpaceConstructor {
    build: Arc<SpaceFn>,
}

impl SpaceConstructor {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&str, f64, f64) -> UniformSpace + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
        }
    }

    pub fn uniform(&self, label: &str, low: f64, high: f64) -> UniformSpace {
        (self.build)(label, low, high)
    }

    /// One dimension per domain coordinate, labelled `x0`, `x1`, ...
    pub fn for_domain(&self, domain: &Domain) -> Vec<UniformSpace> {
        domain
            .bounds
            .iter()
            .enumerate()
            .map(|(i, (low, high))| self.uniform(&format!("x{i}"), *low, *high))
            .collect()
    }
}

impl PartialEq for SpaceConstructor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.build, &other.build)
    }
}

impl fmt::Debug for SpaceConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpaceConstructor")
    }
}

/// Provider of the TPE handles.
pub trait TpeBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn algorithm(&self) -> TpeAlgorithm;

    fn uniform_space(&self) -> SpaceConstructor;
}

/// The backend compiled into this build, if any.
pub fn default_backend() -> Option<Arc<dyn TpeBackend>> {
    #[cfg(feature = "tpe")]
    {
        Some(Arc::new(ParzenBackend::new()))
    }
    #[cfg(not(feature = "tpe"))]
    {
        None
    }
}

#[cfg(feature = "tpe")]
pub use parzen::ParzenBackend;

#[cfg(feature = "tpe")]
mod parzen {
    use super::*;
    use optimizer::parameter::{FloatParam, ParamValue, Parameter};
    use optimizer::sampler::tpe::TpeSampler;
    use optimizer::{Direction, Study};
    use sb_types::internal_error;
    use std::collections::HashMap;

    /// Observations needed before the estimator replaces uniform sampling.
    const N_STARTUP: usize = 10;
    /// Fraction of observations treated as "good".
    const GAMMA: f64 = 0.25;
    /// Candidates scored per suggestion.
    const N_CANDIDATES: usize = 24;

    /// Backend over `optimizer`'s tree-structured Parzen sampler.
    #[derive(Debug, Clone)]
    pub struct ParzenBackend {
        algorithm: TpeAlgorithm,
        space: SpaceConstructor,
    }

    impl ParzenBackend {
        pub fn new() -> Self {
            Self {
                algorithm: TpeAlgorithm::new("tpe.suggest", suggest),
                space: SpaceConstructor::new(|label, low, high| UniformSpace {
                    label: label.to_string(),
                    low,
                    high,
                }),
            }
        }
    }

    impl Default for ParzenBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TpeBackend for ParzenBackend {
        fn name(&self) -> &str {
            "optimizer-tpe"
        }

        fn algorithm(&self) -> TpeAlgorithm {
            self.algorithm.clone()
        }

        fn uniform_space(&self) -> SpaceConstructor {
            self.space.clone()
        }
    }

    /// Replay `history` into a fresh maximizing study, then ask it for one point.
    ///
    /// Degenerate dimensions (`low >= high`) are pinned to `low` and kept out
    /// of the sampler.
    fn suggest(
        history: &[Observation],
        space: &[UniformSpace],
        seed: u64,
    ) -> BenchResult<Vec<f64>> {
        let sampler = TpeSampler::builder()
            .n_startup_trials(N_STARTUP)
            .n_ei_candidates(N_CANDIDATES)
            .gamma(GAMMA)
            .seed(seed)
            .build()
            .map_err(|e| internal_error!("failed to build TPE sampler: {e}"))?;
        let study: Study<f64> = Study::with_sampler(Direction::Maximize, sampler);

        let params: Vec<Option<FloatParam>> = space
            .iter()
            .map(|dim| (dim.high > dim.low).then(|| FloatParam::new(dim.low, dim.high)))
            .collect();

        let usable = history
            .iter()
            .filter(|obs| obs.point.len() == space.len() && obs.value.is_finite());
        for obs in usable {
            let fixed: HashMap<_, _> = params
                .iter()
                .zip(space)
                .zip(&obs.point)
                .filter_map(|((param, dim), &x)| {
                    param
                        .as_ref()
                        .map(|p| (p.id(), ParamValue::Float(x.clamp(dim.low, dim.high))))
                })
                .collect();
            study.enqueue(fixed);
            let mut trial = study.ask();
            for param in params.iter().flatten() {
                param
                    .suggest(&mut trial)
                    .map_err(|e| internal_error!("failed to replay observation: {e}"))?;
            }
            study.tell(trial, Ok::<_, &str>(obs.value));
        }

        let mut trial = study.ask();
        params
            .iter()
            .zip(space)
            .map(|(param, dim)| match param {
                Some(p) => p
                    .suggest(&mut trial)
                    .map_err(|e| internal_error!("TPE suggestion failed: {e}")),
                None => Ok(dim.low),
            })
            .collect()
    }
}
