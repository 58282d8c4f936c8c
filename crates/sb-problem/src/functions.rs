//! Synthetic benchmark functions with known optima.
//!
//! Every function here is stored in *minimizing* form: `raw(opt_pt) == opt_val`
//! is the global minimum on the domain. Benchmarks that are naturally stated as
//! maximization problems (borehole, park) are stored negated.

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use sb_types::{study_prefix, validation_error, BenchResult, ConfigError, Domain, NoiseType};
use std::fmt;
use std::sync::Arc;

/// A minimizing test function.
pub type RawFn = fn(&[f64]) -> f64;

struct FunctionEntry {
    name: &'static str,
    raw: RawFn,
    bounds: &'static [(f64, f64)],
    opt_pt: &'static [f64],
    opt_val: f64,
}

const UNIT_3: &[(f64, f64)] = &[(0.0, 1.0); 3];
const UNIT_4: &[(f64, f64)] = &[(0.0, 1.0); 4];
const UNIT_6: &[(f64, f64)] = &[(0.0, 1.0); 6];

const BOREHOLE_BOUNDS: &[(f64, f64)] = &[
    (0.05, 0.15),        // rw: radius of borehole
    (100.0, 50000.0),    // r: radius of influence
    (63070.0, 115600.0), // Tu: transmissivity of upper aquifer
    (990.0, 1110.0),     // Hu: potentiometric head of upper aquifer
    (63.1, 116.0),       // Tl: transmissivity of lower aquifer
    (700.0, 820.0),      // Hl: potentiometric head of lower aquifer
    (1120.0, 1680.0),    // L: length of borehole
    (9855.0, 12045.0),   // Kw: hydraulic conductivity of borehole
];

const HARTMANN6_OPT: &[f64] = &[0.20169, 0.150011, 0.476874, 0.275332, 0.311652, 0.6573];

const FUNCTIONS: &[FunctionEntry] = &[
    FunctionEntry {
        name: "hartmann3",
        raw: hartmann3,
        bounds: UNIT_3,
        opt_pt: &[0.114614, 0.555649, 0.852547],
        opt_val: -3.862782,
    },
    FunctionEntry {
        name: "hartmann6",
        raw: hartmann6,
        bounds: UNIT_6,
        opt_pt: HARTMANN6_OPT,
        opt_val: -3.322368,
    },
    FunctionEntry {
        name: "hartmann",
        raw: hartmann6,
        bounds: UNIT_6,
        opt_pt: HARTMANN6_OPT,
        opt_val: -3.322368,
    },
    FunctionEntry {
        name: "branin",
        raw: branin,
        bounds: &[(-5.0, 10.0), (0.0, 15.0)],
        opt_pt: &[std::f64::consts::PI, 2.275],
        opt_val: 0.397887,
    },
    FunctionEntry {
        name: "borehole",
        raw: borehole,
        bounds: BOREHOLE_BOUNDS,
        opt_pt: &[0.15, 100.0, 115600.0, 1110.0, 116.0, 700.0, 1120.0, 12045.0],
        opt_val: -309.575588,
    },
    FunctionEntry {
        name: "park1",
        raw: park1,
        bounds: UNIT_4,
        opt_pt: &[1.0, 1.0, 1.0, 1.0],
        opt_val: -25.589254,
    },
    FunctionEntry {
        name: "park2",
        raw: park2,
        bounds: UNIT_4,
        opt_pt: &[1.0, 1.0, 1.0, 0.0],
        opt_val: -5.926037,
    },
];

/// Names of every function in the collection.
pub fn function_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|entry| entry.name)
}

// ---------------------------------------------------------------------------
// Function definitions
// ---------------------------------------------------------------------------

const HARTMANN_C: [f64; 4] = [1.0, 1.2, 3.0, 3.2];

fn hartmann_sum<const D: usize>(x: &[f64], a: &[[f64; D]; 4], p: &[[f64; D]; 4]) -> f64 {
    -HARTMANN_C
        .iter()
        .enumerate()
        .map(|(i, &ci)| {
            let inner_sum = a[i]
                .iter()
                .zip(p[i].iter())
                .zip(x.iter())
                .map(|((&aij, &pij), &xj)| aij * (xj - pij).powi(2))
                .sum::<f64>();
            ci * (-inner_sum).exp()
        })
        .sum::<f64>()
}

/// Hartmann 3-D: four local minima, global minimum -3.86278.
pub fn hartmann3(x: &[f64]) -> f64 {
    let a = [
        [3.0, 10.0, 30.0],
        [0.1, 10.0, 35.0],
        [3.0, 10.0, 30.0],
        [0.1, 10.0, 35.0],
    ];
    let p = [
        [0.3689, 0.1170, 0.2673],
        [0.4699, 0.4387, 0.7470],
        [0.1091, 0.8732, 0.5547],
        [0.03815, 0.5743, 0.8828],
    ];
    hartmann_sum(x, &a, &p)
}

/// Hartmann 6-D: six local minima, global minimum -3.32237.
pub fn hartmann6(x: &[f64]) -> f64 {
    let a = [
        [10.0, 3.0, 17.0, 3.5, 1.7, 8.0],
        [0.05, 10.0, 17.0, 0.1, 8.0, 14.0],
        [3.0, 3.5, 1.7, 10.0, 17.0, 8.0],
        [17.0, 8.0, 0.05, 10.0, 0.1, 14.0],
    ];
    let p = [
        [0.1312, 0.1696, 0.5569, 0.0124, 0.8283, 0.5886],
        [0.2329, 0.4135, 0.8307, 0.3736, 0.1004, 0.9991],
        [0.2348, 0.1451, 0.3522, 0.2883, 0.3047, 0.6650],
        [0.4047, 0.8828, 0.8732, 0.5743, 0.1091, 0.0381],
    ];
    hartmann_sum(x, &a, &p)
}

/// Branin: three global minima of 0.397887.
pub fn branin(x: &[f64]) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    let pi = std::f64::consts::PI;
    let b = 5.1 / (4.0 * pi.powi(2));
    let c = 5.0 / pi;
    let t = 1.0 / (8.0 * pi);
    (x2 - b * x1.powi(2) + c * x1 - 6.0).powi(2) + 10.0 * (1.0 - t) * x1.cos() + 10.0
}

/// Negated borehole water flow rate.
pub fn borehole(x: &[f64]) -> f64 {
    let (rw, r, tu, hu, tl, hl, l, kw) = (x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]);
    let log_ratio = (r / rw).ln();
    let denom = log_ratio * (1.0 + 2.0 * l * tu / (log_ratio * rw.powi(2) * kw) + tu / tl);
    -(2.0 * std::f64::consts::PI * tu * (hu - hl) / denom)
}

/// Negated Park (1991) function #1.
pub fn park1(x: &[f64]) -> f64 {
    let (x1, x2, x3, x4) = (x[0], x[1], x[2], x[3]);
    let first = x1 / 2.0 * ((1.0 + (x2 + x3.powi(2)) * x4 / x1.powi(2)).sqrt() - 1.0);
    let second = (x1 + 3.0 * x4) * (1.0 + x3.sin()).exp();
    -(first + second)
}

/// Negated Park (1991) function #2.
pub fn park2(x: &[f64]) -> f64 {
    let (x1, x2, x3, x4) = (x[0], x[1], x[2], x[3]);
    -(2.0 / 3.0 * (x1 + x2).exp() - x4 * x3.sin() + x3)
}

// ---------------------------------------------------------------------------
// Objective and function caller
// ---------------------------------------------------------------------------

/// Shared, maximizing view of a raw test function: `eval(x) == -raw(x)`.
///
/// Clones share the underlying function; two objectives compare equal only
/// when they are handles to the same function. Points must have exactly
/// `dim` coordinates.
#[derive(Clone)]
pub struct Objective {
    name: Arc<str>,
    dim: usize,
    func: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl Objective {
    /// Negate a minimizing function of `dim` inputs so that larger is better.
    pub fn negated(name: &str, dim: usize, raw: RawFn) -> Self {
        Self {
            name: Arc::from(name),
            dim,
            func: Arc::new(move |x: &[f64]| -raw(x)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Evaluate at `x`, rejecting points of the wrong dimension.
    pub fn eval(&self, x: &[f64]) -> BenchResult<f64> {
        if x.len() != self.dim {
            return Err(validation_error!(
                "{} takes {} coordinates, got {}",
                self.name,
                self.dim,
                x.len()
            ));
        }
        Ok((self.func)(x))
    }

    /// Whether both handles point at the same function.
    pub fn same_as(&self, other: &Objective) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl PartialEq for Objective {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective")
            .field("name", &self.name)
            .field("dim", &self.dim)
            .finish()
    }
}

/// Evaluation handle for the trial evaluator: maximizing objective plus noise.
#[derive(Debug)]
pub struct FunctionCaller {
    objective: Objective,
    domain: Domain,
    noise_type: NoiseType,
    noise_scale: Option<f64>,
    noise: Option<Normal<f64>>,
    fidel_dim: Option<usize>,
    rng: Mutex<ChaCha8Rng>,
}

impl FunctionCaller {
    fn new(
        objective: Objective,
        domain: Domain,
        noise_type: NoiseType,
        noise_scale: Option<f64>,
        fidel_dim: Option<usize>,
        seed: Option<u64>,
    ) -> BenchResult<Self> {
        let noise = match noise_type {
            NoiseType::NoNoise => None,
            NoiseType::Gauss => {
                let scale = noise_scale.ok_or_else(|| ConfigError::Invalid {
                    message: "gaussian noise requires a noise scale".to_string(),
                })?;
                let normal = Normal::new(0.0, scale).map_err(|e| ConfigError::Invalid {
                    message: format!("invalid noise scale {scale}: {e}"),
                })?;
                Some(normal)
            }
        };
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            objective,
            domain,
            noise_type,
            noise_scale,
            noise,
            fidel_dim,
            rng: Mutex::new(rng),
        })
    }

    /// Evaluate the objective, adding observation noise when configured.
    pub fn eval(&self, x: &[f64]) -> BenchResult<f64> {
        let value = self.objective.eval(x)?;
        Ok(match &self.noise {
            Some(normal) => value + normal.sample(&mut *self.rng.lock()),
            None => value,
        })
    }

    pub fn eval_noiseless(&self, x: &[f64]) -> BenchResult<f64> {
        self.objective.eval(x)
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn noise_type(&self) -> NoiseType {
        self.noise_type
    }

    pub fn noise_scale(&self) -> Option<f64> {
        self.noise_scale
    }

    pub fn fidel_dim(&self) -> Option<usize> {
        self.fidel_dim
    }

    /// Highest fidelity (all ones) when the study is multi-fidelity.
    pub fn fidel_to_opt(&self) -> Option<Vec<f64>> {
        self.fidel_dim.map(|dim| vec![1.0; dim])
    }
}

/// A resolved synthetic function together with its ground truth.
#[derive(Debug)]
pub struct SyntheticFunction {
    pub name: String,
    /// Minimizing form.
    pub raw: RawFn,
    pub opt_pt: Vec<f64>,
    /// Minimum of `raw`.
    pub opt_val: f64,
    pub domain: Domain,
    pub caller: FunctionCaller,
}

impl SyntheticFunction {
    /// Maximizing objective shared with the caller.
    pub fn objective(&self) -> Objective {
        self.caller.objective().clone()
    }
}

/// Look up a synthetic function by study name and build its caller.
///
/// Names are matched on the prefix before the first hyphen.
pub fn get_function(
    study_name: &str,
    noise_type: NoiseType,
    noise_scale: Option<f64>,
    fidel_dim: Option<usize>,
    seed: Option<u64>,
) -> BenchResult<SyntheticFunction> {
    let prefix = study_prefix(study_name);
    let entry = FUNCTIONS
        .iter()
        .find(|entry| entry.name == prefix)
        .ok_or_else(|| ConfigError::UnknownStudy {
            study: study_name.to_string(),
        })?;

    let domain = Domain::new(entry.bounds.to_vec());
    let objective = Objective::negated(entry.name, domain.dim(), entry.raw);
    let caller = FunctionCaller::new(
        objective,
        domain.clone(),
        noise_type,
        noise_scale,
        fidel_dim,
        seed,
    )?;

    Ok(SyntheticFunction {
        name: study_name.to_string(),
        raw: entry.raw,
        opt_pt: entry.opt_pt.to_vec(),
        opt_val: entry.opt_val,
        domain,
        caller,
    })
}
