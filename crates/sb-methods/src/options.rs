//! Default option schema shared by the Gaussian-process bandit family.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A plain option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One entry of an option schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: OptionValue,
    pub help: &'static str,
}

fn spec(name: &'static str, default: impl Into<OptionValue>, help: &'static str) -> OptionSpec {
    OptionSpec {
        name,
        default: default.into(),
        help,
    }
}

/// Option schema of Euclidean GP-bandit methods: bandit, GP and
/// Euclidean-specific options together.
pub fn gp_bandit_option_schema() -> &'static [OptionSpec] {
    static SCHEMA: OnceLock<Vec<OptionSpec>> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        vec![
            // Bandit
            spec("acq", "default", "Acquisition(s) to use, separated by '-'."),
            spec("acq_probs", "adaptive", "How to choose between acquisitions."),
            spec("acq_opt_method", "default", "Optimizer for the acquisition."),
            spec("acq_opt_max_evals", -1i64, "Evaluation budget of the acquisition optimizer."),
            spec("handle_parallel", "halluc", "How to handle pending evaluations."),
            spec("init_capital", "default", "Capital spent on initialisation."),
            OptionSpec {
                name: "init_capital_frac",
                default: OptionValue::Null,
                help: "Fraction of capital spent on initialisation.",
            },
            spec("num_init_evals", 20i64, "Initial evaluations when no capital is given."),
            spec("build_new_model_every", 17i64, "Rebuild the model after this many steps."),
            spec(
                "perturb_thresh",
                1e-4,
                "Perturb a chosen point closer than this to an evaluated one.",
            ),
            spec("next_pt_std_thresh", 0.005, "Resample when the posterior std is below this."),
            spec("mode", "asy", "Synchronous ('syn') or asynchronous ('asy') dispatch."),
            // Gaussian process
            spec("kernel_type", "default", "Kernel of the GP."),
            spec("use_same_bandwidth", false, "Share one bandwidth across dimensions."),
            spec("mean_func_type", "tune", "Mean function of the GP."),
            spec("noise_var_type", "tune", "How to set the GP noise variance."),
            spec("hp_tune_criterion", "ml-post_sampling", "Hyper-parameter tuning criterion."),
            spec("hp_tune_max_evals", -1i64, "Evaluation budget for hyper-parameter tuning."),
            spec("ml_hp_tune_opt", "default", "Optimizer for marginal-likelihood tuning."),
            spec("post_hp_tune_method", "slice", "Sampler for posterior hyper-parameters."),
            spec("matern_nu", -1.0, "Matern smoothness; negative means tune."),
            spec("poly_order", 1i64, "Order of the polynomial kernel."),
            spec("esp_order", -1i64, "Order of the additive ESP kernel; negative means tune."),
            spec("esp_kernel_type", "se", "Base kernel of the ESP kernel."),
            // Euclidean specific
            spec("euc_init_method", "latin_hc", "Initialisation for Euclidean domains."),
        ]
    })
}

/// A fresh, independently owned copy of a schema's defaults.
pub fn load_options(schema: &[OptionSpec]) -> BTreeMap<String, OptionValue> {
    schema
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default.clone()))
        .collect()
}
