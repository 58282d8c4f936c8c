//! # sb-methods
//!
//! Optimization methods known to synbench and the [`MethodConfigurator`]
//! that turns a list of method identifiers into per-method option records
//! for a resolved problem.

pub mod configurator;
pub mod method;
pub mod options;
pub mod tpe;

pub use configurator::{MethodConfigurator, MethodOptionRecord, MethodOptions, MethodOverrides};
pub use method::MethodKind;
pub use options::{gp_bandit_option_schema, load_options, OptionSpec, OptionValue};
#[cfg(feature = "tpe")]
pub use tpe::ParzenBackend;
pub use tpe::{
    default_backend, Observation, SpaceConstructor, TpeAlgorithm, TpeBackend, UniformSpace,
};
