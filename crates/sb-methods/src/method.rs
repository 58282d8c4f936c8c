//! Closed set of optimization methods the harness knows how to configure.

use sb_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An optimization method (or adapter) that can be benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Uniform random search.
    Rand,
    /// Gaussian-process bandit engine.
    Dragonfly,
    /// Parallel deterministic optimistic optimization.
    Pdoo,
    /// GPyOpt Bayesian optimization adapter.
    Gpyopt,
    /// Tree-structured Parzen estimator adapter.
    Hyperopt,
    /// Random-forest SMAC adapter.
    Smac,
    /// Process-isolated Spearmint optimizer.
    Spearmint,
}

impl MethodKind {
    pub const ALL: [MethodKind; 7] = [
        Self::Rand,
        Self::Dragonfly,
        Self::Pdoo,
        Self::Gpyopt,
        Self::Hyperopt,
        Self::Smac,
        Self::Spearmint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rand => "rand",
            Self::Dragonfly => "dragonfly",
            Self::Pdoo => "pdoo",
            Self::Gpyopt => "gpyopt",
            Self::Hyperopt => "hyperopt",
            Self::Smac => "smac",
            Self::Spearmint => "spearmint",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMethod {
                method: s.to_string(),
            })
    }
}
