//! Small closed vocabularies shared by problem resolution and method configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Observation noise applied by the function caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    /// Noiseless evaluations.
    NoNoise,
    /// Additive zero-mean Gaussian noise.
    Gauss,
}

impl NoiseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoNoise => "no_noise",
            Self::Gauss => "gauss",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the simulated worker pool decides how long an evaluation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeDistribution {
    /// Every evaluation takes one unit of time.
    #[serde(rename = "const")]
    Const,
    /// The caller reports the cost of each evaluation.
    #[serde(rename = "caller_eval_cost")]
    CallerEvalCost,
    /// Uniform on [0, 2].
    #[serde(rename = "uniform")]
    Uniform,
    /// Half-normal with unit mean.
    #[serde(rename = "halfnormal")]
    HalfNormal,
}

impl TimeDistribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::CallerEvalCost => "caller_eval_cost",
            Self::Uniform => "uniform",
            Self::HalfNormal => "halfnormal",
        }
    }
}

impl Default for TimeDistribution {
    fn default() -> Self {
        Self::Const
    }
}

impl fmt::Display for TimeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeDistribution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "const" => Ok(Self::Const),
            "caller_eval_cost" => Ok(Self::CallerEvalCost),
            "uniform" => Ok(Self::Uniform),
            "halfnormal" => Ok(Self::HalfNormal),
            other => Err(ConfigError::Invalid {
                message: format!("unknown time distribution '{other}'"),
            }),
        }
    }
}

/// Unit in which an optimization trial's capital (budget) is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapitalType {
    /// Number of returned evaluations.
    #[serde(rename = "return_value")]
    ReturnValue,
    /// Wall-clock seconds.
    #[serde(rename = "realtime")]
    RealTime,
    /// CPU seconds.
    #[serde(rename = "cputime")]
    CpuTime,
}

impl CapitalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReturnValue => "return_value",
            Self::RealTime => "realtime",
            Self::CpuTime => "cputime",
        }
    }
}

impl Default for CapitalType {
    fn default() -> Self {
        Self::ReturnValue
    }
}

impl fmt::Display for CapitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapitalType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "return_value" => Ok(Self::ReturnValue),
            "realtime" => Ok(Self::RealTime),
            "cputime" => Ok(Self::CpuTime),
            other => Err(ConfigError::Invalid {
                message: format!("unknown capital type '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_identifiers() {
        assert_eq!(serde_json::to_string(&NoiseType::NoNoise).unwrap(), "\"no_noise\"");
        assert_eq!(serde_json::to_string(&NoiseType::Gauss).unwrap(), "\"gauss\"");
        assert_eq!(
            serde_json::to_string(&TimeDistribution::CallerEvalCost).unwrap(),
            "\"caller_eval_cost\""
        );
        assert_eq!(
            serde_json::to_string(&CapitalType::ReturnValue).unwrap(),
            "\"return_value\""
        );
    }

    #[test]
    fn parse_time_distribution() {
        assert_eq!("const".parse::<TimeDistribution>().unwrap(), TimeDistribution::Const);
        assert_eq!(
            "halfnormal".parse::<TimeDistribution>().unwrap(),
            TimeDistribution::HalfNormal
        );
        assert!("pareto".parse::<TimeDistribution>().is_err());
    }

    #[test]
    fn parse_capital_type() {
        for capital in [CapitalType::ReturnValue, CapitalType::RealTime, CapitalType::CpuTime] {
            assert_eq!(capital.as_str().parse::<CapitalType>().unwrap(), capital);
        }
        assert!("seconds".parse::<CapitalType>().is_err());
    }
}
