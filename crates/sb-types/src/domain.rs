use serde::{Deserialize, Serialize};

/// Axis-aligned box over which a synthetic function is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Lower and upper bound for each dimension.
    pub bounds: Vec<(f64, f64)>,
}

impl Domain {
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self { bounds }
    }

    /// The unit hypercube [0, 1]^dim.
    pub fn unit(dim: usize) -> Self {
        Self {
            bounds: vec![(0.0, 1.0); dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.bounds.len()
            && x
                .iter()
                .zip(&self.bounds)
                .all(|(v, (low, high))| *v >= *low && *v <= *high)
    }

    /// Project a point onto the box.
    pub fn clip(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(&self.bounds)
            .map(|(v, (low, high))| v.clamp(*low, *high))
            .collect()
    }
}
