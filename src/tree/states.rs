//! State/probability calculator (C2).
//!
//! Grounded on `Models/TreeModelUtilities/LogNormalDiffusionTreeHelper.{h,cpp}`:
//! `calculateDiffusionStatesAndProbabilities`, `calculateNormalJumpStatesAndProbabilities`,
//! and `calculateJumpDiffusionStatesAndProbabilities`.

use crate::error::{PricingError, Result};

/// Tree discretisation choice for the diffusion up/down states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Implementation {
    Crr,
    Tian,
}

/// A pair of aligned sequences (values, probabilities) with `Σp = 1` and
/// `values.len() == probabilities.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    pub values: Vec<f64>,
    pub probabilities: Vec<f64>,
}

impl DiscreteDistribution {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Up/down log-multipliers and their probabilities for one time step of size `dt`.
///
/// CRR: up = σ√dt, down = -σ√dt.
/// Tian: R = exp((r-q)dt), V = exp(σ²dt); up = ln(½RV(V+1+√(V²+2V-3))), down with the
/// square root negated.
///
/// Probabilities are identical for both: p_up = ½(1 + √dt(r-q-½σ²)/σ). If p_up falls
/// outside [0, 1] this is `InvalidDiscretisation` — the caller should use more steps.
pub fn diffusion_states_and_probabilities(
    dt: f64,
    sigma: f64,
    r: f64,
    q: f64,
    implementation: Implementation,
) -> Result<DiscreteDistribution> {
    let sqrt_dt = dt.sqrt();
    let p_up = 0.5 * (1.0 + sqrt_dt * (r - q - 0.5 * sigma * sigma) / sigma);
    if !(0.0..=1.0).contains(&p_up) {
        return Err(PricingError::InvalidDiscretisation { p_up });
    }

    let up = match implementation {
        Implementation::Crr => sigma * sqrt_dt,
        Implementation::Tian => {
            let big_r = ((r - q) * dt).exp();
            let big_v = (sigma * sigma * dt).exp();
            let inner = (big_v * big_v + 2.0 * big_v - 3.0).sqrt();
            (0.5 * big_r * big_v * (big_v + 1.0 + inner)).ln()
        }
    };
    let down = match implementation {
        Implementation::Crr => -sigma * sqrt_dt,
        Implementation::Tian => {
            let big_r = ((r - q) * dt).exp();
            let big_v = (sigma * sigma * dt).exp();
            let inner = (big_v * big_v + 2.0 * big_v - 3.0).sqrt();
            (0.5 * big_r * big_v * (big_v + 1.0 - inner)).ln()
        }
    };

    Ok(DiscreteDistribution {
        values: vec![up, down],
        probabilities: vec![p_up, 1.0 - p_up],
    })
}

/// The 5-atom moment-matched normal jump discretisation: values `μ + jσ_j` for
/// `j ∈ {+2, +1, 0, -1, -2}`, with fixed probabilities `{1/12, 1/6, 1/2, 1/6, 1/12}`.
pub fn jump_states_and_probabilities(mu: f64, sigma_j: f64) -> DiscreteDistribution {
    let offsets = [2.0, 1.0, 0.0, -1.0, -2.0];
    let probabilities = vec![1.0 / 12.0, 1.0 / 6.0, 1.0 / 2.0, 1.0 / 6.0, 1.0 / 12.0];
    let values = offsets.iter().map(|j| mu + j * sigma_j).collect();
    DiscreteDistribution {
        values,
        probabilities,
    }
}

/// The 10-atom Cartesian product of a jump and a diffusion distribution. Ordering
/// is load-bearing: for each jump atom (in the order of `jump`), emit all diffusion
/// atoms (in the order of `diffusion`). Consumers index into this distribution
/// positionally, so changing the loop nesting changes the contract.
pub fn jump_diffusion_states_and_probabilities(
    jump: &DiscreteDistribution,
    diffusion: &DiscreteDistribution,
) -> DiscreteDistribution {
    let mut values = Vec::with_capacity(jump.len() * diffusion.len());
    let mut probabilities = Vec::with_capacity(jump.len() * diffusion.len());
    for (jv, jp) in jump.values.iter().zip(&jump.probabilities) {
        for (dv, dp) in diffusion.values.iter().zip(&diffusion.probabilities) {
            values.push(jv + dv);
            probabilities.push(jp * dp);
        }
    }
    DiscreteDistribution {
        values,
        probabilities,
    }
}
