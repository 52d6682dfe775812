//! Geometric Brownian Motion path generator, used only by the Monte-Carlo
//! cross-check in [`super::monte_carlo`].
//!
//! Language-binding scaffolding is dropped; the `rayon`-parallel path generation is
//! kept, since this module sits outside the single-threaded pricing/calibration core.

use rayon::prelude::*;

use super::rng::generate_normals;

/// Models `dS(t) = (drift) S(t) dt + (volatility) S(t) dW(t)`, solved via Ito's
/// lemma as `S(t) = S(0)·exp[(drift - volatility²/2)t + volatility·W(t)]`.
#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    spot: f64,
    drift: f64,
    volatility: f64,
    time_horizon: f64,
    num_steps: usize,
}

impl GeometricBrownianMotion {
    pub fn new(spot: f64, drift: f64, volatility: f64, time_horizon: f64, num_steps: usize) -> Self {
        assert!(spot > 0.0, "spot must be positive");
        assert!(volatility >= 0.0, "volatility must be non-negative");
        assert!(time_horizon > 0.0, "time_horizon must be positive");
        assert!(num_steps > 0, "num_steps must be positive");

        GeometricBrownianMotion {
            spot,
            drift,
            volatility,
            time_horizon,
            num_steps,
        }
    }

    /// One path of length `num_steps + 1`, including the initial spot.
    pub fn generate_path(&self) -> Vec<f64> {
        self.generate_path_impl()
    }

    /// `num_paths` independent paths, generated in parallel.
    pub fn generate_paths(&self, num_paths: usize) -> Vec<Vec<f64>> {
        (0..num_paths)
            .into_par_iter()
            .map(|_| self.generate_path_impl())
            .collect()
    }

    /// Terminal values `S(T)` from `num_paths` independent paths, generated in
    /// parallel. The cheapest call when only the distribution at expiry matters.
    pub fn terminal_prices(&self, num_paths: usize) -> Vec<f64> {
        (0..num_paths)
            .into_par_iter()
            .map(|_| *self.generate_path_impl().last().unwrap())
            .collect()
    }

    pub fn dt(&self) -> f64 {
        self.time_horizon / self.num_steps as f64
    }

    fn generate_path_impl(&self) -> Vec<f64> {
        let dt = self.dt();
        let dt_sqrt = dt.sqrt();
        let increments = generate_normals(self.num_steps);

        let drift_term = (self.drift - 0.5 * self.volatility * self.volatility) * dt;
        let vol_term = self.volatility * dt_sqrt;

        let mut path = Vec::with_capacity(self.num_steps + 1);
        path.push(self.spot);

        let mut s = self.spot;
        for &z in &increments {
            s *= (drift_term + vol_term * z).exp();
            path.push(s);
        }

        path
    }
}
