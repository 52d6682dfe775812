//! Calibration objective adapters over the single-jump model (C7).
//!
//! Grounded on `Part B/PartB.cpp`'s `meanSquaredErrorPartB6`/`optimisePartB6` (the
//! partial, two-parameter calibration over diffusion and jump volatility) and
//! `meanSquaredErrorPartB7`/`optimisePartB7` (the full, five-parameter calibration
//! over cost of carry, discount rate, diffusion volatility, dividend amount, and
//! jump volatility). Both price every observed quote via Richardson extrapolation
//! and minimise the mean squared pricing error with [`crate::optimize::DifferentialEvolution`].

use crate::error::{PricingError, Result};
use crate::models::SingleJumpModel;
use crate::option::{ObservedPrice, VanillaOption};
use crate::optimize::{Bound, DifferentialEvolution, OptimisationResult};
use crate::tree::richardson;
use crate::tree::states::Implementation;

/// A batch of market-observed vanilla option prices to calibrate a
/// [`SingleJumpModel`] against, plus the pricing configuration used to reprice each
/// candidate parameter vector during optimisation.
pub struct CalibrationProblem {
    base_model: SingleJumpModel,
    observed: Vec<ObservedPrice>,
    n_steps: usize,
    use_smoothing: bool,
    implementation: Implementation,
    upper_sd: f64,
    lower_sd: f64,
}

impl CalibrationProblem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_model: SingleJumpModel,
        observed: Vec<ObservedPrice>,
        n_steps: usize,
        use_smoothing: bool,
        implementation: Implementation,
        upper_sd: f64,
        lower_sd: f64,
    ) -> Result<Self> {
        if observed.is_empty() {
            return Err(PricingError::InvalidInput(
                "calibration requires at least one observed price".to_string(),
            ));
        }
        for quote in &observed {
            if quote.option.underlying_code() != base_model.underlying_code() {
                return Err(PricingError::InvalidInput(format!(
                    "observed option underlying {} does not match model underlying {}",
                    quote.option.underlying_code(),
                    base_model.underlying_code()
                )));
            }
        }
        Ok(CalibrationProblem {
            base_model,
            observed,
            n_steps,
            use_smoothing,
            implementation,
            upper_sd,
            lower_sd,
        })
    }

    /// Mean squared error of `params = [sigma, sigma_j]` against the observed quotes.
    /// Infinite if the candidate is numerically infeasible (e.g. a construction or
    /// pricing failure), so the optimiser simply never selects it.
    pub fn partial_objective(&self, params: &[f64]) -> f64 {
        if params.len() != 2 {
            return f64::INFINITY;
        }
        match self.base_model.with_volatilities(params[0], params[1]) {
            Ok(model) => self.mean_squared_error(&model),
            Err(_) => f64::INFINITY,
        }
    }

    /// Mean squared error of `params = [cost_of_carry, discount_rate, sigma,
    /// dividend_amount, sigma_j]` against the observed quotes.
    pub fn full_objective(&self, params: &[f64]) -> f64 {
        if params.len() != 5 {
            return f64::INFINITY;
        }
        match self
            .base_model
            .with_full_parameters(params[0], params[1], params[2], params[3], params[4])
        {
            Ok(model) => self.mean_squared_error(&model),
            Err(_) => f64::INFINITY,
        }
    }

    fn mean_squared_error(&self, model: &SingleJumpModel) -> f64 {
        let options: Vec<VanillaOption> = self.observed.iter().map(|q| q.option.clone()).collect();
        match richardson::price_with_richardson(
            model,
            self.n_steps,
            &options,
            self.use_smoothing,
            self.implementation,
            self.upper_sd,
            self.lower_sd,
        ) {
            Ok(prices) => {
                let n = prices.len() as f64;
                let mse = prices
                    .iter()
                    .zip(self.observed.iter())
                    .map(|(price, quote)| (price - quote.price).powi(2))
                    .sum::<f64>()
                    / n;
                tracing::trace!(mse, n_options = prices.len(), "calibration objective evaluated");
                mse
            }
            Err(_) => f64::INFINITY,
        }
    }

    /// Calibrates `[sigma, sigma_j]` by differential evolution over the given bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate_partial(
        &self,
        sigma_bounds: Bound,
        sigma_j_bounds: Bound,
        population_size: usize,
        mutation_factor: f64,
        crossover_rate: f64,
        max_generations: usize,
        tolerance: f64,
        seed: u64,
    ) -> Result<OptimisationResult> {
        let mut de = DifferentialEvolution::new(
            |params: &[f64]| self.partial_objective(params),
            vec![sigma_bounds, sigma_j_bounds],
            population_size,
            mutation_factor,
            crossover_rate,
            max_generations,
            tolerance,
            seed,
        )?;
        let result = de.optimise();
        tracing::debug!(
            sigma = result.best_params[0],
            sigma_j = result.best_params[1],
            mse = result.best_value,
            "partial calibration converged"
        );
        Ok(result)
    }

    /// Calibrates `[cost_of_carry, discount_rate, sigma, dividend_amount, sigma_j]`
    /// by differential evolution over the given bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate_full(
        &self,
        cost_of_carry_bounds: Bound,
        discount_rate_bounds: Bound,
        sigma_bounds: Bound,
        dividend_amount_bounds: Bound,
        sigma_j_bounds: Bound,
        population_size: usize,
        mutation_factor: f64,
        crossover_rate: f64,
        max_generations: usize,
        tolerance: f64,
        seed: u64,
    ) -> Result<OptimisationResult> {
        let mut de = DifferentialEvolution::new(
            |params: &[f64]| self.full_objective(params),
            vec![
                cost_of_carry_bounds,
                discount_rate_bounds,
                sigma_bounds,
                dividend_amount_bounds,
                sigma_j_bounds,
            ],
            population_size,
            mutation_factor,
            crossover_rate,
            max_generations,
            tolerance,
            seed,
        )?;
        let result = de.optimise();
        tracing::debug!(mse = result.best_value, "full calibration converged");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{ExerciseType, OptionRight, UnderlyingCode};

    fn code() -> UnderlyingCode {
        UnderlyingCode::new("TEST")
    }

    fn true_model() -> SingleJumpModel {
        SingleJumpModel::new(0.0, 0.06, 0.15, 100.0, code(), 0.25, 2.0, 0.3, -0.05, 0.2).unwrap()
    }

    fn synthetic_quotes(model: &SingleJumpModel) -> Vec<ObservedPrice> {
        let strikes = [90.0, 100.0, 110.0];
        let options: Vec<VanillaOption> = strikes
            .iter()
            .map(|&k| {
                VanillaOption::new(k, 0.5, ExerciseType::European, OptionRight::Put, code()).unwrap()
            })
            .collect();
        let prices = richardson::price_with_richardson(
            model,
            40,
            &options,
            true,
            Implementation::Crr,
            6.0,
            -6.0,
        )
        .unwrap();
        options
            .into_iter()
            .zip(prices)
            .map(|(option, price)| ObservedPrice { option, price })
            .collect()
    }

    #[test]
    fn rejects_empty_quote_batch() {
        let result = CalibrationProblem::new(
            true_model(),
            Vec::new(),
            40,
            true,
            Implementation::Crr,
            6.0,
            -6.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn partial_objective_is_zero_at_the_true_parameters() {
        let model = true_model();
        let quotes = synthetic_quotes(&model);
        let problem = CalibrationProblem::new(
            model.clone(),
            quotes,
            40,
            true,
            Implementation::Crr,
            6.0,
            -6.0,
        )
        .unwrap();
        let mse = problem.partial_objective(&[0.15, 0.2]);
        assert!(mse < 1e-10);
    }

    #[test]
    fn partial_calibration_recovers_volatilities() {
        let model = true_model();
        let quotes = synthetic_quotes(&model);
        let problem =
            CalibrationProblem::new(model, quotes, 30, true, Implementation::Crr, 6.0, -6.0)
                .unwrap();
        let result = problem
            .calibrate_partial(
                Bound::new(0.05, 0.4).unwrap(),
                Bound::new(0.05, 0.5).unwrap(),
                20,
                0.8,
                0.9,
                60,
                1e-10,
                11,
            )
            .unwrap();
        assert!((result.best_params[0] - 0.15).abs() < 0.05);
        assert!((result.best_params[1] - 0.2).abs() < 0.1);
    }

    // Scenario S6 (Problem 1): partial calibration with the scenario's exact
    // bounds, F, CR, and tolerance. The true model's volatilities are chosen to
    // fall inside those bounds so the optimum is reachable.
    #[test]
    fn scenario_s6_partial_calibration_terminates_within_tolerance() {
        let model =
            SingleJumpModel::new(0.0, 0.06, 0.15, 100.0, code(), 0.25, 2.0, 0.3, -0.05, 0.05)
                .unwrap();
        let quotes = synthetic_quotes(&model);
        let problem =
            CalibrationProblem::new(model, quotes, 200, true, Implementation::Crr, 6.0, -6.0)
                .unwrap();
        let result = problem
            .calibrate_partial(
                Bound::new(0.10, 0.20).unwrap(),
                Bound::new(0.01, 0.10).unwrap(),
                50,
                0.5,
                0.1,
                500,
                0.022,
                0,
            )
            .unwrap();
        assert!(result.best_value <= 0.022);
    }
}
