//! Plain log-normal diffusion model: no dividend, no jump.
//!
//! Grounded on `Models/BlackScholesModel.{h,cpp}` (field list: cost of carry,
//! discount rate, implied volatility, initial underlying price, underlying code)
//! and its `constructTree`/`treeNodeEuropeanOptionValue` overrides.

use crate::analytic::black_scholes_price;
use crate::error::{require_strictly_positive, Result};
use crate::models::TreeModel;
use crate::option::{OptionRight, UnderlyingCode, VanillaOption};
use crate::tree::builder::{construct_tree, TreeBuildParams};
use crate::tree::{Implementation, Tree};

/// A Black-Scholes log-normal diffusion with no scheduled events.
#[derive(Debug, Clone)]
pub struct BlackScholesModel {
    cost_of_carry: f64,
    discount_rate: f64,
    implied_volatility: f64,
    initial_underlying_price: f64,
    underlying_code: UnderlyingCode,
}

impl BlackScholesModel {
    pub fn new(
        cost_of_carry: f64,
        discount_rate: f64,
        implied_volatility: f64,
        initial_underlying_price: f64,
        underlying_code: UnderlyingCode,
    ) -> Result<Self> {
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_strictly_positive(initial_underlying_price, "initial_underlying_price")?;
        Ok(BlackScholesModel {
            cost_of_carry,
            discount_rate,
            implied_volatility,
            initial_underlying_price,
            underlying_code,
        })
    }

    pub fn cost_of_carry(&self) -> f64 {
        self.cost_of_carry
    }

    pub fn implied_volatility(&self) -> f64 {
        self.implied_volatility
    }

    pub fn initial_underlying_price(&self) -> f64 {
        self.initial_underlying_price
    }
}

impl TreeModel for BlackScholesModel {
    fn underlying_code(&self) -> &UnderlyingCode {
        &self.underlying_code
    }

    fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    fn construct_tree(
        &self,
        n_steps: usize,
        time_to_expiry: f64,
        implementation: Implementation,
        upper_sd: f64,
        lower_sd: f64,
    ) -> Result<Tree> {
        construct_tree(&TreeBuildParams {
            s0: self.initial_underlying_price,
            n_steps,
            time_to_expiry,
            sigma: self.implied_volatility,
            discount_rate: self.discount_rate,
            cost_of_carry: self.cost_of_carry,
            implementation,
            upper_sd,
            lower_sd,
            dividend: None,
            jump: None,
        })
    }

    fn smoothed_terminal_value(&self, s: f64, option: &VanillaOption, dt: f64) -> Result<f64> {
        black_scholes_price(
            s,
            option.strike(),
            dt,
            self.discount_rate,
            self.cost_of_carry,
            self.implied_volatility,
            option.right(),
        )
    }

    fn supports_smoothing(&self, _t_start: f64, _t_end: f64) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn code() -> UnderlyingCode {
        UnderlyingCode::new("TEST")
    }

    #[test]
    fn rejects_non_positive_volatility() {
        assert!(BlackScholesModel::new(0.03, 0.06, 0.0, 100.0, code()).is_err());
    }

    #[test]
    fn rejects_non_positive_spot() {
        assert!(BlackScholesModel::new(0.03, 0.06, 0.1, 0.0, code()).is_err());
    }

    #[test]
    fn smoothed_terminal_value_matches_call_put_parity() {
        let model = BlackScholesModel::new(0.03, 0.06, 0.1, 100.0, code()).unwrap();
        let call = VanillaOption::new(
            100.0,
            0.5,
            crate::option::ExerciseType::European,
            OptionRight::Call,
            code(),
        )
        .unwrap();
        let put = VanillaOption::new(
            100.0,
            0.5,
            crate::option::ExerciseType::European,
            OptionRight::Put,
            code(),
        )
        .unwrap();
        let dt = 0.01;
        let call_value = model.smoothed_terminal_value(100.0, &call, dt).unwrap();
        let put_value = model.smoothed_terminal_value(100.0, &put, dt).unwrap();
        assert_relative_eq!(
            call_value - put_value,
            100.0 * (-model.cost_of_carry * dt).exp() - 100.0 * (-model.discount_rate * dt).exp(),
            epsilon = 1e-9
        );
    }
}
