//! Log-normal diffusion with one scheduled dividend and one scheduled normal jump.
//!
//! Grounded on `Models/BlackScholesWithSingleJumpModel.{h,cpp}`. This is the model
//! variant the differential-evolution calibration in `calibration` drives, so its
//! jump-sensitive fields (`jump_mean`, `jump_volatility`) are the ones the optimiser
//! is free to vary within the partial- and full-calibration parameter vectors.

use crate::analytic::black_scholes_price;
use crate::error::{require_non_negative, require_strictly_positive, Result, EPS};
use crate::models::TreeModel;
use crate::option::{UnderlyingCode, VanillaOption};
use crate::tree::builder::{construct_tree, JumpSpec, TreeBuildParams};
use crate::tree::{Implementation, Tree};

#[derive(Debug, Clone)]
pub struct SingleJumpModel {
    cost_of_carry: f64,
    discount_rate: f64,
    implied_volatility: f64,
    initial_underlying_price: f64,
    underlying_code: UnderlyingCode,
    dividend_time: f64,
    dividend_amount: f64,
    jump_time: f64,
    jump_mean: f64,
    jump_volatility: f64,
}

impl SingleJumpModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cost_of_carry: f64,
        discount_rate: f64,
        implied_volatility: f64,
        initial_underlying_price: f64,
        underlying_code: UnderlyingCode,
        dividend_time: f64,
        dividend_amount: f64,
        jump_time: f64,
        jump_mean: f64,
        jump_volatility: f64,
    ) -> Result<Self> {
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_strictly_positive(initial_underlying_price, "initial_underlying_price")?;
        require_non_negative(dividend_time, "dividend_time")?;
        require_non_negative(dividend_amount, "dividend_amount")?;
        require_non_negative(jump_time, "jump_time")?;
        require_strictly_positive(jump_volatility, "jump_volatility")?;
        Ok(SingleJumpModel {
            cost_of_carry,
            discount_rate,
            implied_volatility,
            initial_underlying_price,
            underlying_code,
            dividend_time,
            dividend_amount,
            jump_time,
            jump_mean,
            jump_volatility,
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

    pub fn dividend_time(&self) -> f64 {
        self.dividend_time
    }

    pub fn dividend_amount(&self) -> f64 {
        self.dividend_amount
    }

    pub fn jump_time(&self) -> f64 {
        self.jump_time
    }

    pub fn jump_mean(&self) -> f64 {
        self.jump_mean
    }

    pub fn jump_volatility(&self) -> f64 {
        self.jump_volatility
    }

    /// Returns a copy of this model with `implied_volatility` and `jump_volatility`
    /// replaced — the partial-calibration parameter vector.
    pub fn with_volatilities(&self, implied_volatility: f64, jump_volatility: f64) -> Result<Self> {
        let mut clone = self.clone();
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_strictly_positive(jump_volatility, "jump_volatility")?;
        clone.implied_volatility = implied_volatility;
        clone.jump_volatility = jump_volatility;
        Ok(clone)
    }

    /// Returns a copy of this model with all five full-calibration fields replaced:
    /// cost of carry, discount rate, implied volatility, dividend amount, jump
    /// volatility.
    #[allow(clippy::too_many_arguments)]
    pub fn with_full_parameters(
        &self,
        cost_of_carry: f64,
        discount_rate: f64,
        implied_volatility: f64,
        dividend_amount: f64,
        jump_volatility: f64,
    ) -> Result<Self> {
        let mut clone = self.clone();
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_non_negative(dividend_amount, "dividend_amount")?;
        require_strictly_positive(jump_volatility, "jump_volatility")?;
        clone.cost_of_carry = cost_of_carry;
        clone.discount_rate = discount_rate;
        clone.implied_volatility = implied_volatility;
        clone.dividend_amount = dividend_amount;
        clone.jump_volatility = jump_volatility;
        Ok(clone)
    }
}

impl TreeModel for SingleJumpModel {
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
            dividend: Some((self.dividend_time, self.dividend_amount)),
            jump: Some(JumpSpec {
                time: self.jump_time,
                mu: self.jump_mean,
                sigma_j: self.jump_volatility,
            }),
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

    fn supports_smoothing(&self, t_start: f64, t_end: f64) -> bool {
        let dividend_inside = self.dividend_time > t_start + EPS && self.dividend_time < t_end + EPS;
        let jump_inside = self.jump_time > t_start + EPS && self.jump_time < t_end + EPS;
        !dividend_inside && !jump_inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{ExerciseType, OptionRight};
    use crate::tree::states::Implementation;

    fn code() -> UnderlyingCode {
        UnderlyingCode::new("TEST")
    }

    fn model() -> SingleJumpModel {
        SingleJumpModel::new(0.0, 0.06, 0.1, 100.0, code(), 0.25, 2.0, 0.3, -0.05, 0.15).unwrap()
    }

    #[test]
    fn smoothing_disabled_around_either_event() {
        let m = model();
        assert!(!m.supports_smoothing(0.2, 0.3));
        assert!(!m.supports_smoothing(0.25, 0.35));
        assert!(m.supports_smoothing(0.4, 0.5));
    }

    #[test]
    fn jump_tree_prices_without_error() {
        let m = model();
        let tree = m
            .construct_tree(20, 0.5, Implementation::Crr, 6.0, -6.0)
            .unwrap();
        let option =
            VanillaOption::new(100.0, 0.5, ExerciseType::American, OptionRight::Call, code())
                .unwrap();
        let price = crate::tree::pricer::price(&m, &tree, &option, true).unwrap();
        assert!(price.is_finite() && price >= 0.0);
    }

    #[test]
    fn with_volatilities_rejects_non_positive() {
        assert!(model().with_volatilities(0.0, 0.1).is_err());
    }
}
