//! Log-normal diffusion with a single scheduled discrete cash dividend.
//!
//! Grounded on `Models/BlackScholesWithDividendModel.{h,cpp}`: adds `dividendTime`
//! and `dividendAmount` to the plain model and forwards them into the tree builder's
//! `dividend` slot (the construction-time zero-absorption test plus the
//! post-construction `deduct_dividend` pass, both in `tree::builder`).

use crate::analytic::black_scholes_price;
use crate::error::{require_non_negative, require_strictly_positive, Result, EPS};
use crate::models::TreeModel;
use crate::option::{UnderlyingCode, VanillaOption};
use crate::tree::builder::{construct_tree, TreeBuildParams};
use crate::tree::{Implementation, Tree};

#[derive(Debug, Clone)]
pub struct WithDividendModel {
    cost_of_carry: f64,
    discount_rate: f64,
    implied_volatility: f64,
    initial_underlying_price: f64,
    underlying_code: UnderlyingCode,
    dividend_time: f64,
    dividend_amount: f64,
}

impl WithDividendModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cost_of_carry: f64,
        discount_rate: f64,
        implied_volatility: f64,
        initial_underlying_price: f64,
        underlying_code: UnderlyingCode,
        dividend_time: f64,
        dividend_amount: f64,
    ) -> Result<Self> {
        require_strictly_positive(implied_volatility, "implied_volatility")?;
        require_strictly_positive(initial_underlying_price, "initial_underlying_price")?;
        require_non_negative(dividend_time, "dividend_time")?;
        require_non_negative(dividend_amount, "dividend_amount")?;
        Ok(WithDividendModel {
            cost_of_carry,
            discount_rate,
            implied_volatility,
            initial_underlying_price,
            underlying_code,
            dividend_time,
            dividend_amount,
        })
    }

    pub fn dividend_time(&self) -> f64 {
        self.dividend_time
    }

    pub fn dividend_amount(&self) -> f64 {
        self.dividend_amount
    }
}

impl TreeModel for WithDividendModel {
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

    fn supports_smoothing(&self, t_start: f64, t_end: f64) -> bool {
        !(self.dividend_time > t_start + EPS && self.dividend_time < t_end + EPS)
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

    #[test]
    fn rejects_negative_dividend_amount() {
        assert!(
            WithDividendModel::new(0.0, 0.06, 0.1, 100.0, code(), 0.25, -1.0).is_err()
        );
    }

    #[test]
    fn smoothing_disabled_over_the_step_containing_the_dividend() {
        let model = WithDividendModel::new(0.0, 0.06, 0.1, 100.0, code(), 0.25, 2.0).unwrap();
        assert!(!model.supports_smoothing(0.2, 0.3));
        assert!(model.supports_smoothing(0.3, 0.4));
    }

    #[test]
    fn tree_prices_without_error() {
        let model = WithDividendModel::new(0.0, 0.06, 0.1, 100.0, code(), 0.25, 2.0).unwrap();
        let tree = model
            .construct_tree(50, 0.5, Implementation::Crr, 6.0, -6.0)
            .unwrap();
        let option =
            VanillaOption::new(100.0, 0.5, ExerciseType::American, OptionRight::Put, code())
                .unwrap();
        let price = crate::tree::pricer::price(&model, &tree, &option, true).unwrap();
        assert!(price.is_finite() && price >= 0.0);
    }

    // Scenario S3: dividend-as-shifted-strike identity. A single dividend D paid
    // before expiry should price a European call the same as a plain Black-Scholes
    // call struck at K+D, to within 0.5%.
    #[test]
    fn scenario_s3_dividend_matches_shifted_strike_identity() {
        use crate::analytic::black_scholes_price;
        use crate::tree::richardson::price_with_richardson;
        use approx::assert_relative_eq;

        let model = WithDividendModel::new(0.03, 0.06, 0.1, 100.0, code(), 0.51, 10.0).unwrap();
        let option =
            VanillaOption::new(100.0, 2.0, ExerciseType::European, OptionRight::Call, code())
                .unwrap();
        let prices = price_with_richardson(
            &model,
            100,
            std::slice::from_ref(&option),
            true,
            Implementation::Crr,
            6.0,
            -6.0,
        )
        .unwrap();

        let shifted_strike_price =
            black_scholes_price(100.0, 110.0, 2.0, 0.06, 0.03, 0.1, OptionRight::Call).unwrap();

        assert_relative_eq!(prices[0], shifted_strike_price, max_relative = 0.005);
    }
}
