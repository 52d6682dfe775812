//! Vanilla option instrument and the small enumerations it is built from.
//!
//! Grounded on `Instruments/VanillaOption.{h,cpp}` in the original source: constructor
//! validation, `intrinsic_value`, and `value_at_tree_node` are ports of that type's
//! methods of the same name.

use crate::error::{require_non_negative, Result, EPS};
use std::fmt;
use std::sync::Arc;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// φ in the payoff formula: +1 for a call, -1 for a put.
    fn sign(self) -> f64 {
        match self {
            OptionRight::Call => 1.0,
            OptionRight::Put => -1.0,
        }
    }
}

/// European or American exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseType {
    European,
    American,
}

/// An opaque label distinguishing one underlying from another, used only for
/// consistency checks between an option and the model pricing it. Carries no
/// pricing semantics of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnderlyingCode(Arc<str>);

impl UnderlyingCode {
    pub fn new(code: impl Into<Arc<str>>) -> Self {
        UnderlyingCode(code.into())
    }
}

impl fmt::Display for UnderlyingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Arc<str>>> From<T> for UnderlyingCode {
    fn from(value: T) -> Self {
        UnderlyingCode::new(value)
    }
}

/// A vanilla call or put, immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VanillaOption {
    strike: f64,
    time_to_expiry: f64,
    exercise_type: ExerciseType,
    right: OptionRight,
    underlying_code: UnderlyingCode,
}

impl VanillaOption {
    pub fn new(
        strike: f64,
        time_to_expiry: f64,
        exercise_type: ExerciseType,
        right: OptionRight,
        underlying_code: UnderlyingCode,
    ) -> Result<Self> {
        require_non_negative(strike, "strike")?;
        require_non_negative(time_to_expiry, "time_to_expiry")?;
        Ok(VanillaOption {
            strike,
            time_to_expiry,
            exercise_type,
            right,
            underlying_code,
        })
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    pub fn right(&self) -> OptionRight {
        self.right
    }

    pub fn underlying_code(&self) -> &UnderlyingCode {
        &self.underlying_code
    }

    /// max(0, φ·(S - K)): the payoff if exercised/settled at underlying price `s`.
    pub fn intrinsic_value(&self, s: f64) -> f64 {
        (self.right.sign() * (s - self.strike)).max(0.0)
    }

    /// Applies the early-exercise rule to a node's forward (discounted expected)
    /// value: American options take the max against immediate exercise, European
    /// options pass the forward value through unchanged.
    pub fn value_at_tree_node(&self, forward_value: f64, underlying_price: f64) -> Result<f64> {
        require_non_negative(forward_value, "forward_value")?;
        require_non_negative(underlying_price, "underlying_price")?;
        Ok(match self.exercise_type {
            ExerciseType::American => forward_value.max(self.intrinsic_value(underlying_price)),
            ExerciseType::European => forward_value,
        })
    }
}

/// An observed market price paired with the option it was quoted for; the unit of
/// work a calibration batch minimises error over.
#[derive(Debug, Clone)]
pub struct ObservedPrice {
    pub option: VanillaOption,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> UnderlyingCode {
        UnderlyingCode::new("TEST")
    }

    #[test]
    fn call_intrinsic_value() {
        let option = VanillaOption::new(100.0, 1.0, ExerciseType::European, OptionRight::Call, code())
            .unwrap();
        assert_eq!(option.intrinsic_value(110.0), 10.0);
        assert_eq!(option.intrinsic_value(90.0), 0.0);
    }

    #[test]
    fn put_intrinsic_value() {
        let option = VanillaOption::new(100.0, 1.0, ExerciseType::European, OptionRight::Put, code())
            .unwrap();
        assert_eq!(option.intrinsic_value(90.0), 10.0);
        assert_eq!(option.intrinsic_value(110.0), 0.0);
    }

    #[test]
    fn european_never_exercises_early() {
        let option = VanillaOption::new(100.0, 1.0, ExerciseType::European, OptionRight::Call, code())
            .unwrap();
        let value = option.value_at_tree_node(5.0, 120.0).unwrap();
        assert_eq!(value, 5.0);
    }

    #[test]
    fn american_takes_the_better_of_hold_or_exercise() {
        let option = VanillaOption::new(100.0, 1.0, ExerciseType::American, OptionRight::Call, code())
            .unwrap();
        let value = option.value_at_tree_node(5.0, 120.0).unwrap();
        assert_eq!(value, 20.0);
    }

    #[test]
    fn negative_strike_rejected() {
        assert!(VanillaOption::new(-1.0, 1.0, ExerciseType::European, OptionRight::Call, code()).is_err());
    }

    #[test]
    fn tolerance_allows_tiny_negative_noise() {
        let option = VanillaOption::new(100.0, 1.0, ExerciseType::European, OptionRight::Call, code())
            .unwrap();
        assert!(option.value_at_tree_node(-EPS / 2.0, 100.0).is_ok());
    }
}
