//! Error types shared by every fallible operation in the crate.

use thiserror::Error;

/// The four error kinds the engine can raise. All errors surface synchronously;
/// there is no silent fallback and no partial result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// A caller-visible precondition failure: negative volatility, mismatched batch
    /// sizes, an option priced against the wrong underlying, and so on.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `p_up` computed outside `[0, 1]`. Advises more time steps because this is
    /// almost always a sign that `Δt` is too coarse for the supplied volatility/drift.
    #[error("invalid discretisation: p_up = {p_up} is outside [0, 1]; use more time steps")]
    InvalidDiscretisation { p_up: f64 },

    /// The tree's time-to-expiry and the option's time-to-expiry disagree by more
    /// than 1e-7.
    #[error("horizon mismatch: tree T = {tree_t}, option T = {option_t}")]
    HorizonMismatch { tree_t: f64, option_t: f64 },

    /// An operation that is reserved but not implemented on the production path,
    /// e.g. Monte-Carlo pricing requested for an American option.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;

/// Non-negativity / equality tolerance used for prices, underlyings, and volatilities.
pub const EPS: f64 = 1e-8;

/// Tolerance used when comparing two times-to-expiry for equality.
pub const HORIZON_EPS: f64 = 1e-7;

pub(crate) fn require_non_negative(value: f64, name: &str) -> Result<()> {
    if value < -EPS {
        return Err(PricingError::InvalidInput(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_strictly_positive(value: f64, name: &str) -> Result<()> {
    if value < EPS {
        return Err(PricingError::InvalidInput(format!(
            "{name} must be strictly positive, got {value}"
        )));
    }
    Ok(())
}
