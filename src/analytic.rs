//! Closed-form Black-Scholes European price.
//!
//! A dependency of the backward-induction pricer's terminal smoothing hook, and
//! exposed standalone for verifying tree prices against a closed form where one
//! applies. Grounded on `Models/BlackScholes.cpp`'s d1/d2 formulas.

use crate::error::{require_strictly_positive, Result};
use crate::option::{OptionRight, VanillaOption};
use statrs::distribution::{ContinuousCDF, Normal};

/// price = φ·[s·exp(-qτ)·Φ(φ·d1) - K·exp(-rτ)·Φ(φ·d2)]
///
/// d1 = [ln(s/K) + (r - q + σ²/2)·τ] / (σ√τ), d2 = d1 - σ√τ.
pub fn black_scholes_price(
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    discount_rate: f64,
    cost_of_carry: f64,
    volatility: f64,
    right: OptionRight,
) -> Result<f64> {
    require_strictly_positive(spot, "spot")?;
    require_strictly_positive(volatility, "volatility")?;

    let phi = match right {
        OptionRight::Call => 1.0,
        OptionRight::Put => -1.0,
    };

    if time_to_expiry <= 0.0 {
        return Ok((phi * (spot - strike)).max(0.0));
    }

    let sqrt_t = time_to_expiry.sqrt();
    let vol_sqrt_t = volatility * sqrt_t;
    let d1 = ((spot / strike).ln()
        + (discount_rate - cost_of_carry + 0.5 * volatility * volatility) * time_to_expiry)
        / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    // Normal::new(0, 1) cannot fail for fixed, well-formed parameters.
    let normal = Normal::new(0.0, 1.0).unwrap();
    let price = phi
        * (spot * (-cost_of_carry * time_to_expiry).exp() * normal.cdf(phi * d1)
            - strike * (-discount_rate * time_to_expiry).exp() * normal.cdf(phi * d2));
    Ok(price)
}

/// Convenience overload taking a [`VanillaOption`] directly (European style only —
/// the caller is responsible for not invoking this on an American option; the
/// formula itself has no notion of early exercise).
pub fn black_scholes_price_for_option(
    option: &VanillaOption,
    spot: f64,
    discount_rate: f64,
    cost_of_carry: f64,
    volatility: f64,
) -> Result<f64> {
    black_scholes_price(
        spot,
        option.strike(),
        option.time_to_expiry(),
        discount_rate,
        cost_of_carry,
        volatility,
        option.right(),
    )
}
