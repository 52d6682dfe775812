//! Single-jump Monte-Carlo terminal simulation: the validation cross-check for
//! scenario S4, kept deliberately outside the tree/pricer/DE core (SPEC_FULL.md §1).
//!
//! Grounded on `Pricers/MonteCarloPricer.cpp` (European-only guard, discounted
//! average-payoff pricing) and `Models/BlackScholesSingleNormalJump.h`'s
//! `generateMonteCarloSimulations` method signature. The original's path
//! construction is not present in the retrieved source, so the simulation step
//! itself is authored directly from the model's own diffusion/dividend/jump
//! description (SPEC_FULL.md §3) rather than ported: GBM between events, an
//! additive continuous normal jump (not the tree's 5-point moment-matched
//! discretisation — that discretisation exists only to keep the tree's branching
//! factor finite) at the jump date, and a zero-floored subtraction at the dividend
//! date.

use crate::error::{PricingError, Result};
use crate::models::SingleJumpModel;
use crate::option::{ExerciseType, VanillaOption};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use statrs::distribution::{ContinuousCDF, Normal};

#[derive(Clone, Copy)]
enum Event {
    Dividend(f64),
    Jump(f64),
}

fn event_time(event: &Event) -> f64 {
    match event {
        Event::Dividend(t) | Event::Jump(t) => *t,
    }
}

/// Simulates `n_paths` terminal underlying values at `time_to_expiry` under
/// `model`'s diffusion, its single scheduled dividend (if it falls within the
/// horizon), and its single scheduled jump (likewise). Deterministic given `seed`,
/// independent of thread scheduling — unlike [`super::gbm::GeometricBrownianMotion`],
/// this does not parallelise over paths, so that S4-style reproducibility holds
/// regardless of the machine's core count.
pub fn simulate_single_jump_terminal_prices(
    model: &SingleJumpModel,
    time_to_expiry: f64,
    n_paths: usize,
    seed: u64,
) -> Vec<f64> {
    let mut events = Vec::with_capacity(2);
    if model.dividend_time() <= time_to_expiry {
        events.push(Event::Dividend(model.dividend_time()));
    }
    if model.jump_time() <= time_to_expiry {
        events.push(Event::Jump(model.jump_time()));
    }
    events.sort_by(|a, b| event_time(a).total_cmp(&event_time(b)));

    let drift = model.discount_rate() - model.cost_of_carry();
    let sigma = model.implied_volatility();
    let standard_normal = Normal::new(0.0, 1.0).unwrap();
    let jump_normal = Normal::new(model.jump_mean(), model.jump_volatility()).unwrap();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut terminal = Vec::with_capacity(n_paths);

    for _ in 0..n_paths {
        let mut s = model.initial_underlying_price();
        let mut t = 0.0;
        for event in &events {
            let h = event_time(event) - t;
            if h > 0.0 {
                s = diffuse(s, drift, sigma, h, &mut rng, &standard_normal);
            }
            s = match event {
                Event::Dividend(_) => (s - model.dividend_amount()).max(0.0),
                Event::Jump(_) => {
                    let u: f64 = rng.gen();
                    s * jump_normal.inverse_cdf(u).exp()
                }
            };
            t = event_time(event);
        }
        let remaining = time_to_expiry - t;
        if remaining > 0.0 {
            s = diffuse(s, drift, sigma, remaining, &mut rng, &standard_normal);
        }
        terminal.push(s);
    }

    terminal
}

fn diffuse(
    s: f64,
    drift: f64,
    sigma: f64,
    h: f64,
    rng: &mut Xoshiro256PlusPlus,
    standard_normal: &Normal,
) -> f64 {
    let u: f64 = rng.gen();
    let z = standard_normal.inverse_cdf(u);
    s * ((drift - 0.5 * sigma * sigma) * h + sigma * h.sqrt() * z).exp()
}

/// The discounted average-payoff Monte-Carlo price of a European `option` against
/// `model`. Mirrors `MonteCarloPricer::price`'s European-only guard: an American
/// option is rejected with `UnsupportedOperation`, matching SPEC_FULL.md §7's
/// example of that error kind.
pub fn price_single_jump_mc(
    model: &SingleJumpModel,
    option: &VanillaOption,
    n_paths: usize,
    seed: u64,
) -> Result<f64> {
    if option.exercise_type() == ExerciseType::American {
        return Err(PricingError::UnsupportedOperation(
            "Monte-Carlo pricing is only supported for European options".to_string(),
        ));
    }
    if option.underlying_code() != model.underlying_code() {
        return Err(PricingError::InvalidInput(format!(
            "option underlying {} does not match model underlying {}",
            option.underlying_code(),
            model.underlying_code()
        )));
    }

    let terminal = simulate_single_jump_terminal_prices(model, option.time_to_expiry(), n_paths, seed);
    let average_payoff: f64 = terminal.iter().map(|&s| option.intrinsic_value(s)).sum::<f64>()
        / n_paths as f64;
    Ok(average_payoff * (-model.discount_rate() * option.time_to_expiry()).exp())
}

/// The standard error of a sequence of simulated values: `σ / √N`, the precision
/// indicator engineers check before trusting a Monte-Carlo cross-check.
pub fn standard_error(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (variance / n).sqrt()
}
