//! Monte-Carlo cross-check, deliberately separate from the tree/pricer/DE core:
//! nothing in `tree`, `models`, `optimize`, or `calibration` depends on this module.
//! Trimmed to the single-jump GBM path the core's model family actually needs — no
//! Heston (stochastic volatility is out of scope), no American least-squares Monte
//! Carlo (path-dependent/early-exercise Monte Carlo is out of scope; early exercise
//! is handled by the tree pricer), no Brownian-bridge helpers the trimmed path
//! construction has no use for.

mod gbm;
pub mod monte_carlo;
mod rng;

pub use gbm::GeometricBrownianMotion;
pub use monte_carlo::{price_single_jump_mc, simulate_single_jump_terminal_prices, standard_error};
